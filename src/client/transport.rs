//! Transports that carry a [`SearchSpecification`] to a search pipeline.
//!
//! [`HttpTransport`] talks to the `/api/search` route with reqwest;
//! [`LocalTransport`] runs an in-process [`SearchEngine`]. Both race the
//! request against its [`CancellationToken`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::client::cancel::CancellationToken;
use crate::search::{SearchEngine, SearchResult, SearchSpecification};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request cancelled")]
    Cancelled,

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("server returned HTTP {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Decode(String),
}

impl TransportError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Message suitable for inline display to a user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Cancelled => String::new(),
            Self::Timeout => "The search took too long. Please try again.".to_string(),
            Self::Status(_) | Self::Decode(_) => {
                "An unexpected error occurred. Please try again.".to_string()
            }
            Self::Network(_) => "Could not reach the search service.".to_string(),
        }
    }
}

pub trait SearchTransport: Send + Sync + 'static {
    fn search(
        &self,
        spec: SearchSpecification,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<SearchResult, TransportError>> + Send;
}

/// Race `work` against cancellation.
async fn cancellable<F>(cancel: &CancellationToken, work: F) -> Result<SearchResult, TransportError>
where
    F: Future<Output = Result<SearchResult, TransportError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(TransportError::Cancelled),
        result = work => result,
    }
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/search", base_url.trim_end_matches('/')),
        })
    }

    async fn fetch(&self, spec: &SearchSpecification) -> Result<SearchResult, TransportError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&spec.to_query_pairs())
            .send()
            .await
            .map_err(map_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        response
            .json::<SearchResult>()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}

fn map_reqwest(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(err.to_string())
    }
}

impl SearchTransport for HttpTransport {
    async fn search(
        &self,
        spec: SearchSpecification,
        cancel: CancellationToken,
    ) -> Result<SearchResult, TransportError> {
        debug!(endpoint = %self.endpoint, query = %spec.query, page = spec.page, "http search");
        cancellable(&cancel, self.fetch(&spec)).await
    }
}

/// Runs the pipeline in-process, optionally after a simulated delay.
#[derive(Debug, Clone)]
pub struct LocalTransport {
    engine: Arc<SearchEngine>,
    latency: Duration,
}

impl LocalTransport {
    pub fn new(engine: Arc<SearchEngine>) -> Self {
        Self {
            engine,
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

impl SearchTransport for LocalTransport {
    async fn search(
        &self,
        spec: SearchSpecification,
        cancel: CancellationToken,
    ) -> Result<SearchResult, TransportError> {
        let engine = Arc::clone(&self.engine);
        let latency = self.latency;
        cancellable(&cancel, async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            Ok(engine.execute(&spec))
        })
        .await
    }
}
