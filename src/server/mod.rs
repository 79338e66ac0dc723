//! HTTP search service.
//!
//! Exposes `GET /api/search` over a [`SearchEngine`]. Every response is
//! delayed by the configured latency so clients can exercise their debounce
//! and cancellation paths against realistic timing.

mod routes;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::search::SearchEngine;

pub use routes::SEARCH_PATH;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),

    #[error("search task failed: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        error!(error = %self, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: "Internal Server Error",
            }),
        )
            .into_response()
    }
}

/// Shared state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine>,
    pub latency: Duration,
    pub max_limit: usize,
}

impl AppState {
    pub fn new(engine: Arc<SearchEngine>, config: &ServerConfig) -> Self {
        Self {
            engine,
            latency: config.latency,
            max_limit: config.max_limit,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    routes::router().with_state(state)
}

/// Bind `config.bind` and serve until ctrl-c.
pub async fn serve(config: &ServerConfig, engine: Arc<SearchEngine>) -> Result<(), ServerError> {
    let listener = TcpListener::bind(config.bind)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.bind,
            source,
        })?;
    let local = listener.local_addr().map_err(ServerError::Serve)?;
    info!(
        addr = %local,
        records = engine.store().len(),
        latency_ms = config.latency.as_millis() as u64,
        "search service listening"
    );

    let app = build_router(AppState::new(engine, config));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    info!("search service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until the process is killed.
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
