//! Environment-driven configuration.
//!
//! Values are read through `dotenvy::var`, so a `.env` file in the working
//! directory is honoured. Unparseable values keep the default.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::client::orchestrator::ScrollMode;
use crate::search::query::DEFAULT_MAX_LIMIT;
use crate::store::Dataset;

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    dotenvy::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Configuration for the HTTP search service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// JSON record file; `None` serves a generated catalog.
    pub data_path: Option<PathBuf>,
    pub dataset: Dataset,
    pub record_count: usize,
    pub seed: u64,
    /// Artificial delay applied to every search response.
    pub latency: Duration,
    pub max_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            data_path: None,
            dataset: Dataset::Products,
            record_count: Dataset::Products.default_count(),
            seed: 42,
            latency: Duration::from_millis(300),
            max_limit: DEFAULT_MAX_LIMIT,
        }
    }
}

impl ServerConfig {
    /// Load config from environment variables.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Some(addr) = env_parse("CATALOG_BIND") {
            cfg.bind = addr;
        }

        if let Ok(path) = dotenvy::var("CATALOG_DATA")
            && !path.trim().is_empty()
        {
            cfg.data_path = Some(PathBuf::from(path));
        }

        if let Some(dataset) = env_parse::<Dataset>("CATALOG_DATASET") {
            cfg.dataset = dataset;
            cfg.record_count = dataset.default_count();
        }

        if let Some(n) = env_parse("CATALOG_RECORDS") {
            cfg.record_count = n;
        }

        if let Some(seed) = env_parse("CATALOG_SEED") {
            cfg.seed = seed;
        }

        if let Some(ms) = env_parse::<u64>("CATALOG_LATENCY_MS") {
            cfg.latency = Duration::from_millis(ms);
        }

        if let Some(n) = env_parse::<usize>("CATALOG_MAX_LIMIT")
            && n > 0
        {
            cfg.max_limit = n;
        }

        cfg
    }
}

/// Configuration for the interactive query client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub debounce: Duration,
    pub page_size: usize,
    pub request_timeout: Duration,
    pub scroll_mode: ScrollMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            debounce: Duration::from_millis(300),
            page_size: 12,
            request_timeout: Duration::from_millis(3000),
            scroll_mode: ScrollMode::Paged,
        }
    }
}

impl ClientConfig {
    /// Load config from environment variables.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(url) = dotenvy::var("CATALOG_URL")
            && !url.trim().is_empty()
        {
            cfg.base_url = url.trim().trim_end_matches('/').to_string();
        }

        if let Some(ms) = env_parse::<u64>("CATALOG_DEBOUNCE_MS") {
            cfg.debounce = Duration::from_millis(ms);
        }

        if let Some(n) = env_parse::<usize>("CATALOG_PAGE_SIZE")
            && n > 0
        {
            cfg.page_size = n;
        }

        if let Some(ms) = env_parse::<u64>("CATALOG_REQUEST_TIMEOUT_MS") {
            cfg.request_timeout = Duration::from_millis(ms);
        }

        if let Some(mode) = env_parse::<ScrollMode>("CATALOG_SCROLL_MODE") {
            cfg.scroll_mode = mode;
        }

        cfg
    }
}
