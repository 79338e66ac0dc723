use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::Router;
use axum::extract::{Query, State};
use axum::routing::get;
use tracing::info;

use super::{AppState, ServerError};
use crate::search::{SearchResult, SearchSpecification};

pub const SEARCH_PATH: &str = "/api/search";

pub(super) fn router() -> Router<AppState> {
    Router::new().route(SEARCH_PATH, get(search_handler))
}

/// GET /api/search
///
/// Every parameter is optional; unreadable values fall back to defaults.
async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<SearchResult>, ServerError> {
    let started = Instant::now();
    let spec = SearchSpecification::from_params(&params, state.max_limit);

    if !state.latency.is_zero() {
        tokio::time::sleep(state.latency).await;
    }

    let engine = Arc::clone(&state.engine);
    let query = spec.clone();
    let result = run_blocking(move || engine.execute(&query)).await?;

    info!(
        query = %spec.query,
        page = spec.page,
        limit = spec.limit,
        total_count = result.pagination.total_count,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "search served"
    );
    Ok(Json(result))
}

/// Runs `work` on the blocking pool. A panic there surfaces as
/// [`ServerError::Internal`] rather than taking the server down.
async fn run_blocking<F, T>(work: F) -> Result<T, ServerError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))
}
