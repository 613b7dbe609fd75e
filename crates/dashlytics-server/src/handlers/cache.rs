//! Result cache inspection handlers.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::types::{CacheClearResponse, CacheStatsResponse, DataResponse};
use crate::AppState;

/// Result cache counters.
#[utoipa::path(
    get,
    path = "/api/cache/stats",
    tag = "cache",
    responses(
        (status = 200, description = "Cache statistics", body = CacheStatsResponse)
    )
)]
pub async fn cache_stats(
    State(state): State<Arc<AppState>>,
) -> Json<DataResponse<CacheStatsResponse>> {
    Json(DataResponse::new(state.cache.stats().into()))
}

/// Drops every cached result. Counters are kept.
#[utoipa::path(
    delete,
    path = "/api/cache",
    tag = "cache",
    responses(
        (status = 200, description = "Cache cleared", body = CacheClearResponse)
    )
)]
pub async fn clear_cache(
    State(state): State<Arc<AppState>>,
) -> Json<DataResponse<CacheClearResponse>> {
    let cleared = state.cache.len();
    state.cache.clear();
    tracing::info!(cleared, "result cache cleared");
    Json(DataResponse::new(CacheClearResponse { cleared }))
}
