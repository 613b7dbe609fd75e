#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::unused_async)]
#![allow(clippy::needless_for_each)]
//! `Dashlytics` Server - REST API library for the `Dashlytics` analytical engine.
//!
//! This module provides the HTTP handlers, types and router for the API.
//!
//! ## OpenAPI Documentation
//!
//! The API is documented using OpenAPI 3.0. Access the interactive documentation at:
//! - Swagger UI: `GET /swagger-ui`
//! - OpenAPI JSON: `GET /api-docs/openapi.json`

mod error;
mod handlers;
mod mock;
mod types;

use axum::{
    routing::{delete, get, post},
    Router,
};
use dashlytics_core::{DashConfig, ResultCache};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

pub use error::{api_error, ApiError};
pub use mock::generate_sales;
pub use types::*;

// Re-export handlers for routing
pub use handlers::{
    aggregate, cache_stats, clear_cache, growth, health_check, moving_average, percentile,
    sales_dashboard, timeseries,
};

// ============================================================================
// OpenAPI Documentation
// ============================================================================

/// Dashlytics API Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Dashlytics API",
        version = "0.3.0",
        description = "Analytical engine for business-intelligence dashboards. \
            Group-by aggregation, time bucketing, trends and percentiles over JSON records.",
        license(name = "MIT")
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "analytics", description = "Engine operations over request payloads"),
        (name = "sales", description = "Cached demo sales dashboard"),
        (name = "cache", description = "Result cache management")
    ),
    paths(
        handlers::health::health_check,
        handlers::analytics::aggregate,
        handlers::analytics::timeseries,
        handlers::analytics::growth,
        handlers::analytics::moving_average,
        handlers::analytics::percentile,
        handlers::sales::sales_dashboard,
        handlers::cache::cache_stats,
        handlers::cache::clear_cache
    ),
    components(
        schemas(
            ErrorResponse,
            AggregateRequest,
            TimeSeriesRequest,
            GrowthRequest,
            MovingAverageRequest,
            PercentileRequest,
            PercentileResponse,
            SalesTotals,
            SalesReport,
            CacheStatsResponse,
            CacheClearResponse
        )
    )
)]
pub struct ApiDoc;

// ============================================================================
// Application State
// ============================================================================

/// Application state shared across handlers.
pub struct AppState {
    /// Memoized responses of cacheable endpoints, as JSON.
    pub cache: Arc<ResultCache<serde_json::Value>>,
    /// Loaded configuration.
    pub config: DashConfig,
}

impl AppState {
    /// Builds state with a wall-clock cache sized from `config`.
    #[must_use]
    pub fn new(config: DashConfig) -> Self {
        Self {
            cache: Arc::new(ResultCache::new(&config.cache)),
            config,
        }
    }
}

// ============================================================================
// Router
// ============================================================================

/// Builds the API router with tracing and, if enabled, permissive CORS.
///
/// Swagger UI is mounted separately by the binary.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors_enabled = state.config.server.cors_enabled;

    let router = Router::new()
        .route("/health", get(health_check))
        .route("/api/analytics/aggregate", post(aggregate))
        .route("/api/analytics/timeseries", post(timeseries))
        .route("/api/analytics/growth", post(growth))
        .route("/api/analytics/moving-average", post(moving_average))
        .route("/api/analytics/percentile", post(percentile))
        .route("/api/sales", get(sales_dashboard))
        .route("/api/cache/stats", get(cache_stats))
        .route("/api/cache", delete(clear_cache))
        .with_state(state);

    let router = if cors_enabled {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };
    router.layer(TraceLayer::new_for_http())
}

// ============================================================================
// Tests
// ============================================================================
