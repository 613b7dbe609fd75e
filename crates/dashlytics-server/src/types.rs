//! Request/Response types for the Dashlytics REST API.
//!
//! Engine types (`Record`, `AggregationSpec`, `TimeSeriesSpec`, ...) are used
//! directly in payloads; they are documented as free-form objects in OpenAPI.

use dashlytics_core::{
    AggregationSpec, CacheStats, Interval, PercentileSummary, Record, SeriesPoint, TimeBucket,
    TimeSeriesSpec,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};

// ============================================================================
// Envelopes
// ============================================================================

/// Successful response envelope: `{ "success": true, "data": ... }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse<T> {
    /// Always true.
    pub success: bool,
    /// Payload.
    pub data: T,
}

impl<T> DataResponse<T> {
    /// Wraps `data` in a success envelope.
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Error kind, e.g. `InvalidSpec`.
    #[schema(example = "InvalidSpec")]
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// HTTP status code.
    #[schema(example = 400)]
    pub status_code: u16,
}

// ============================================================================
// Analytics
// ============================================================================

/// Request to group and reduce records.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AggregateRequest {
    /// Input records (JSON objects).
    #[schema(value_type = Vec<Object>)]
    pub records: Vec<Record>,
    /// Grouping spec: `{ "groupByFields": [...], "aggregations": { field: op } }`.
    #[schema(value_type = Object)]
    pub spec: AggregationSpec,
    /// Reject empty or duplicated field names instead of tolerating them.
    #[serde(default)]
    pub strict: bool,
}

/// Request to bucket records into a time series.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesRequest {
    /// Input records (JSON objects).
    #[schema(value_type = Vec<Object>)]
    pub records: Vec<Record>,
    /// `{ "dateField", "valueField", "interval", "fillMissing" }`.
    #[schema(value_type = Object)]
    pub spec: TimeSeriesSpec,
    /// Trailing window for the moving average. Defaults to the server setting.
    #[schema(example = 7)]
    pub moving_average_window: Option<usize>,
    /// Reject empty field names instead of returning an empty series.
    #[serde(default)]
    pub strict: bool,
}

/// A time bucket enriched with trend columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
    /// Bucket reduction.
    #[serde(flatten)]
    pub bucket: TimeBucket,
    /// Change versus the previous bucket's mean.
    pub growth: f64,
    /// Percent change versus the previous bucket's mean.
    pub growth_rate: f64,
    /// Trailing moving average of bucket means.
    pub moving_average: f64,
}

/// Request to compute period-over-period growth.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GrowthRequest {
    /// Ordered `{ date, value }` points.
    #[schema(value_type = Vec<Object>)]
    pub series: Vec<SeriesPoint>,
}

/// Request to smooth a numeric series.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MovingAverageRequest {
    /// Ordered values.
    pub values: Vec<f64>,
    /// Trailing window size. Defaults to the server setting.
    #[schema(example = 7)]
    pub window: Option<usize>,
}

/// Request to compute percentiles.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PercentileRequest {
    /// Sample values.
    pub values: Vec<f64>,
    /// Ranks in `[0, 100]`. Defaults to 50, 90, 95 and 99.
    pub percentiles: Option<Vec<f64>>,
}

/// Percentile results.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PercentileResponse {
    /// Requested ranks keyed as `p<rank>`, e.g. `p95`.
    pub values: BTreeMap<String, f64>,
    /// p50/p90/p95/p99 over the same sample.
    #[schema(value_type = Object)]
    pub summary: PercentileSummary,
}

// ============================================================================
// Sales (demo)
// ============================================================================

/// Query parameters for the sales dashboard.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SalesQuery {
    /// Days of history, 1 to 365. Defaults to 30.
    pub days: Option<u32>,
    /// Bucket interval. Defaults to `day`.
    #[param(value_type = Option<String>, example = "week")]
    pub interval: Option<Interval>,
    /// Generator seed. Defaults to 42.
    pub seed: Option<u64>,
}

/// Headline figures for the sales dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesTotals {
    /// Total revenue.
    pub revenue: f64,
    /// Number of orders.
    pub orders: usize,
    /// Units sold.
    pub units: f64,
    /// Revenue per order.
    pub average_order_value: f64,
}

/// Sales dashboard payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    /// Days of history covered.
    pub days: u32,
    /// Bucket interval.
    #[schema(value_type = String)]
    pub interval: Interval,
    /// Generator seed.
    pub seed: u64,
    /// When the report was computed (RFC 3339).
    pub generated_at: String,
    /// Headline figures.
    pub totals: SalesTotals,
    /// Revenue per interval with trend columns.
    #[schema(value_type = Vec<Object>)]
    pub series: Vec<TimeSeriesPoint>,
    /// Revenue and units per region.
    #[schema(value_type = Vec<Object>)]
    pub by_region: Vec<Record>,
    /// Revenue and units per product.
    #[schema(value_type = Vec<Object>)]
    pub by_product: Vec<Record>,
    /// Percentiles of order value.
    #[schema(value_type = Object)]
    pub order_value_percentiles: PercentileSummary,
}

// ============================================================================
// Cache
// ============================================================================

/// Result cache counters.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatsResponse {
    /// Lookups served from a fresh entry.
    pub hits: u64,
    /// Lookups that found nothing fresh.
    pub misses: u64,
    /// Entries removed on expiry or for capacity.
    pub evictions: u64,
    /// Entries currently stored.
    pub entries: usize,
    /// `hits / (hits + misses)`.
    pub hit_rate: f64,
}

impl From<CacheStats> for CacheStatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            entries: stats.entries,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Result of clearing the cache.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CacheClearResponse {
    /// Entries removed.
    pub cleared: usize,
}
