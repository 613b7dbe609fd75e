//! Stateless analytics handlers.
//!
//! Each handler runs one engine operation over the request payload. Dirty
//! records never fail a request; only malformed JSON, strict-mode spec checks
//! and the record limit do.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use dashlytics_core::engine::check_record_limit;
use dashlytics_core::{
    growth_rates, moving_average as smooth, percentiles, GrowthPoint, PercentileSummary, Record,
    SeriesPoint, TimeBucket,
};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{engine_error, json_rejection, ApiError};
use crate::types::{
    AggregateRequest, DataResponse, ErrorResponse, GrowthRequest, MovingAverageRequest,
    PercentileRequest, PercentileResponse, TimeSeriesPoint, TimeSeriesRequest,
};
use crate::AppState;

const DEFAULT_PERCENTILES: [f64; 4] = [50.0, 90.0, 95.0, 99.0];

/// Adds growth and moving-average columns to ordered buckets.
pub(crate) fn enrich(buckets: Vec<TimeBucket>, window: usize) -> Vec<TimeSeriesPoint> {
    let series: Vec<SeriesPoint> = buckets.iter().map(SeriesPoint::from).collect();
    let values: Vec<f64> = buckets.iter().map(|b| b.value).collect();
    let growth = growth_rates(&series);
    let averages = smooth(&values, window);

    buckets
        .into_iter()
        .zip(growth)
        .zip(averages)
        .map(|((bucket, g), moving_average)| TimeSeriesPoint {
            bucket,
            growth: g.growth,
            growth_rate: g.growth_rate,
            moving_average,
        })
        .collect()
}

/// Group records and reduce each group.
#[utoipa::path(
    post,
    path = "/api/analytics/aggregate",
    tag = "analytics",
    request_body = AggregateRequest,
    responses(
        (status = 200, description = "One row per group, in first-seen order", body = Object),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 413, description = "Too many records", body = ErrorResponse)
    )
)]
pub async fn aggregate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AggregateRequest>, JsonRejection>,
) -> Result<Json<DataResponse<Vec<Record>>>, ApiError> {
    let Json(req) = payload.map_err(|e| json_rejection(&e))?;
    check_record_limit(req.records.len(), state.config.engine.max_records)
        .map_err(|e| engine_error(&e))?;
    if req.strict {
        req.spec.validate().map_err(|e| engine_error(&e))?;
    }

    let rows = dashlytics_core::aggregate(&req.records, &req.spec);
    Ok(Json(DataResponse::new(rows)))
}

/// Bucket records by calendar interval and add trend columns.
#[utoipa::path(
    post,
    path = "/api/analytics/timeseries",
    tag = "analytics",
    request_body = TimeSeriesRequest,
    responses(
        (status = 200, description = "Buckets ordered by start time", body = Object),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 413, description = "Too many records", body = ErrorResponse)
    )
)]
pub async fn timeseries(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TimeSeriesRequest>, JsonRejection>,
) -> Result<Json<DataResponse<Vec<TimeSeriesPoint>>>, ApiError> {
    let Json(req) = payload.map_err(|e| json_rejection(&e))?;
    check_record_limit(req.records.len(), state.config.engine.max_records)
        .map_err(|e| engine_error(&e))?;
    if req.strict {
        req.spec.validate().map_err(|e| engine_error(&e))?;
    }

    let window = req
        .moving_average_window
        .unwrap_or(state.config.engine.default_moving_average_window);
    let buckets = dashlytics_core::bucket(&req.records, &req.spec);
    Ok(Json(DataResponse::new(enrich(buckets, window))))
}

/// Period-over-period growth of an ordered series.
#[utoipa::path(
    post,
    path = "/api/analytics/growth",
    tag = "analytics",
    request_body = GrowthRequest,
    responses(
        (status = 200, description = "Series with growth columns", body = Object),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
pub async fn growth(
    payload: Result<Json<GrowthRequest>, JsonRejection>,
) -> Result<Json<DataResponse<Vec<GrowthPoint>>>, ApiError> {
    let Json(req) = payload.map_err(|e| json_rejection(&e))?;
    Ok(Json(DataResponse::new(growth_rates(&req.series))))
}

/// Trailing moving average of a numeric series.
#[utoipa::path(
    post,
    path = "/api/analytics/moving-average",
    tag = "analytics",
    request_body = MovingAverageRequest,
    responses(
        (status = 200, description = "Smoothed values, same length as input", body = Object),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
pub async fn moving_average(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MovingAverageRequest>, JsonRejection>,
) -> Result<Json<DataResponse<Vec<f64>>>, ApiError> {
    let Json(req) = payload.map_err(|e| json_rejection(&e))?;
    let window = req
        .window
        .unwrap_or(state.config.engine.default_moving_average_window);
    Ok(Json(DataResponse::new(smooth(&req.values, window))))
}

/// Nearest-rank percentiles of a sample.
#[utoipa::path(
    post,
    path = "/api/analytics/percentile",
    tag = "analytics",
    request_body = PercentileRequest,
    responses(
        (status = 200, description = "Requested percentiles and summary", body = PercentileResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
pub async fn percentile(
    payload: Result<Json<PercentileRequest>, JsonRejection>,
) -> Result<Json<DataResponse<PercentileResponse>>, ApiError> {
    let Json(req) = payload.map_err(|e| json_rejection(&e))?;
    let ranks = req
        .percentiles
        .unwrap_or_else(|| DEFAULT_PERCENTILES.to_vec());

    let results = percentiles(&req.values, &ranks);
    let values: BTreeMap<String, f64> = ranks
        .iter()
        .zip(results)
        .map(|(rank, value)| (format!("p{rank}"), value))
        .collect();

    Ok(Json(DataResponse::new(PercentileResponse {
        values,
        summary: PercentileSummary::from_values(&req.values),
    })))
}
