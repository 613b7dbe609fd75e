//! Demo sales dashboard backed by the result cache.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::Uri,
    Json,
};
use chrono::{DateTime, SecondsFormat, Utc};
use dashlytics_core::engine::stats;
use dashlytics_core::{
    aggregate, bucket, request_key, AggregateOp, AggregationSpec, Error, Interval,
    PercentileSummary, Record, TimeSeriesSpec,
};
use std::sync::Arc;

use super::analytics::enrich;
use crate::error::{engine_error, query_rejection, ApiError};
use crate::mock::generate_sales;
use crate::types::{DataResponse, ErrorResponse, SalesQuery, SalesReport, SalesTotals};
use crate::AppState;

const DEFAULT_DAYS: u32 = 30;
const MAX_DAYS: u32 = 365;
const DEFAULT_SEED: u64 = 42;

fn breakdown(records: &[Record], field: &str) -> Vec<Record> {
    let spec = AggregationSpec::new([field])
        .with("revenue", AggregateOp::Sum)
        .with("units", AggregateOp::Sum)
        .with("orders", AggregateOp::Count);
    aggregate(records, &spec)
}

/// Generates mock orders and runs them through the engine.
pub(crate) fn build_report(
    days: u32,
    interval: Interval,
    seed: u64,
    window: usize,
    now: DateTime<Utc>,
) -> SalesReport {
    let records = generate_sales(days, seed, now);
    let revenues: Vec<f64> = records.iter().filter_map(|r| r.number("revenue")).collect();
    let units: Vec<f64> = records.iter().filter_map(|r| r.number("units")).collect();

    let revenue = stats::sum(&revenues);
    let orders = records.len();
    let average_order_value = if orders == 0 {
        0.0
    } else {
        revenue / orders as f64
    };

    let buckets = bucket(&records, &TimeSeriesSpec::new("date", "revenue", interval));

    SalesReport {
        days,
        interval,
        seed,
        generated_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        totals: SalesTotals {
            revenue,
            orders,
            units: stats::sum(&units),
            average_order_value,
        },
        series: enrich(buckets, window),
        by_region: breakdown(&records, "region"),
        by_product: breakdown(&records, "product"),
        order_value_percentiles: PercentileSummary::from_values(&revenues),
    }
}

/// Sales dashboard over generated data.
///
/// Results are cached per `<path>?<query>` for the configured default TTL.
#[utoipa::path(
    get,
    path = "/api/sales",
    tag = "sales",
    params(SalesQuery),
    responses(
        (status = 200, description = "Sales report", body = SalesReport),
        (status = 400, description = "Invalid query", body = ErrorResponse)
    )
)]
pub async fn sales_dashboard(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    query: Result<Query<SalesQuery>, QueryRejection>,
) -> Result<Json<DataResponse<serde_json::Value>>, ApiError> {
    let Query(params) = query.map_err(|e| query_rejection(&e))?;
    let days = params.days.unwrap_or(DEFAULT_DAYS);
    if !(1..=MAX_DAYS).contains(&days) {
        return Err(engine_error(&Error::InvalidArgument {
            name: "days".to_string(),
            message: format!("must be between 1 and {MAX_DAYS}, got {days}"),
        }));
    }
    let interval = params.interval.unwrap_or_default();
    let seed = params.seed.unwrap_or(DEFAULT_SEED);
    let window = state.config.engine.default_moving_average_window;

    let key = request_key(uri.path(), uri.query());
    let report = state
        .cache
        .get_or_compute(&key, None, move || async move {
            tracing::debug!(days, %interval, seed, "computing sales report");
            let report = build_report(days, interval, seed, window, Utc::now());
            serde_json::to_value(report).map_err(Error::from)
        })
        .await
        .map_err(|e| engine_error(&e))?;

    Ok(Json(DataResponse::new(report)))
}
