#![allow(clippy::doc_markdown)]
//! Integration tests for the `Dashlytics` REST API.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use dashlytics_core::DashConfig;
use dashlytics_server::{create_router, AppState};

/// Helper to create the test app with default configuration.
fn create_test_app() -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(DashConfig::default()));
    (create_router(Arc::clone(&state)), state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Request failed");
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("Failed to parse JSON")
    };
    (status, json)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("Failed to build request")
}

#[tokio::test]
async fn test_health_check() {
    let (app, _state) = create_test_app();

    let (status, json) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}

// =========================================================================
// Aggregate
// =========================================================================

#[tokio::test]
async fn test_aggregate_groups_and_reduces() {
    // Arrange
    let (app, _state) = create_test_app();
    let body = json!({
        "records": [
            {"region": "A", "revenue": 10},
            {"region": "A", "revenue": 20},
            {"region": "B", "revenue": 5}
        ],
        "spec": {
            "groupByFields": ["region"],
            "aggregations": {"revenue": "sum"}
        }
    });

    // Act
    let (status, json) = send(&app, post_json("/api/analytics/aggregate", &body)).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(
        json["data"],
        json!([
            {"region": "A", "revenue": 30},
            {"region": "B", "revenue": 5}
        ])
    );
}

#[tokio::test]
async fn test_aggregate_skips_dirty_values() {
    let (app, _state) = create_test_app();
    let body = json!({
        "records": [
            {"region": "A", "revenue": 10},
            {"region": "A", "revenue": "n/a"},
            {"region": "A", "revenue": null},
            {"region": "A", "revenue": "30"}
        ],
        "spec": {
            "groupByFields": ["region"],
            "aggregations": {"revenue": "avg", "orders": "count"}
        }
    });

    let (status, json) = send(&app, post_json("/api/analytics/aggregate", &body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"][0]["revenue"], 20);
    assert_eq!(json["data"][0]["orders"], 4);
}

#[tokio::test]
async fn test_aggregate_strict_rejects_duplicate_group_fields() {
    let (app, _state) = create_test_app();
    let body = json!({
        "records": [],
        "spec": {"groupByFields": ["region", "region"], "aggregations": {}},
        "strict": true
    });

    let (status, json) = send(&app, post_json("/api/analytics/aggregate", &body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "InvalidSpec");
    assert_eq!(json["statusCode"], 400);
}

#[tokio::test]
async fn test_aggregate_rejects_unknown_operator() {
    let (app, _state) = create_test_app();
    let body = json!({
        "records": [],
        "spec": {"groupByFields": ["region"], "aggregations": {"revenue": "mode"}}
    });

    let (status, json) = send(&app, post_json("/api/analytics/aggregate", &body)).await;

    assert!(status.is_client_error());
    assert_eq!(json["error"], "InvalidBody");
}

#[tokio::test]
async fn test_aggregate_enforces_record_limit() {
    // Arrange
    let mut config = DashConfig::default();
    config.engine.max_records = 2;
    let app = create_router(Arc::new(AppState::new(config)));
    let body = json!({
        "records": [{"a": 1}, {"a": 2}, {"a": 3}],
        "spec": {"groupByFields": ["a"], "aggregations": {}}
    });

    // Act
    let (status, json) = send(&app, post_json("/api/analytics/aggregate", &body)).await;

    // Assert
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["error"], "TooManyRecords");
}

// =========================================================================
// Time series and trends
// =========================================================================

#[tokio::test]
async fn test_timeseries_buckets_by_iso_week() {
    // Arrange
    let (app, _state) = create_test_app();
    let body = json!({
        "records": [
            {"date": "2021-01-03", "revenue": 10},
            {"date": "2021-01-01", "revenue": 30},
            {"date": "2021-01-04", "revenue": 40},
            {"date": "not a date", "revenue": 99}
        ],
        "spec": {"dateField": "date", "valueField": "revenue", "interval": "week"},
        "movingAverageWindow": 2
    });

    // Act
    let (status, json) = send(&app, post_json("/api/analytics/timeseries", &body)).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    let data = json["data"].as_array().expect("array");
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["date"], "2020-W53");
    assert_eq!(data[0]["value"], 20.0);
    assert_eq!(data[0]["count"], 2);
    assert_eq!(data[1]["date"], "2021-W1");
    assert_eq!(data[1]["growth"], 20.0);
    assert_eq!(data[1]["growthRate"], 100.0);
    assert_eq!(data[1]["movingAverage"], 30.0);
}

#[tokio::test]
async fn test_growth_endpoint() {
    let (app, _state) = create_test_app();
    let body = json!({
        "series": [
            {"date": "2024-01", "value": 0},
            {"date": "2024-02", "value": 50},
            {"date": "2024-03", "value": 75}
        ]
    });

    let (status, json) = send(&app, post_json("/api/analytics/growth", &body)).await;

    assert_eq!(status, StatusCode::OK);
    let data = json["data"].as_array().expect("array");
    assert_eq!(data[0]["growthRate"], 0.0);
    assert_eq!(data[1]["growth"], 50.0);
    assert_eq!(data[1]["growthRate"], 0.0);
    assert_eq!(data[2]["growthRate"], 50.0);
}

#[tokio::test]
async fn test_moving_average_endpoint() {
    let (app, _state) = create_test_app();
    let body = json!({"values": [10, 20, 30], "window": 5});

    let (status, json) = send(&app, post_json("/api/analytics/moving-average", &body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], json!([10.0, 15.0, 20.0]));
}

#[tokio::test]
async fn test_percentile_endpoint() {
    let (app, _state) = create_test_app();
    let body = json!({"values": [10, 20, 30, 40], "percentiles": [50, 100]});

    let (status, json) = send(&app, post_json("/api/analytics/percentile", &body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["values"]["p50"], 20.0);
    assert_eq!(json["data"]["values"]["p100"], 40.0);
    assert_eq!(json["data"]["summary"]["p99"], 40.0);
}

#[tokio::test]
async fn test_malformed_json_returns_error_envelope() {
    let (app, _state) = create_test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/analytics/percentile")
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .expect("Failed to build request");

    let (status, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "InvalidBody");
    assert_eq!(json["statusCode"], 400);
}

// =========================================================================
// Sales dashboard and cache
// =========================================================================

#[tokio::test]
async fn test_sales_dashboard_is_cached() {
    // Arrange
    let (app, state) = create_test_app();

    // Act
    let (first_status, first) = send(&app, get("/api/sales?days=14&seed=7")).await;
    let (second_status, second) = send(&app, get("/api/sales?days=14&seed=7")).await;

    // Assert
    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(first["data"]["generatedAt"], second["data"]["generatedAt"]);
    assert_eq!(first["data"]["series"].as_array().map(Vec::len), Some(14));
    let stats = state.cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.entries, 1);
}

#[tokio::test]
async fn test_sales_dashboard_distinct_queries_use_distinct_entries() {
    let (app, state) = create_test_app();

    let _ = send(&app, get("/api/sales?days=7")).await;
    let _ = send(&app, get("/api/sales?days=7&interval=week")).await;

    assert_eq!(state.cache.len(), 2);
    assert!(state.cache.has("/api/sales?days=7&interval=week"));
}

#[tokio::test]
async fn test_sales_dashboard_rejects_bad_days() {
    let (app, _state) = create_test_app();

    let (status, json) = send(&app, get("/api/sales?days=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "InvalidArgument");

    let (status, json) = send(&app, get("/api/sales?interval=fortnight")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "InvalidQuery");
}

#[tokio::test]
async fn test_cache_stats_and_clear() {
    // Arrange
    let (app, _state) = create_test_app();
    let _ = send(&app, get("/api/sales?days=3")).await;

    // Act
    let (_, stats) = send(&app, get("/api/cache/stats")).await;
    let request = Request::builder()
        .method("DELETE")
        .uri("/api/cache")
        .body(Body::empty())
        .expect("Failed to build request");
    let (clear_status, cleared) = send(&app, request).await;
    let (_, after) = send(&app, get("/api/cache/stats")).await;

    // Assert
    assert_eq!(stats["data"]["entries"], 1);
    assert_eq!(stats["data"]["misses"], 1);
    assert_eq!(clear_status, StatusCode::OK);
    assert_eq!(cleared["data"]["cleared"], 1);
    assert_eq!(after["data"]["entries"], 0);
    assert_eq!(after["data"]["misses"], 1);
}
