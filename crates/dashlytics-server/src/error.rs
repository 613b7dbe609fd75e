//! Error responses for the REST API.
//!
//! Handlers return `Result<Json<T>, ApiError>`; every failure is rendered as
//! `{ "error", "message", "statusCode" }`.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    Json,
};

use crate::types::ErrorResponse;

/// Status code and JSON body of a failed request.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Builds an error response.
pub fn api_error(status: StatusCode, error: &str, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            message: message.into(),
            status_code: status.as_u16(),
        }),
    )
}

/// Maps an engine error to a response. Caller mistakes are 4xx.
pub fn engine_error(err: &dashlytics_core::Error) -> ApiError {
    let status = match err {
        dashlytics_core::Error::TooManyRecords { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        e if e.is_client_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!(code = err.code(), error = %err, "request failed");
    }
    api_error(status, err.kind(), err.to_string())
}

/// Maps a rejected JSON body.
pub fn json_rejection(rejection: &JsonRejection) -> ApiError {
    api_error(rejection.status(), "InvalidBody", rejection.body_text())
}

/// Maps rejected query parameters.
pub fn query_rejection(rejection: &QueryRejection) -> ApiError {
    api_error(rejection.status(), "InvalidQuery", rejection.body_text())
}
