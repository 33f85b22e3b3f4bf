// ---------------------------------------------------------------------------
// API error types
// ---------------------------------------------------------------------------

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use summarizer_core::ErrorBody;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ApiError {
    /// 400 Bad Request: well-formed request the service refuses.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// 413 Payload Too Large.
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),
    /// 422 Unprocessable Entity: body does not match the request schema.
    #[error("unprocessable: {0}")]
    Unprocessable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(error = %self, "request rejected");
        let (status, detail) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            ApiError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(rejection.body_text())
        } else {
            ApiError::Unprocessable(rejection.body_text())
        }
    }
}
