use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::domain::DomainError;

/// HTTP-facing error for the web API.
#[derive(Debug)]
pub enum ApiError {
    /// The client handle could not be initialized; nothing remote can run.
    ClientUnavailable(String),
    BadRequest(String),
    /// Malformed or oversized multipart body.
    Multipart(StatusCode, String),
    Internal(String),
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::Multipart(err.status(), err.body_text())
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            e if e.is_fatal_to_session() => Self::ClientUnavailable(e.detail()),
            e if e.is_invalid_input() => Self::BadRequest(e.detail()),
            e => Self::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::ClientUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Multipart(status, msg) => (status, msg),
            Self::Internal(msg) => {
                error!("Request failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
