//! Mapping of service errors onto HTTP responses.

use crate::task::services::{ErrorClass, TaskOrderError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Errors returned by HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The bearer token was missing or invalid.
    #[error("authentication required")]
    Unauthorized,
    /// The request could not be parsed.
    #[error("{0}")]
    BadRequest(String),
    /// The service rejected the request.
    #[error(transparent)]
    Service(#[from] TaskOrderError),
}

/// Result type for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            Self::Service(err) => match err.class() {
                // Another user's list is indistinguishable from a missing one.
                ErrorClass::Authorization => (StatusCode::NOT_FOUND, "list not found".to_owned()),
                ErrorClass::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
                ErrorClass::Validation => (StatusCode::BAD_REQUEST, err.to_string()),
                ErrorClass::Conflict => (StatusCode::CONFLICT, err.to_string()),
                ErrorClass::Internal => {
                    tracing::error!(error = %err, "request failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal server error".to_owned(),
                    )
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(json!({ "error": message }))).into_response()
    }
}
