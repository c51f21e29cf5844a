//! Unified API error type and conversions.

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::storage::StorageError;

/// Every way a request can fail, each carrying its HTTP shape.
///
/// `Forbidden`, `NotFound` and `MethodNotAllowed` are intentional outcomes with
/// fixed statuses; `Internal` wraps any unexpected failure's description and
/// becomes a 500.
#[derive(Debug)]
pub enum ApiError {
    Forbidden,
    NotFound(String),
    MethodNotAllowed(Method),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden").into_response(),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            ApiError::MethodNotAllowed(method) => (
                StatusCode::METHOD_NOT_ALLOWED,
                format!("Method {method} is not allowed"),
            )
                .into_response(),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response(),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::Forbidden => ApiError::Forbidden,
            // Handlers consume the io error kinds they understand before this
            // conversion runs; whatever reaches here is a 500.
            StorageError::Io(err) => ApiError::Internal(err.to_string()),
        }
    }
}
