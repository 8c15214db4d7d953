//! Unified error handling for the server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mccoy_engine::BackendError;
use serde::Serialize;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Engine error: {0}")]
    Engine(#[from] mccoy_engine::Error),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl From<BackendError> for AppError {
    fn from(e: BackendError) -> Self {
        AppError::Engine(e.into())
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    /// Status code and client-facing message for this error.
    fn status_and_message(&self) -> (StatusCode, String, Option<String>) {
        match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                    None,
                )
            }
            AppError::Engine(e) => engine_status(e),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            AppError::Unauthorized(reason) => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized".to_string(),
                Some(reason.to_string()),
            ),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone(), None),
        }
    }
}

fn engine_status(e: &mccoy_engine::Error) -> (StatusCode, String, Option<String>) {
    use mccoy_engine::Error;

    match e {
        Error::Backend(BackendError::Request(msg)) => {
            tracing::error!("Backend request failed: {}", msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
                None,
            )
        }
        Error::Backend(BackendError::NotFound(_)) | Error::ReservationNotFound(_) => {
            (StatusCode::NOT_FOUND, e.to_string(), None)
        }
        Error::Backend(BackendError::PermissionDenied) | Error::NotAdmin => {
            (StatusCode::FORBIDDEN, e.to_string(), None)
        }
        _ => {
            tracing::warn!("Engine error: {:?}", e);
            (StatusCode::BAD_REQUEST, e.to_string(), None)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, details) = self.status_and_message();

        let body = Json(ErrorResponse {
            error: error_message,
            details,
        });

        (status, body).into_response()
    }
}

/// Result type alias for handlers.
pub type Result<T> = std::result::Result<T, AppError>;
