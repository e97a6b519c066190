//! Saga — API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use saga_core::error::DomainError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API servers.
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable or config file could not be used.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Binding the listener or serving connections failed.
    #[error("server failed: {0}")]
    Server(#[from] std::io::Error),
}

/// Body of every JSON error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Stable code clients can match on.
    pub error: &'static str,
    /// Text for display.
    pub message: String,
}

/// A `DomainError` on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            DomainError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            DomainError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            DomainError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            DomainError::Upstream { status } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                "upstream_error",
            ),
            DomainError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        };

        let message = match &self.0 {
            DomainError::Upstream { .. } => "API request failed".to_owned(),
            other => other.to_string(),
        };

        (
            status,
            Json(ErrorBody {
                error: error_code,
                message,
            }),
        )
            .into_response()
    }
}
