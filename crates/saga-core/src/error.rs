//! Domain error types.

use thiserror::Error;

/// Top-level domain error type shared by the quiz and story contexts.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A character, question, or story was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller did not present valid admin credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The resource exists but may not be read.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A validation error in request or domain data.
    #[error("validation error: {0}")]
    Validation(String),

    /// The external generation API answered with a non-success status.
    #[error("upstream request failed with status {status}")]
    Upstream {
        /// HTTP status returned by the upstream API.
        status: u16,
    },

    /// A filesystem, network, or serialization error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        Self::Infrastructure(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Infrastructure(format!("json error: {err}"))
    }
}
