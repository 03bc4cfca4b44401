//! Client error types

use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (transport, TLS, timeout)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response arrived but did not match the documented shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request rejected by backend validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Backend internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Whether the error happened before a response was decoded
    /// (network unreachable, timeout, connection reset).
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Http(_))
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
