//! Error types for the cloud client

use thiserror::Error;

/// Cloud client error
#[derive(Debug, Error)]
pub enum CloudError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server returned an error
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bearer token could not be obtained
    #[error("Authentication failed: {0}")]
    Auth(String),
}

/// Result type for cloud operations
pub type Result<T> = std::result::Result<T, CloudError>;
