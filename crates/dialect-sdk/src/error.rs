//! Error types for the Dialect SDK

use crate::backend::BackendKind;
use thiserror::Error;

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;

/// SDK error types
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration or call arguments are self-contradictory or unrecognized
    #[error("Illegal argument: {0}")]
    IllegalArgument(String),

    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Cloud backend transport error
    #[error("Cloud error: {0}")]
    Cloud(#[from] dialect_cloud_client::CloudError),

    /// Ledger backend error
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// Auth token could not be issued or parsed
    #[error("Token error: {0}")]
    Token(String),

    /// Wallet refused or cannot perform an operation
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Encryption keys or cipher unavailable
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Token or key storage failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Identity provider failure
    #[error("Identity error: {0}")]
    Identity(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A broadcast reached no backend
    #[error("{operation} failed on every backend: {}", format_failures(.failures))]
    AllBackendsFailed {
        operation: String,
        failures: Vec<(BackendKind, String)>,
    },
}

fn format_failures(failures: &[(BackendKind, String)]) -> String {
    failures
        .iter()
        .map(|(backend, err)| format!("{}: {}", backend, err))
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<serde_json::Error> for SdkError {
    fn from(err: serde_json::Error) -> Self {
        SdkError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for SdkError {
    fn from(err: reqwest::Error) -> Self {
        SdkError::Ledger(err.to_string())
    }
}

impl From<std::io::Error> for SdkError {
    fn from(err: std::io::Error) -> Self {
        SdkError::Storage(err.to_string())
    }
}
