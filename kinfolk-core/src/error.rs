//! Error types for the kinfolk ecosystem.

use thiserror::Error;

/// Errors that can occur in kinfolk operations.
#[derive(Error, Debug)]
pub enum KinError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not allowed: {0}")]
    Forbidden(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Recurrence error: {0}")]
    Recurrence(String),

    #[error("Photo error: {0}")]
    Photo(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl KinError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        KinError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

/// Result type alias for kinfolk operations.
pub type KinResult<T> = Result<T, KinError>;
