//! Core error types for focusflow-core.
//!
//! The error taxonomy follows the failure semantics of the system:
//! validation errors are surfaced to callers, not-found drives
//! create-with-defaults, and transient storage/network failures are
//! recovered locally at the store boundaries.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for focusflow-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Local persistence errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Remote sync errors
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Local persistence errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Data directory could not be created or resolved
    #[error("Failed to open data directory {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Write failed
    #[error("Failed to write {file}: {source}")]
    WriteFailed {
        file: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization failed
    #[error("Failed to encode {file}: {source}")]
    EncodeFailed {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    /// Client id file holds something that is not a client id
    #[error("Invalid client id: {0}")]
    InvalidClientId(String),
}

/// Remote profile API errors, keyed by the HTTP contract.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Unknown user id (HTTP 404); clients create-with-defaults on this
    #[error("User not found")]
    NotFound,

    /// Rejected request (HTTP 400)
    #[error("Rejected by server: {0}")]
    Validation(String),

    /// Any other non-success status
    #[error("Server returned HTTP {0}")]
    Http(u16),

    /// Network-level failure
    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::Transport(err.to_string())
    }
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Missing required input
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
