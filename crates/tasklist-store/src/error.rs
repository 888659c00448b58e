//! Error types for tasklist storage tiers.

use thiserror::Error;

/// Errors raised by a storage backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backend is absent or was never configured.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to encode a snapshot.
    #[error("failed to serialize snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// Other unclassified error.
    #[error("Other error: {0}")]
    Other(String),
}

/// Result alias for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;
