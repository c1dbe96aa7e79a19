//! Error types for kindstore
//!
//! Two layers:
//! - [`BackendError`]: anything the key-value backend (engine, WAL,
//!   SSTables, or a third-party adapter) can fail with.
//! - [`StoreError`]: the taxonomy callers of the [`Store`](crate::Store)
//!   see. Backend failures pass through it untouched.

use thiserror::Error;

/// Result type alias for backend operations
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failures surfaced by a key-value backend
#[derive(Debug, Error)]
pub enum BackendError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // WAL Errors
    // -------------------------------------------------------------------------
    #[error("WAL corruption detected: {0}")]
    WalCorruption(String),

    #[error("WAL write failed: {0}")]
    WalWrite(String),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Adapter Errors
    // -------------------------------------------------------------------------
    /// A blocking engine task panicked or was cancelled by the runtime
    #[error("Backend task failed: {0}")]
    Task(String),

    /// The backend has no implementation for this operation
    #[error("Operation not supported by backend: {0}")]
    Unsupported(String),

    /// Escape hatch for third-party backends
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// Errors returned by the typed-object store
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record at the derived key
    #[error("Cannot find object: {key}")]
    NotFound { key: String },

    /// A stored payload could not be parsed into the expected record shape
    #[error("Failed to decode {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be serialized
    #[error("Failed to encode {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A scan returned a key outside the requested kind's partition
    #[error("Key {key} does not belong to kind partition '{kind}'")]
    Corruption { kind: String, key: String },

    #[error("Invalid kind '{0}': kinds must be non-empty and must not contain '_'")]
    InvalidKind(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Operation not supported: {0}")]
    Unsupported(String),

    /// Any other backend failure, unchanged
    #[error(transparent)]
    Backend(BackendError),
}

impl StoreError {
    /// True for [`StoreError::NotFound`]
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

impl From<BackendError> for StoreError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unsupported(op) => StoreError::Unsupported(op),
            other => StoreError::Backend(other),
        }
    }
}
