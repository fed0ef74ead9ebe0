//! Error types for the key-value access layer.

use lattice_engine::EngineError;
use std::io;
use thiserror::Error;

/// Result type for key-value operations.
pub type KvResult<T> = Result<T, KvError>;

/// Errors that can occur in key-value operations.
#[derive(Debug, Error)]
pub enum KvError {
    /// An argument violated the API contract (empty key, inverted range
    /// bounds).
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the violation.
        message: String,
    },

    /// The key is absent from the handle's visible view, or its deletion
    /// is visible. An absent key is not a system failure.
    #[error("key not found")]
    NotFound,

    /// The handle has already committed, rolled back, or been discarded.
    /// Treat this as a usage bug, not a transient condition.
    #[error("transaction has already finished")]
    Done,

    /// Commit failed because a concurrently committed transaction wrote an
    /// overlapping key. Retry with a fresh transaction.
    #[error("commit conflict on key {key:?}")]
    Conflict {
        /// The first conflicting key the engine reported.
        key: Vec<u8>,
    },

    /// The database has been closed.
    #[error("database is closed")]
    Closed,

    /// An I/O error occurred while draining a caller-supplied value stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An engine failure with no KV-level interpretation, surfaced
    /// unchanged.
    #[error("engine error: {0}")]
    Engine(EngineError),
}

impl KvError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

impl From<EngineError> for KvError {
    fn from(err: EngineError) -> Self {
        // NotFound and Conflict have KV-level meanings; everything else is
        // an engine failure surfaced as-is.
        match err {
            EngineError::NotFound => Self::NotFound,
            EngineError::Conflict { key } => Self::Conflict { key },
            other => Self::Engine(other),
        }
    }
}
