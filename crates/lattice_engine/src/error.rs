//! Error types for engine operations.

use std::io;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur inside a storage engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The key is not present in the transaction's visible view.
    #[error("key not found")]
    NotFound,

    /// Commit failed because a concurrently committed transaction wrote an
    /// overlapping key.
    #[error("write conflict on key {key:?}")]
    Conflict {
        /// The first conflicting key detected.
        key: Vec<u8>,
    },

    /// A mutation was attempted on a read-only transaction.
    #[error("transaction is read-only")]
    ReadOnly,

    /// The engine has been closed.
    #[error("engine is closed")]
    Closed,
}
