//! # Lattice Engine
//!
//! Storage engine contract for LatticeKV.
//!
//! This crate defines the seam between the transactional access layer and
//! whatever actually stores the bytes. Engines are **opaque sorted
//! key-value stores** with snapshot semantics: they open point-in-time
//! transactional views, iterate keys in order with seek support, and commit
//! atomically with conflict detection. The access layer owns all argument
//! validation and its public error taxonomy; engines only report what
//! physically happened.
//!
//! ## Design Principles
//!
//! - Engines know nothing about the access layer's API contract
//! - Transactions are single-owner; engines are `Send + Sync`
//! - Cursor and transaction teardown is RAII (drop releases resources)
//!
//! ## Available Engines
//!
//! - [`InMemoryEngine`] - MVCC reference engine for tests and ephemeral use
//!
//! ## Example
//!
//! ```rust
//! use lattice_engine::{InMemoryEngine, StorageEngine, TransactionMode};
//!
//! let engine = InMemoryEngine::new();
//! let mut txn = engine.begin(TransactionMode::ReadWrite).unwrap();
//! txn.set(b"key", b"value").unwrap();
//! txn.commit().unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod engine;
mod error;
mod memory;

pub use engine::{
    ConflictGranularity, Direction, EngineCursor, EngineTransaction, StorageEngine,
    TransactionMode,
};
pub use error::{EngineError, EngineResult};
pub use memory::InMemoryEngine;
