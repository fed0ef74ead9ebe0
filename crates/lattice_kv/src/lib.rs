//! # Lattice KV
//!
//! Transactional key-value access layer for LatticeKV.
//!
//! This crate defines the contract callers rely on - not the storage
//! engine underneath it (see `lattice_engine` for that seam). A
//! [`Database`] hands out two kinds of handles:
//!
//! - [`Transaction`] - read-write, with buffered mutations visible to its
//!   own reads immediately and to everyone else only after a successful
//!   [`Transaction::commit`]. Conflicting concurrent writers are detected
//!   at commit time (first committer wins); the loser observes
//!   [`KvError::Conflict`] and retries with a fresh transaction.
//! - [`Snapshot`] - read-only, frozen at creation: it never observes
//!   commits that happen after it was opened.
//!
//! Keys are non-empty byte strings ordered lexicographically; values are
//! opaque bytes, streamed through [`ValueReader`]. Range iteration comes
//! in three forms - `scan` (unordered), `ascend`, and `descend` - all over
//! half-open `[begin, end)` intervals, produced lazily by [`RangeIter`].
//!
//! ## Example
//!
//! ```rust
//! use lattice_kv::Database;
//!
//! let db = Database::in_memory();
//!
//! let mut txn = db.new_transaction().unwrap();
//! txn.set(b"fruit/apple", &b"red"[..]).unwrap();
//! txn.set(b"fruit/plum", &b"purple"[..]).unwrap();
//! txn.commit().unwrap();
//!
//! let snapshot = db.new_snapshot().unwrap();
//! let mut iter = snapshot.ascend(b"fruit/", b"fruit0").unwrap();
//! let (key, _value) = iter.next().unwrap();
//! assert_eq!(key, &b"fruit/apple"[..]);
//! drop(iter);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod database;
mod error;
mod handle;
mod iter;
mod snapshot;
mod transaction;
mod value;

pub use database::Database;
pub use error::{KvError, KvResult};
pub use iter::RangeIter;
pub use snapshot::Snapshot;
pub use transaction::Transaction;
pub use value::ValueReader;

// Engine-facing surface needed to construct a `Database` over a custom
// engine and to interpret its conflict policy.
pub use lattice_engine::{ConflictGranularity, EngineError, StorageEngine};
