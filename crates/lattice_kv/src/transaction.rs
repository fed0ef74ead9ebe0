//! Read-write transaction handle.

use crate::error::{KvError, KvResult};
use crate::handle::Handle;
use crate::iter::RangeIter;
use crate::value::ValueReader;
use std::io::Read;

/// A read-write unit of work.
///
/// All reads observe the committed state as of the transaction's creation
/// plus the transaction's own buffered writes; nothing becomes visible to
/// other handles until [`commit`](Self::commit) succeeds.
///
/// A transaction is single-owner and ends exactly once: after `commit` or
/// [`rollback`](Self::rollback) the handle is *done* and every operation
/// fails with [`KvError::Done`]. Dropping a still-active transaction rolls
/// it back, so engine resources are released on every exit path.
///
/// # Example
///
/// ```rust
/// use lattice_kv::Database;
///
/// let db = Database::in_memory();
/// let mut txn = db.new_transaction().unwrap();
/// txn.set(b"user/1", &b"alice"[..]).unwrap();
/// assert_eq!(txn.get(b"user/1").unwrap().into_bytes(), &b"alice"[..]);
/// txn.commit().unwrap();
/// ```
#[derive(Debug)]
pub struct Transaction {
    handle: Handle,
}

impl Transaction {
    pub(crate) fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Returns the value visible to this transaction for `key`.
    ///
    /// # Errors
    ///
    /// - [`KvError::InvalidArgument`] for an empty key
    /// - [`KvError::NotFound`] if the key is absent or its deletion is
    ///   visible
    /// - [`KvError::Done`] if the transaction has finished
    pub fn get(&self, key: &[u8]) -> KvResult<ValueReader> {
        self.handle.get(key)
    }

    /// Buffers an upsert of `key` to the contents of `value`.
    ///
    /// The stream is drained to completion before this returns; a
    /// zero-length stream stores a zero-length value. The write is visible
    /// to this transaction's own reads and iterations immediately.
    ///
    /// # Errors
    ///
    /// - [`KvError::InvalidArgument`] for an empty key
    /// - [`KvError::Io`] if draining the stream fails
    /// - [`KvError::Done`] if the transaction has finished
    pub fn set(&mut self, key: &[u8], value: impl Read) -> KvResult<()> {
        self.handle.set(key, value)
    }

    /// Buffers a removal of `key`.
    ///
    /// # Errors
    ///
    /// - [`KvError::InvalidArgument`] for an empty key
    /// - [`KvError::NotFound`] if the engine reports the key absent
    ///   (passed through, not synthesized)
    /// - [`KvError::Done`] if the transaction has finished
    pub fn delete(&mut self, key: &[u8]) -> KvResult<()> {
        self.handle.delete(key)
    }

    /// Iterates all visible pairs in no particular order.
    ///
    /// The order is engine-native; callers must not rely on it.
    ///
    /// # Errors
    ///
    /// Returns [`KvError::Done`] if the transaction has finished.
    pub fn scan(&self) -> KvResult<RangeIter<'_>> {
        self.handle.scan()
    }

    /// Iterates pairs with `begin <= key < end` in ascending key order.
    ///
    /// An empty `begin` starts at the smallest key; an empty `end` runs to
    /// the largest.
    ///
    /// # Errors
    ///
    /// - [`KvError::InvalidArgument`] if both bounds are non-empty and
    ///   `begin > end`
    /// - [`KvError::Done`] if the transaction has finished
    pub fn ascend(&self, begin: &[u8], end: &[u8]) -> KvResult<RangeIter<'_>> {
        self.handle.ascend(begin, end)
    }

    /// Iterates pairs with `begin <= key < end` in descending key order.
    ///
    /// The interval is the same as [`ascend`](Self::ascend); only the
    /// traversal direction differs.
    ///
    /// # Errors
    ///
    /// - [`KvError::InvalidArgument`] if both bounds are non-empty and
    ///   `begin > end`
    /// - [`KvError::Done`] if the transaction has finished
    pub fn descend(&self, begin: &[u8], end: &[u8]) -> KvResult<RangeIter<'_>> {
        self.handle.descend(begin, end)
    }

    /// Atomically publishes all buffered writes.
    ///
    /// The transaction is done afterwards whether or not the commit
    /// succeeded; a failed commit never partially applies.
    ///
    /// # Errors
    ///
    /// - [`KvError::Conflict`] if a concurrently committed transaction
    ///   wrote an overlapping key; retry with a fresh transaction
    /// - [`KvError::Done`] if the transaction has already finished
    pub fn commit(&mut self) -> KvResult<()> {
        match self.handle.commit() {
            Ok(()) => {
                tracing::trace!("transaction committed");
                Ok(())
            }
            Err(err) => {
                if let KvError::Conflict { key } = &err {
                    tracing::debug!(?key, "commit conflict");
                }
                Err(err)
            }
        }
    }

    /// Discards all buffered writes.
    ///
    /// # Errors
    ///
    /// Returns [`KvError::Done`] if the transaction has already finished.
    pub fn rollback(&mut self) -> KvResult<()> {
        self.handle.discard()
    }

    /// Whether the transaction has committed or rolled back.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.handle.is_done()
    }
}
