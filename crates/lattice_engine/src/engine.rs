//! Storage engine trait definitions.

use crate::error::EngineResult;
use bytes::Bytes;

/// Mode a transaction is opened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionMode {
    /// Reads and writes; commit makes buffered writes durable.
    ReadWrite,
    /// Reads only; the visible view is frozen at open time.
    ReadOnly,
}

/// Traversal direction of an engine cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ascending key order.
    Forward,
    /// Descending key order.
    Reverse,
}

/// Granularity at which an engine detects write conflicts.
///
/// Engines differ in how precisely they track conflicting writers. The
/// access layer surfaces this as a queryable property rather than assuming
/// one policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictGranularity {
    /// Conflicts are detected per key: transactions with disjoint write
    /// sets never conflict.
    Key,
    /// Conflicts are detected per transaction: any two concurrent writers
    /// may conflict regardless of key overlap.
    Transaction,
}

/// A transactional, sorted storage engine.
///
/// Engines are **opaque key-value stores** with snapshot semantics. They
/// provide point-in-time transactional views, ordered iteration, and atomic
/// commit with conflict detection. The access layer owns all argument
/// validation and error taxonomy - engines only report what physically
/// happened.
///
/// # Invariants
///
/// - Every transaction observes a consistent view of the committed state as
///   of its open, plus its own buffered writes
/// - A successful commit is atomic and totally ordered with respect to all
///   other successful commits
/// - Commit fails with [`EngineError::Conflict`] when a transaction that
///   started concurrently has already committed an overlapping write
/// - Engines must be `Send + Sync`; transactions are single-owner
///
/// # Implementors
///
/// - [`super::InMemoryEngine`] - MVCC reference engine for tests and
///   ephemeral databases
pub trait StorageEngine: Send + Sync {
    /// Opens a new transaction in the given mode.
    ///
    /// The transaction's visible state is the committed state at the
    /// instant of the call.
    ///
    /// # Errors
    ///
    /// Returns an error on resource exhaustion or if the engine is closed.
    fn begin(&self, mode: TransactionMode) -> EngineResult<Box<dyn EngineTransaction>>;

    /// Reports the granularity of this engine's conflict detection.
    fn conflict_granularity(&self) -> ConflictGranularity;
}

/// One engine-level transaction.
///
/// Buffered writes are visible to this transaction's own reads and cursors
/// immediately, and to nobody else until [`commit`](Self::commit) succeeds.
pub trait EngineTransaction: Send {
    /// Returns the value for `key` in this transaction's visible view.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] if the key is absent or deleted in
    /// the visible view.
    fn get(&self, key: &[u8]) -> EngineResult<Bytes>;

    /// Buffers an upsert of `key` to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ReadOnly`] on a read-only transaction.
    fn set(&mut self, key: &[u8], value: &[u8]) -> EngineResult<()>;

    /// Buffers a removal of `key`.
    ///
    /// Engines may report [`EngineError::NotFound`] for a key absent from
    /// the visible view; engines that buffer blind tombstones succeed.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ReadOnly`] on a read-only transaction.
    fn delete(&mut self, key: &[u8]) -> EngineResult<()>;

    /// Opens a cursor over this transaction's visible view, including its
    /// own buffered writes.
    ///
    /// The cursor is positioned before the first entry; call
    /// [`EngineCursor::rewind`] or [`EngineCursor::seek`] before reading.
    /// Cursor resources are released on drop.
    ///
    /// # Errors
    ///
    /// Returns an error if the cursor cannot be opened.
    fn cursor(&self, direction: Direction) -> EngineResult<Box<dyn EngineCursor + '_>>;

    /// Atomically publishes all buffered writes.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Conflict`] when a concurrently committed
    /// transaction wrote an overlapping key; the transaction is consumed
    /// either way.
    fn commit(self: Box<Self>) -> EngineResult<()>;

    /// Discards all buffered writes and releases the transaction.
    fn rollback(self: Box<Self>);
}

/// A positioned cursor over a transaction's visible key space.
///
/// Traversal order is fixed at open time: ascending for
/// [`Direction::Forward`], descending for [`Direction::Reverse`].
pub trait EngineCursor {
    /// Positions the cursor at the first key in traversal order.
    fn rewind(&mut self);

    /// Seeks relative to `key`: in forward mode, the first key `>= key`;
    /// in reverse mode, the first key `<= key`.
    fn seek(&mut self, key: &[u8]);

    /// Whether the cursor is positioned at an entry.
    fn valid(&self) -> bool;

    /// The key at the cursor position, or `None` when exhausted.
    fn key(&self) -> Option<&[u8]>;

    /// The value at the cursor position.
    ///
    /// # Errors
    ///
    /// Returns an engine read error, or [`EngineError::NotFound`] when the
    /// cursor is not positioned at an entry.
    fn value(&self) -> EngineResult<Bytes>;

    /// Moves the cursor one entry in traversal order.
    fn advance(&mut self);
}
