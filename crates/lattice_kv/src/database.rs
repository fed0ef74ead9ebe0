//! Database facade.

use crate::error::{KvError, KvResult};
use crate::handle::Handle;
use crate::snapshot::Snapshot;
use crate::transaction::Transaction;
use lattice_engine::{ConflictGranularity, InMemoryEngine, StorageEngine, TransactionMode};
use parking_lot::RwLock;
use std::sync::Arc;

/// The main database handle.
///
/// `Database` owns the storage engine for its lifetime and is the factory
/// for [`Transaction`] and [`Snapshot`] handles. The engine is shared and
/// safe for concurrent use; every handle is independently owned by its
/// caller.
///
/// Each handle allocates engine resources that are released by exactly one
/// terminal call (`commit`/`rollback`/`discard`) - or by drop, as a
/// backstop. The [`update`](Self::update) and [`view`](Self::view) helpers
/// package that discipline for the common cases.
///
/// # Example
///
/// ```rust
/// use lattice_kv::Database;
///
/// let db = Database::in_memory();
/// db.update(|txn| txn.set(b"config/mode", &b"fast"[..])).unwrap();
///
/// let mode = db
///     .view(|snap| Ok(snap.get(b"config/mode")?.into_bytes()))
///     .unwrap();
/// assert_eq!(mode, &b"fast"[..]);
/// ```
pub struct Database {
    engine: Arc<dyn StorageEngine>,
    is_open: RwLock<bool>,
}

impl Database {
    /// Creates a database over the given storage engine.
    #[must_use]
    pub fn new(engine: Arc<dyn StorageEngine>) -> Self {
        Self {
            engine,
            is_open: RwLock::new(true),
        }
    }

    /// Creates a database over a fresh [`InMemoryEngine`].
    ///
    /// Suitable for tests and ephemeral state.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryEngine::new()))
    }

    fn ensure_open(&self) -> KvResult<()> {
        if *self.is_open.read() {
            Ok(())
        } else {
            Err(KvError::Closed)
        }
    }

    /// Opens a fresh read-write transaction.
    ///
    /// # Errors
    ///
    /// Returns [`KvError::Closed`] after [`close`](Self::close), or an
    /// engine error on resource exhaustion.
    pub fn new_transaction(&self) -> KvResult<Transaction> {
        self.ensure_open()?;
        let txn = self.engine.begin(TransactionMode::ReadWrite)?;
        Ok(Transaction::new(Handle::new(txn)))
    }

    /// Opens a read-only snapshot whose visible state is the committed
    /// state at the instant of the call.
    ///
    /// # Errors
    ///
    /// Returns [`KvError::Closed`] after [`close`](Self::close), or an
    /// engine error on resource exhaustion.
    pub fn new_snapshot(&self) -> KvResult<Snapshot> {
        self.ensure_open()?;
        let txn = self.engine.begin(TransactionMode::ReadOnly)?;
        Ok(Snapshot::new(Handle::new(txn)))
    }

    /// Runs `f` inside a transaction, committing on `Ok` and rolling back
    /// on `Err`.
    ///
    /// # Errors
    ///
    /// Returns `f`'s error, or the commit error (including
    /// [`KvError::Conflict`]).
    pub fn update<T, F>(&self, f: F) -> KvResult<T>
    where
        F: FnOnce(&mut Transaction) -> KvResult<T>,
    {
        let mut txn = self.new_transaction()?;
        match f(&mut txn) {
            Ok(result) => {
                txn.commit()?;
                Ok(result)
            }
            Err(err) => {
                // Roll back without masking the original error.
                let _ = txn.rollback();
                Err(err)
            }
        }
    }

    /// Runs `f` against a snapshot, discarding it on every path.
    ///
    /// # Errors
    ///
    /// Returns `f`'s error.
    pub fn view<T, F>(&self, f: F) -> KvResult<T>
    where
        F: FnOnce(&Snapshot) -> KvResult<T>,
    {
        let mut snapshot = self.new_snapshot()?;
        let result = f(&snapshot);
        let _ = snapshot.discard();
        result
    }

    /// Reports the engine's conflict-detection granularity.
    #[must_use]
    pub fn conflict_granularity(&self) -> ConflictGranularity {
        self.engine.conflict_granularity()
    }

    /// Marks the database closed. Idempotent.
    ///
    /// Handles already open keep working; new handles fail with
    /// [`KvError::Closed`].
    pub fn close(&self) {
        let mut is_open = self.is_open.write();
        if *is_open {
            *is_open = false;
            tracing::debug!("database closed");
        }
    }

    /// Whether [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        !*self.is_open.read()
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
