//! In-memory MVCC storage engine.

use crate::engine::{
    ConflictGranularity, Direction, EngineCursor, EngineTransaction, StorageEngine,
    TransactionMode,
};
use crate::error::{EngineError, EngineResult};
use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// One committed version of a key. `None` is a tombstone.
#[derive(Debug, Clone)]
struct Version {
    seq: u64,
    value: Option<Bytes>,
}

/// State shared by the engine and all of its transactions.
#[derive(Debug, Default)]
struct Shared {
    /// Committed versions per key, oldest first.
    versions: RwLock<BTreeMap<Bytes, Vec<Version>>>,
    /// Serializes the validate-then-publish step of commit.
    commit_lock: Mutex<()>,
    /// Next sequence number to assign to a commit.
    next_seq: AtomicU64,
    /// Highest published sequence number; new transactions read up to here.
    committed_seq: AtomicU64,
}

impl Shared {
    fn new() -> Self {
        Self {
            next_seq: AtomicU64::new(1),
            ..Self::default()
        }
    }
}

/// Returns the value visible at `snapshot_seq`, if any.
fn visible_at(versions: &[Version], snapshot_seq: u64) -> Option<Bytes> {
    versions
        .iter()
        .rev()
        .find(|v| v.seq <= snapshot_seq)
        .and_then(|v| v.value.clone())
}

/// An in-memory multi-version storage engine.
///
/// Each committed write creates a new version stamped with a monotonically
/// increasing sequence number; a transaction reads the latest version at or
/// below the sequence it observed when it was opened. Commits are validated
/// under a lock: a write to a key that gained a newer version since the
/// transaction started fails with [`EngineError::Conflict`] (first
/// committer wins, key granularity).
///
/// Suitable for:
/// - Unit and integration tests
/// - Ephemeral databases that don't need persistence
///
/// # Example
///
/// ```rust
/// use lattice_engine::{InMemoryEngine, StorageEngine, TransactionMode};
///
/// let engine = InMemoryEngine::new();
/// let mut txn = engine.begin(TransactionMode::ReadWrite).unwrap();
/// txn.set(b"greeting", b"hello").unwrap();
/// txn.commit().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryEngine {
    shared: Arc<Shared>,
}

impl Default for InMemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEngine {
    /// Creates a new empty in-memory engine.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared::new()),
        }
    }

    /// Returns the number of keys with a live (non-tombstone) latest
    /// committed version.
    ///
    /// Useful for tests and debugging.
    #[must_use]
    pub fn live_key_count(&self) -> usize {
        let committed = self.shared.committed_seq.load(Ordering::SeqCst);
        self.shared
            .versions
            .read()
            .values()
            .filter(|vers| visible_at(vers.as_slice(), committed).is_some())
            .count()
    }
}

impl StorageEngine for InMemoryEngine {
    fn begin(&self, mode: TransactionMode) -> EngineResult<Box<dyn EngineTransaction>> {
        Ok(Box::new(MemoryTransaction {
            shared: Arc::clone(&self.shared),
            start_seq: self.shared.committed_seq.load(Ordering::SeqCst),
            mode,
            writes: BTreeMap::new(),
        }))
    }

    fn conflict_granularity(&self) -> ConflictGranularity {
        ConflictGranularity::Key
    }
}

/// A transaction over [`InMemoryEngine`].
struct MemoryTransaction {
    shared: Arc<Shared>,
    /// Sequence this transaction reads up to.
    start_seq: u64,
    mode: TransactionMode,
    /// Buffered writes; `None` is a tombstone.
    writes: BTreeMap<Bytes, Option<Bytes>>,
}

impl MemoryTransaction {
    fn ensure_writable(&self) -> EngineResult<()> {
        match self.mode {
            TransactionMode::ReadWrite => Ok(()),
            TransactionMode::ReadOnly => Err(EngineError::ReadOnly),
        }
    }
}

impl EngineTransaction for MemoryTransaction {
    fn get(&self, key: &[u8]) -> EngineResult<Bytes> {
        if let Some(buffered) = self.writes.get(key) {
            return buffered.clone().ok_or(EngineError::NotFound);
        }
        let map = self.shared.versions.read();
        map.get(key)
            .and_then(|vers| visible_at(vers, self.start_seq))
            .ok_or(EngineError::NotFound)
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> EngineResult<()> {
        self.ensure_writable()?;
        self.writes
            .insert(Bytes::copy_from_slice(key), Some(Bytes::copy_from_slice(value)));
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> EngineResult<()> {
        self.ensure_writable()?;
        // Blind tombstone: absence of the key is not checked here.
        self.writes.insert(Bytes::copy_from_slice(key), None);
        Ok(())
    }

    fn cursor(&self, direction: Direction) -> EngineResult<Box<dyn EngineCursor + '_>> {
        let map = self.shared.versions.read();
        let mut entries: Vec<(Bytes, Bytes)> = map
            .iter()
            .filter(|(key, _)| !self.writes.contains_key(*key))
            .filter_map(|(key, vers)| {
                visible_at(vers, self.start_seq).map(|value| (key.clone(), value))
            })
            .collect();
        for (key, buffered) in &self.writes {
            if let Some(value) = buffered {
                entries.push((key.clone(), value.clone()));
            }
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(Box::new(MemoryCursor {
            entries,
            direction,
            idx: None,
        }))
    }

    fn commit(self: Box<Self>) -> EngineResult<()> {
        let this = *self;
        if this.mode == TransactionMode::ReadOnly || this.writes.is_empty() {
            return Ok(());
        }
        let _guard = this.shared.commit_lock.lock();
        let mut map = this.shared.versions.write();

        // First committer wins: any key versioned past our snapshot was
        // written by a transaction that committed after we started.
        for key in this.writes.keys() {
            if let Some(last) = map.get(key).and_then(|vers| vers.last()) {
                if last.seq > this.start_seq {
                    return Err(EngineError::Conflict { key: key.to_vec() });
                }
            }
        }

        let seq = this.shared.next_seq.fetch_add(1, Ordering::SeqCst);
        for (key, value) in this.writes {
            map.entry(key).or_default().push(Version { seq, value });
        }
        this.shared.committed_seq.store(seq, Ordering::SeqCst);
        Ok(())
    }

    fn rollback(self: Box<Self>) {
        // Buffered writes die with the transaction.
    }
}

/// Cursor over a materialized visible view, sorted ascending.
struct MemoryCursor {
    entries: Vec<(Bytes, Bytes)>,
    direction: Direction,
    /// Position into `entries`; `None` when exhausted or unpositioned.
    idx: Option<usize>,
}

impl EngineCursor for MemoryCursor {
    fn rewind(&mut self) {
        self.idx = match self.direction {
            Direction::Forward if !self.entries.is_empty() => Some(0),
            Direction::Reverse if !self.entries.is_empty() => Some(self.entries.len() - 1),
            _ => None,
        };
    }

    fn seek(&mut self, key: &[u8]) {
        match self.direction {
            Direction::Forward => {
                // First entry >= key.
                let i = self.entries.partition_point(|(k, _)| k.as_ref() < key);
                self.idx = (i < self.entries.len()).then_some(i);
            }
            Direction::Reverse => {
                // First entry <= key, scanning down.
                let i = self.entries.partition_point(|(k, _)| k.as_ref() <= key);
                self.idx = i.checked_sub(1);
            }
        }
    }

    fn valid(&self) -> bool {
        self.idx.is_some()
    }

    fn key(&self) -> Option<&[u8]> {
        self.idx.map(|i| self.entries[i].0.as_ref())
    }

    fn value(&self) -> EngineResult<Bytes> {
        self.idx
            .map(|i| self.entries[i].1.clone())
            .ok_or(EngineError::NotFound)
    }

    fn advance(&mut self) {
        self.idx = self.idx.and_then(|i| match self.direction {
            Direction::Forward => (i + 1 < self.entries.len()).then_some(i + 1),
            Direction::Reverse => i.checked_sub(1),
        });
    }
}
