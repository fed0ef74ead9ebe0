//! Shared state machine for transaction and snapshot handles.

use crate::error::{KvError, KvResult};
use crate::iter::RangeIter;
use crate::value::ValueReader;
use lattice_engine::EngineTransaction;
use std::io::Read;

/// Rejects the empty key, which is reserved as the "no bound" sentinel.
fn check_key(key: &[u8]) -> KvResult<()> {
    if key.is_empty() {
        return Err(KvError::invalid_argument("empty key"));
    }
    Ok(())
}

/// The active-or-done core embedded by [`Transaction`] and [`Snapshot`].
///
/// `None` is the done sentinel: once the engine transaction has been taken
/// for commit or rollback, every further operation observes [`KvError::Done`].
///
/// [`Transaction`]: crate::Transaction
/// [`Snapshot`]: crate::Snapshot
pub(crate) struct Handle {
    txn: Option<Box<dyn EngineTransaction>>,
}

impl Handle {
    pub(crate) fn new(txn: Box<dyn EngineTransaction>) -> Self {
        Self { txn: Some(txn) }
    }

    fn active(&self) -> KvResult<&dyn EngineTransaction> {
        self.txn.as_deref().ok_or(KvError::Done)
    }

    fn active_mut(&mut self) -> KvResult<&mut dyn EngineTransaction> {
        match self.txn.as_deref_mut() {
            Some(txn) => Ok(txn),
            None => Err(KvError::Done),
        }
    }

    pub(crate) fn get(&self, key: &[u8]) -> KvResult<ValueReader> {
        check_key(key)?;
        let value = self.active()?.get(key)?;
        Ok(ValueReader::new(value))
    }

    pub(crate) fn set(&mut self, key: &[u8], mut value: impl Read) -> KvResult<()> {
        check_key(key)?;
        let txn = self.active_mut()?;
        let mut data = Vec::new();
        value.read_to_end(&mut data)?;
        txn.set(key, &data)?;
        Ok(())
    }

    pub(crate) fn delete(&mut self, key: &[u8]) -> KvResult<()> {
        check_key(key)?;
        // An engine that reports the key absent surfaces NotFound here.
        self.active_mut()?.delete(key)?;
        Ok(())
    }

    pub(crate) fn scan(&self) -> KvResult<RangeIter<'_>> {
        RangeIter::scan(self.active()?)
    }

    pub(crate) fn ascend(&self, begin: &[u8], end: &[u8]) -> KvResult<RangeIter<'_>> {
        RangeIter::ascend(self.active()?, begin, end)
    }

    pub(crate) fn descend(&self, begin: &[u8], end: &[u8]) -> KvResult<RangeIter<'_>> {
        RangeIter::descend(self.active()?, begin, end)
    }

    /// Takes the engine transaction and commits it; the handle is done
    /// afterwards whether or not the commit succeeded.
    pub(crate) fn commit(&mut self) -> KvResult<()> {
        let txn = self.txn.take().ok_or(KvError::Done)?;
        txn.commit().map_err(KvError::from)
    }

    /// Takes the engine transaction and discards it.
    pub(crate) fn discard(&mut self) -> KvResult<()> {
        let txn = self.txn.take().ok_or(KvError::Done)?;
        txn.rollback();
        Ok(())
    }

    pub(crate) fn is_done(&self) -> bool {
        self.txn.is_none()
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        // Backstop for handles abandoned without a terminal call.
        if let Some(txn) = self.txn.take() {
            txn.rollback();
        }
    }
}

impl std::fmt::Debug for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle")
            .field("done", &self.is_done())
            .finish()
    }
}
