//! Range iteration over a handle's visible key space.
//!
//! Iteration is lazy and pull-based: each `next()` advances an engine
//! cursor and yields one key-value pair. Engine failures encountered
//! mid-stream end the sequence without yielding a partial pair and are
//! parked in an out-of-band slot that [`RangeIter::finish`] surfaces, so
//! the consumer loop stays uniform across success and failure.

use crate::error::{KvError, KvResult};
use crate::value::ValueReader;
use bytes::Bytes;
use lattice_engine::{Direction, EngineCursor, EngineTransaction};

/// Rejects inverted bounds before any cursor is opened.
fn check_bounds(begin: &[u8], end: &[u8]) -> KvResult<()> {
    if !begin.is_empty() && !end.is_empty() && begin > end {
        return Err(KvError::invalid_argument("range begin exceeds end"));
    }
    Ok(())
}

/// A lazy, single-pass sequence of key-value pairs.
///
/// Produced by `scan`/`ascend`/`descend` on a [`Transaction`] or
/// [`Snapshot`]. The iterator borrows its handle shared, so the handle
/// cannot be mutated or finished while the iteration is alive.
///
/// The underlying engine cursor is released exactly once: eagerly when the
/// sequence ends (exhaustion, bound reached, or mid-stream failure), or on
/// drop when the consumer stops pulling early.
///
/// [`Transaction`]: crate::Transaction
/// [`Snapshot`]: crate::Snapshot
///
/// # Errors
///
/// A failure while materializing a value terminates the sequence early;
/// call [`finish`](Self::finish) after the loop to observe it.
pub struct RangeIter<'a> {
    cursor: Option<Box<dyn EngineCursor + 'a>>,
    begin: Bytes,
    end: Bytes,
    direction: Direction,
    err: Option<KvError>,
}

impl<'a> RangeIter<'a> {
    /// All pairs in engine-native order, unbounded.
    pub(crate) fn scan(txn: &'a dyn EngineTransaction) -> KvResult<Self> {
        let mut cursor = txn.cursor(Direction::Forward)?;
        cursor.rewind();
        Ok(Self {
            cursor: Some(cursor),
            begin: Bytes::new(),
            end: Bytes::new(),
            direction: Direction::Forward,
            err: None,
        })
    }

    /// Pairs in `[begin, end)`, ascending. Empty bounds are open ends.
    pub(crate) fn ascend(
        txn: &'a dyn EngineTransaction,
        begin: &[u8],
        end: &[u8],
    ) -> KvResult<Self> {
        check_bounds(begin, end)?;
        let mut cursor = txn.cursor(Direction::Forward)?;
        if begin.is_empty() {
            cursor.rewind();
        } else {
            cursor.seek(begin);
        }
        Ok(Self {
            cursor: Some(cursor),
            begin: Bytes::copy_from_slice(begin),
            end: Bytes::copy_from_slice(end),
            direction: Direction::Forward,
            err: None,
        })
    }

    /// Pairs in `[begin, end)`, descending. Empty bounds are open ends.
    pub(crate) fn descend(
        txn: &'a dyn EngineTransaction,
        begin: &[u8],
        end: &[u8],
    ) -> KvResult<Self> {
        check_bounds(begin, end)?;
        let mut cursor = txn.cursor(Direction::Reverse)?;
        if end.is_empty() {
            cursor.rewind();
        } else {
            // Reverse seek lands at or before `end`; the interval excludes
            // `end` itself, which next() skips over.
            cursor.seek(end);
        }
        Ok(Self {
            cursor: Some(cursor),
            begin: Bytes::copy_from_slice(begin),
            end: Bytes::copy_from_slice(end),
            direction: Direction::Reverse,
            err: None,
        })
    }

    /// Consumes the iterator and reports any failure that ended the
    /// sequence early.
    ///
    /// # Errors
    ///
    /// Returns the engine error that interrupted iteration, if any.
    pub fn finish(mut self) -> KvResult<()> {
        match self.err.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Iterator for RangeIter<'_> {
    type Item = (Bytes, ValueReader);

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor.as_mut()?;
        loop {
            let Some(k) = cursor.key() else { break };
            let key = Bytes::copy_from_slice(k);

            // Range includes begin and excludes end.
            match self.direction {
                Direction::Forward => {
                    if !self.end.is_empty() && key >= self.end {
                        break;
                    }
                }
                Direction::Reverse => {
                    if !self.end.is_empty() && key == self.end {
                        cursor.advance();
                        continue;
                    }
                    if !self.begin.is_empty() && key < self.begin {
                        break;
                    }
                }
            }

            match cursor.value() {
                Ok(value) => {
                    cursor.advance();
                    return Some((key, ValueReader::new(value)));
                }
                Err(err) => {
                    self.err = Some(err.into());
                    break;
                }
            }
        }
        // Exhausted, bound reached, or failed: release the cursor now.
        self.cursor = None;
        None
    }
}

impl std::iter::FusedIterator for RangeIter<'_> {}

impl std::fmt::Debug for RangeIter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RangeIter")
            .field("direction", &self.direction)
            .field("live", &self.cursor.is_some())
            .field("failed", &self.err.is_some())
            .finish()
    }
}
