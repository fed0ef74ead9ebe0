//! Value streaming.

use bytes::Bytes;
use std::io::{self, Read};

/// A readable stream over one value.
///
/// Values are surfaced as streams so large payloads need not be held by the
/// caller all at once; the reader itself is cheap (it shares the underlying
/// buffer). For callers that want the whole payload, [`into_bytes`]
/// materializes it without copying.
///
/// [`into_bytes`]: ValueReader::into_bytes
///
/// # Example
///
/// ```rust
/// use std::io::Read;
///
/// let mut reader = lattice_kv::ValueReader::from_static(b"payload");
/// let mut buf = Vec::new();
/// reader.read_to_end(&mut buf).unwrap();
/// assert_eq!(buf, b"payload");
/// ```
#[derive(Debug, Clone)]
pub struct ValueReader {
    inner: io::Cursor<Bytes>,
}

impl ValueReader {
    pub(crate) fn new(data: Bytes) -> Self {
        Self {
            inner: io::Cursor::new(data),
        }
    }

    /// Creates a reader over a static byte string. Intended for tests and
    /// examples.
    #[must_use]
    pub fn from_static(data: &'static [u8]) -> Self {
        Self::new(Bytes::from_static(data))
    }

    /// Total length of the value in bytes, independent of read position.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.get_ref().len()
    }

    /// Whether the value is zero-length.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.get_ref().is_empty()
    }

    /// Consumes the reader and returns the full value.
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.inner.into_inner()
    }
}

impl Read for ValueReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_in_chunks() {
        let mut reader = ValueReader::from_static(b"hello world");
        let mut buf = [0u8; 5];
        assert_eq!(reader.read(&mut buf).unwrap(), 5);
        assert_eq!(&buf, b"hello");
        assert_eq!(reader.len(), 11);
    }

    #[test]
    fn zero_length_value() {
        let mut reader = ValueReader::from_static(b"");
        assert!(reader.is_empty());
        let mut buf = Vec::new();
        assert_eq!(reader.read_to_end(&mut buf).unwrap(), 0);
    }

    #[test]
    fn into_bytes_returns_full_value() {
        let mut reader = ValueReader::from_static(b"abc");
        let mut buf = [0u8; 1];
        reader.read(&mut buf).unwrap();
        // Read position does not truncate the materialized value.
        assert_eq!(reader.into_bytes(), Bytes::from_static(b"abc"));
    }
}
