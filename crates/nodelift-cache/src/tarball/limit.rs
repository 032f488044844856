//! Byte-count limit for streamed archive data

use std::cell::Cell;
use std::io::{self, Read};
use std::rc::Rc;

/// Reader that fails once more than `limit` bytes have passed through it
///
/// The consumed count stays observable through [`SizeLimitedReader::counter`]
/// after the reader has been moved into a decoder.
pub struct SizeLimitedReader<R> {
    inner: R,
    limit: u64,
    consumed: Rc<Cell<u64>>,
}

/// Shared view of the bytes consumed by a [`SizeLimitedReader`]
#[derive(Debug, Clone)]
pub struct ByteCounter {
    consumed: Rc<Cell<u64>>,
    limit: u64,
}

impl<R: Read> SizeLimitedReader<R> {
    pub fn new(inner: R, limit: u64) -> Self {
        Self {
            inner,
            limit,
            consumed: Rc::new(Cell::new(0)),
        }
    }

    pub fn counter(&self) -> ByteCounter {
        ByteCounter {
            consumed: Rc::clone(&self.consumed),
            limit: self.limit,
        }
    }
}

impl ByteCounter {
    pub fn consumed(&self) -> u64 {
        self.consumed.get()
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn exceeded(&self) -> bool {
        self.consumed.get() > self.limit
    }
}

impl<R: Read> Read for SizeLimitedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        let total = self.consumed.get() + n as u64;
        self.consumed.set(total);

        if total > self.limit {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("stream exceeds {} bytes", self.limit),
            ));
        }

        Ok(n)
    }
}
