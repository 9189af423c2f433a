//! Byte cursors the decoder reads from.
//!
//! The decoder needs exactly three primitives: look at the next byte, take
//! the next byte, and take an exact number of bytes. [`SliceSource`] serves
//! them from memory; [`ReadSource`] pulls them incrementally from any
//! [`BufRead`].

use std::io::{self, BufRead, Read};

use bytes::Bytes;

use super::error::BencodeError;

/// A cursor over bencoded input.
///
/// End of input is reported as `Ok(None)`; errors are reserved for failures
/// of the underlying source.
pub trait ByteSource {
    /// Returns the next byte without consuming it.
    fn peek(&mut self) -> Result<Option<u8>, BencodeError>;

    /// Consumes and returns the next byte.
    fn read_byte(&mut self) -> Result<Option<u8>, BencodeError>;

    /// Consumes exactly `len` bytes, or returns `None` if the input ends first.
    fn read_exact(&mut self, len: usize) -> Result<Option<Bytes>, BencodeError>;

    /// Number of bytes consumed so far.
    fn position(&self) -> usize;
}

/// An in-memory cursor.
///
/// Byte strings read from it are zero-copy slices of the input buffer.
#[derive(Debug, Clone)]
pub struct SliceSource {
    data: Bytes,
    pos: usize,
}

impl SliceSource {
    pub fn new(data: Bytes) -> Self {
        Self { data, pos: 0 }
    }

    /// Creates a cursor over a copy of `data`.
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

impl ByteSource for SliceSource {
    fn peek(&mut self) -> Result<Option<u8>, BencodeError> {
        Ok(self.data.get(self.pos).copied())
    }

    fn read_byte(&mut self) -> Result<Option<u8>, BencodeError> {
        let byte = self.data.get(self.pos).copied();
        if byte.is_some() {
            self.pos += 1;
        }
        Ok(byte)
    }

    fn read_exact(&mut self, len: usize) -> Result<Option<Bytes>, BencodeError> {
        if len > self.remaining() {
            self.pos = self.data.len();
            return Ok(None);
        }
        let bytes = self.data.slice(self.pos..self.pos + len);
        self.pos += len;
        Ok(Some(bytes))
    }

    fn position(&self) -> usize {
        self.pos
    }
}

/// An incremental cursor over a [`BufRead`].
///
/// Only the bytes of the value being decoded are pulled from the reader, so
/// several values can be decoded back to back from one stream.
#[derive(Debug)]
pub struct ReadSource<R> {
    reader: R,
    pos: usize,
}

impl<R: BufRead> ReadSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, pos: 0 }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    fn fill(&mut self) -> Result<Option<u8>, BencodeError> {
        loop {
            match self.reader.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl<R: BufRead> ByteSource for ReadSource<R> {
    fn peek(&mut self) -> Result<Option<u8>, BencodeError> {
        self.fill()
    }

    fn read_byte(&mut self) -> Result<Option<u8>, BencodeError> {
        let byte = self.fill()?;
        if byte.is_some() {
            self.reader.consume(1);
            self.pos += 1;
        }
        Ok(byte)
    }

    fn read_exact(&mut self, len: usize) -> Result<Option<Bytes>, BencodeError> {
        // `len` is untrusted; the buffer only grows with bytes actually read.
        let mut buf = Vec::new();
        let n = (&mut self.reader).take(len as u64).read_to_end(&mut buf)?;
        self.pos += n;
        if n < len {
            return Ok(None);
        }
        Ok(Some(Bytes::from(buf)))
    }

    fn position(&self) -> usize {
        self.pos
    }
}
