//! Low-level byte reading.
//!
//! [`ByteReader`] wraps the decompressed document bytes with a cursor,
//! bounds-checked takes, big-endian fixed-width primitives (via
//! `byteorder`), LEB128 unsigned varints, and length-prefixed UTF-8
//! strings. [`maybe_gunzip`] transparently unwraps a gzip envelope
//! detected by its magic bytes.

use std::io::Read;

use byteorder::{BigEndian, ByteOrder};
use flate2::read::GzDecoder;

use crate::error::DecodeError;

/// Gzip stream magic.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Decompresses `bytes` when they carry the gzip magic, otherwise returns
/// them unchanged.
pub fn maybe_gunzip(bytes: Vec<u8>) -> Result<Vec<u8>, DecodeError> {
    if bytes.len() >= 2 && bytes[..2] == GZIP_MAGIC {
        let mut decoder = GzDecoder::new(bytes.as_slice());
        let mut out = Vec::new();
        decoder.read_to_end(&mut out)?;
        Ok(out)
    } else {
        Ok(bytes)
    }
}

/// A cursor over the document bytes with bounds-checked primitive reads.
#[derive(Debug)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ByteReader { data, pos: 0 }
    }

    /// Current byte offset into the document.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Moves the cursor to an absolute offset. Used to rewind to a record
    /// boundary captured earlier; offsets are stable for the open document.
    pub fn seek(&mut self, offset: usize) {
        debug_assert!(offset <= self.data.len());
        self.pos = offset;
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Takes `n` bytes, failing with `TruncatedStream` past the end.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::TruncatedStream { offset: self.pos });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn skip(&mut self, n: usize) -> Result<(), DecodeError> {
        self.take(n).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(BigEndian::read_u32(self.take(4)?))
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(BigEndian::read_i32(self.take(4)?))
    }

    pub fn read_i64(&mut self) -> Result<i64, DecodeError> {
        Ok(BigEndian::read_i64(self.take(8)?))
    }

    pub fn read_f64(&mut self) -> Result<f64, DecodeError> {
        Ok(BigEndian::read_f64(self.take(8)?))
    }

    /// Reads an unsigned LEB128 varint (at most 10 bytes).
    pub fn read_varint(&mut self) -> Result<u64, DecodeError> {
        let start = self.pos;
        let mut value: u64 = 0;
        let mut shift = 0u32;
        loop {
            let byte = self
                .read_u8()
                .map_err(|_| DecodeError::TruncatedStream { offset: start })?;
            if shift == 63 && byte > 1 {
                return Err(DecodeError::InvalidVarint { offset: start });
            }
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
            if shift > 63 {
                return Err(DecodeError::InvalidVarint { offset: start });
            }
        }
    }

    /// Reads a varint-length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> Result<String, DecodeError> {
        let len = self.read_varint()? as usize;
        let start = self.pos;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| DecodeError::InvalidString { offset: start })
    }
}
