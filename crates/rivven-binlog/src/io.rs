//! Bounded byte reader for binlog streams
//!
//! [`BinlogInputStream`] wraps any blocking [`Read`] and adds the primitives
//! the event framer and body decoders need:
//!
//! - a one-byte, non-consuming [`peek`](BinlogInputStream::peek) used for
//!   end-of-stream detection
//! - little/big-endian fixed-width integers and MySQL packed integers
//! - a single bounded region ("block") that reads may not cross
//!
//! Reads that would cross the active block boundary fail before consuming
//! anything, so the framer can always skip exactly the unread remainder.

use crate::error::{BinlogError, Result};
use crate::event::Bitmap;
use bytes::{Buf, Bytes};
use std::io::{self, ErrorKind, Read};

/// Byte source with peek, bounded regions and binlog field readers.
pub struct BinlogInputStream {
    inner: Box<dyn Read + Send>,
    peeked: Option<u8>,
    position: u64,
    block_remaining: Option<usize>,
}

impl std::fmt::Debug for BinlogInputStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinlogInputStream")
            .field("position", &self.position)
            .field("peeked", &self.peeked)
            .field("block_remaining", &self.block_remaining)
            .finish()
    }
}

impl BinlogInputStream {
    /// Wrap a blocking reader.
    pub fn new<R: Read + Send + 'static>(reader: R) -> Self {
        Self {
            inner: Box::new(reader),
            peeked: None,
            position: 0,
            block_remaining: None,
        }
    }

    /// Read from an in-memory buffer.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self::new(bytes.into().reader())
    }

    /// Number of bytes consumed so far (peeked bytes are not counted).
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Bytes left in the active block, or `None` outside a block.
    pub fn available(&self) -> Option<usize> {
        self.block_remaining
    }

    /// Look at the next byte without consuming it.
    ///
    /// Returns `None` at end of data, or when the active block is exhausted.
    pub fn peek(&mut self) -> Result<Option<u8>> {
        if self.block_remaining == Some(0) {
            return Ok(None);
        }
        if self.peeked.is_none() {
            let mut byte = [0u8; 1];
            loop {
                match self.inner.read(&mut byte) {
                    Ok(0) => return Ok(None),
                    Ok(_) => {
                        self.peeked = Some(byte[0]);
                        break;
                    }
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e.into()),
                }
            }
        }
        Ok(self.peeked)
    }

    // ------------------------------------------------------------------
    // Bounded regions
    // ------------------------------------------------------------------

    /// Limit subsequent reads to the next `length` bytes.
    pub fn enter_block(&mut self, length: usize) -> Result<()> {
        if let Some(remaining) = self.block_remaining {
            return Err(BinlogError::invalid_state(format!(
                "cannot enter a block of {} bytes, {} bytes left in the active block",
                length, remaining
            )));
        }
        self.block_remaining = Some(length);
        Ok(())
    }

    /// Skip whatever is left of the active block and leave it.
    ///
    /// No-op outside a block.
    pub fn skip_to_end_of_block(&mut self) -> Result<()> {
        match self.block_remaining.take() {
            Some(remaining) => self.discard(remaining),
            None => Ok(()),
        }
    }

    /// Run `f` inside a block of `length` bytes.
    ///
    /// Whatever `f` returns, the unread part of the block is skipped and the
    /// block is exited before this returns. The outer result reports a
    /// failure of that cleanup, the inner result is the outcome of `f`.
    pub fn scoped_block<T>(
        &mut self,
        length: usize,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<Result<T>> {
        self.enter_block(length)?;
        let outcome = f(self);
        self.skip_to_end_of_block()?;
        Ok(outcome)
    }

    /// Skip `n` bytes. Inside a block the skip counts against it.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.claim(n)?;
        self.discard(n)
    }

    // ------------------------------------------------------------------
    // Field readers
    // ------------------------------------------------------------------

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16_le(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u24_le(&mut self) -> Result<u32> {
        Ok(self.read_uint_le(3)? as u32)
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// 6-byte little-endian integer (table ids)
    pub fn read_u48_le(&mut self) -> Result<u64> {
        self.read_uint_le(6)
    }

    pub fn read_u64_le(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Little-endian unsigned integer of `n` bytes (1..=8).
    pub fn read_uint_le(&mut self, n: usize) -> Result<u64> {
        let bytes = self.read_int_bytes(n)?;
        Ok(bytes
            .iter()
            .rev()
            .fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
    }

    /// Big-endian unsigned integer of `n` bytes (1..=8).
    pub fn read_uint_be(&mut self, n: usize) -> Result<u64> {
        let bytes = self.read_int_bytes(n)?;
        Ok(bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
    }

    /// MySQL length-encoded ("packed") integer.
    pub fn read_packed_integer(&mut self) -> Result<u64> {
        let first = self.read_u8()?;
        match first {
            0..=250 => Ok(u64::from(first)),
            252 => self.read_uint_le(2),
            253 => self.read_uint_le(3),
            254 => self.read_u64_le(),
            _ => Err(BinlogError::invalid_format(format!(
                "unexpected packed integer prefix 0x{:02x}",
                first
            ))),
        }
    }

    /// Packed integer that must fit a buffer length.
    pub fn read_packed_length(&mut self) -> Result<usize> {
        let value = self.read_packed_integer()?;
        usize::try_from(value)
            .map_err(|_| BinlogError::invalid_format(format!("length {} out of range", value)))
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        self.claim(n)?;
        let mut buf = vec![0u8; n];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    /// `n` bytes decoded as (lossy) UTF-8.
    pub fn read_string(&mut self, n: usize) -> Result<String> {
        let bytes = self.read_bytes(n)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// String prefixed with a packed integer length.
    pub fn read_length_encoded_string(&mut self) -> Result<String> {
        let len = self.read_packed_length()?;
        self.read_string(len)
    }

    /// Bitmap of `bits` bits, least significant bit first.
    pub fn read_bitmap(&mut self, bits: usize) -> Result<Bitmap> {
        let bytes = self.read_bytes(bits.div_ceil(8))?;
        Ok(Bitmap::from_bytes(bytes, bits))
    }

    /// Everything left in the active block.
    pub fn read_remaining(&mut self) -> Result<Vec<u8>> {
        match self.block_remaining {
            Some(remaining) => self.read_bytes(remaining),
            None => Err(BinlogError::invalid_state(
                "read_remaining requires an active block",
            )),
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.claim(N)?;
        let mut buf = [0u8; N];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    fn read_int_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        if n == 0 || n > 8 {
            return Err(BinlogError::invalid_format(format!(
                "integer width {} not in 1..=8",
                n
            )));
        }
        self.read_bytes(n)
    }

    /// Reserve `n` bytes of the active block.
    fn claim(&mut self, n: usize) -> Result<()> {
        if let Some(remaining) = self.block_remaining.as_mut() {
            if n > *remaining {
                return Err(BinlogError::BlockBoundaryExceeded {
                    requested: n,
                    available: *remaining,
                });
            }
            *remaining -= n;
        }
        Ok(())
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        if buf.is_empty() {
            return Ok(());
        }
        let start = match self.peeked.take() {
            Some(byte) => {
                buf[0] = byte;
                1
            }
            None => 0,
        };
        self.inner.read_exact(&mut buf[start..])?;
        self.position += buf.len() as u64;
        Ok(())
    }

    /// Drop `n` bytes without touching the block accounting.
    fn discard(&mut self, n: usize) -> Result<()> {
        if n == 0 {
            return Ok(());
        }
        let mut rest = n as u64;
        if self.peeked.take().is_some() {
            rest -= 1;
            self.position += 1;
        }
        let copied = io::copy(&mut (&mut self.inner).take(rest), &mut io::sink())?;
        self.position += copied;
        if copied < rest {
            return Err(io::Error::new(
                ErrorKind::UnexpectedEof,
                format!(
                    "expected to skip {} bytes, stream ended after {}",
                    n,
                    n as u64 - rest + copied
                ),
            )
            .into());
        }
        Ok(())
    }
}
