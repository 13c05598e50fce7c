//! Sequential bit cursor and bit writer.
//!
//! Every codec in this crate walks a [`Schema`](crate::schema::Schema) with a
//! [`BitReader`] on decode and a [`BitWriter`] on encode. Values are read and
//! written MSB-first, so multi-byte fields come out big-endian and sub-byte
//! fields (4-bit option counts, the 1-bit discardable flag) pack in wire order.

use crate::error::{Result, SomeIpError};
use crate::schema::Field;

/// Widest value a single read or write can carry.
pub const MAX_READ_BITS: usize = 128;

/// A forward-only reader over the bits of a byte slice.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    index: usize,
}

impl<'a> BitReader<'a> {
    /// Create a reader positioned at the first bit of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, index: 0 }
    }

    /// Total length of the bit sequence.
    pub fn len(&self) -> usize {
        self.data.len() * 8
    }

    /// Check if the underlying sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current bit index.
    pub fn position(&self) -> usize {
        self.index
    }

    /// Number of bits left to read.
    pub fn remaining(&self) -> usize {
        self.len() - self.index
    }

    /// Number of whole bytes left to read.
    pub fn remaining_bytes(&self) -> usize {
        self.remaining() / 8
    }

    /// Move the cursor to `index`, which must lie in `[0, len]`.
    pub fn set_position(&mut self, index: usize) -> Result<()> {
        if index > self.len() {
            return Err(SomeIpError::BitRange {
                requested: 0,
                index,
                len: self.len(),
            });
        }
        self.index = index;
        Ok(())
    }

    /// Read the next `n` bits as an unsigned integer.
    pub fn read(&mut self, n: usize) -> Result<u128> {
        if n > MAX_READ_BITS || n > self.remaining() {
            return Err(self.range_error(n));
        }

        let mut value: u128 = 0;
        let mut left = n;
        while left > 0 {
            let byte = self.data[self.index / 8];
            let offset = self.index % 8;
            let avail = 8 - offset;
            let take = avail.min(left);
            let chunk = (byte >> (avail - take)) & low_mask(take);
            value = (value << take) | u128::from(chunk);
            self.index += take;
            left -= take;
        }

        Ok(value)
    }

    /// Read the next `n` whole bytes. The cursor must be byte-aligned.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let bits = n.saturating_mul(8);
        if self.index % 8 != 0 || bits > self.remaining() {
            return Err(self.range_error(bits));
        }
        let start = self.index / 8;
        self.index += bits;
        Ok(&self.data[start..start + n])
    }

    /// Read everything left. The cursor must be byte-aligned.
    pub fn read_rest(&mut self) -> Result<&'a [u8]> {
        self.read_bytes(self.remaining_bytes())
    }

    /// Read a fixed-width schema field and narrow it to `T`.
    pub fn take<T: TryFrom<u128>>(&mut self, field: &Field) -> Result<T> {
        let value = self.read(field.bits() as usize)?;
        T::try_from(value).map_err(|_| field.range_error(value))
    }

    /// Skip a fixed-width schema field (reserved bits).
    pub fn skip(&mut self, field: &Field) -> Result<()> {
        self.read(field.bits() as usize).map(|_| ())
    }

    fn range_error(&self, requested: usize) -> SomeIpError {
        SomeIpError::BitRange {
            requested,
            index: self.index,
            len: self.len(),
        }
    }
}

/// An append-only bit writer.
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    buf: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty writer with room for `bytes` bytes.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            buf: Vec::with_capacity(bytes),
            bit_len: 0,
        }
    }

    /// Number of bits written so far.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Append the low `n` bits of `value`, MSB first.
    pub fn write(&mut self, value: u128, n: usize) -> Result<()> {
        if n > MAX_READ_BITS {
            return Err(SomeIpError::BitRange {
                requested: n,
                index: self.bit_len,
                len: MAX_READ_BITS,
            });
        }

        let mut left = n;
        while left > 0 {
            let offset = self.bit_len % 8;
            if offset == 0 {
                self.buf.push(0);
            }
            let space = 8 - offset;
            let take = space.min(left);
            let chunk = ((value >> (left - take)) as u8) & low_mask(take);
            if let Some(last) = self.buf.last_mut() {
                *last |= chunk << (space - take);
            }
            self.bit_len += take;
            left -= take;
        }

        Ok(())
    }

    /// Append a schema field, rejecting values wider than the field.
    pub fn put(&mut self, field: &Field, value: impl Into<u128>) -> Result<()> {
        let value = value.into();
        field.check(value)?;
        self.write(value, field.bits() as usize)
    }

    /// Append a reserved field as zero bits.
    pub fn zero(&mut self, field: &Field) -> Result<()> {
        self.write(0, field.bits() as usize)
    }

    /// Append raw bytes. The writer must be byte-aligned.
    pub fn put_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if self.bit_len % 8 != 0 {
            return Err(SomeIpError::BitRange {
                requested: bytes.len() * 8,
                index: self.bit_len,
                len: self.bit_len,
            });
        }
        self.buf.extend_from_slice(bytes);
        self.bit_len += bytes.len() * 8;
        Ok(())
    }

    /// Finish writing. A trailing partial byte is zero-padded.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

fn low_mask(bits: usize) -> u8 {
    if bits >= 8 { 0xFF } else { (1u8 << bits) - 1 }
}
