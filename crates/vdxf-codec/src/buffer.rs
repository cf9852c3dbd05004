//! Byte-buffer codec primitives.
//!
//! An exactly pre-sized append-only writer, a cursor-based reader, and the
//! two integer encodings the wire format uses: the arbitrary-precision
//! base-128 varint (flag and version fields) and the Bitcoin compact size
//! (length prefixes and collection counts).

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use crate::error::CodecError;

/// Append-only writer over a buffer pre-sized to an exact computed length.
///
/// Callers compute `byte_length()` for the value being written and pass it
/// to [`BufferWriter::new`]; a mismatch between the predicted and written
/// lengths is a programming error and panics in [`BufferWriter::finish`].
#[derive(Debug)]
pub struct BufferWriter {
    buf: Vec<u8>,
    expected: usize,
}

impl BufferWriter {
    #[must_use]
    pub fn new(expected: usize) -> Self {
        Self {
            buf: Vec::with_capacity(expected),
            expected,
        }
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
        assert!(
            self.buf.len() <= self.expected,
            "buffer writer exceeded its predicted length of {} bytes",
            self.expected
        );
    }

    pub fn write_slice(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
        assert!(
            self.buf.len() <= self.expected,
            "buffer writer exceeded its predicted length of {} bytes",
            self.expected
        );
    }

    /// Writes an arbitrary-precision non-negative integer as a base-128
    /// varint (7 data bits per byte, 0x80 continuation, +1 bias on every
    /// non-terminal group).
    pub fn write_var_int(&mut self, value: &BigUint) {
        let mask = BigUint::from(0x7f_u32);
        let mut tmp: Vec<u8> = Vec::with_capacity(10);
        let mut n = value.clone();
        loop {
            let low = (&n & &mask).to_u8().expect("masked to 7 bits");
            tmp.push(low | if tmp.is_empty() { 0x00 } else { 0x80 });
            if n <= mask {
                break;
            }
            n = (n >> 7_u32) - 1_u32;
        }
        tmp.reverse();
        self.write_slice(&tmp);
    }

    pub fn write_var_int_u64(&mut self, value: u64) {
        self.write_var_int(&BigUint::from(value));
    }

    /// Writes a Bitcoin compact size (1 byte below 0xfd, otherwise a marker
    /// byte followed by 2/4/8 little-endian bytes).
    pub fn write_compact_size(&mut self, value: u64) {
        match value {
            0..=0xfc => self.write_u8(value as u8),
            0xfd..=0xffff => {
                self.write_u8(0xfd);
                self.write_slice(&(value as u16).to_le_bytes());
            }
            0x1_0000..=0xffff_ffff => {
                self.write_u8(0xfe);
                self.write_slice(&(value as u32).to_le_bytes());
            }
            _ => {
                self.write_u8(0xff);
                self.write_slice(&value.to_le_bytes());
            }
        }
    }

    /// Writes a compact-size length prefix followed by the bytes.
    pub fn write_var_slice(&mut self, bytes: &[u8]) {
        self.write_compact_size(bytes.len() as u64);
        self.write_slice(bytes);
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    /// Consumes the writer, asserting the predicted length was written.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        assert_eq!(
            self.buf.len(),
            self.expected,
            "predicted byte length does not match written length"
        );
        self.buf
    }
}

/// Cursor-based reader over an immutable byte sequence.
#[derive(Debug)]
pub struct BufferReader<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> BufferReader<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_offset(buf, 0)
    }

    #[must_use]
    pub fn with_offset(buf: &'a [u8], offset: usize) -> Self {
        Self { buf, offset }
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.offset)
    }

    pub fn read_slice(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        let available = self.remaining();
        if n > available {
            return Err(CodecError::TruncatedInput {
                needed: n,
                available,
            });
        }
        let out = &self.buf[self.offset..self.offset + n];
        self.offset += n;
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.read_slice(1)?[0])
    }

    /// Reads a base-128 varint into an arbitrary-precision integer.
    pub fn read_var_int(&mut self) -> Result<BigUint, CodecError> {
        let mut n = BigUint::zero();
        loop {
            let byte = self.read_u8()?;
            n = (n << 7_u32) | BigUint::from(byte & 0x7f);
            if byte & 0x80 == 0 {
                return Ok(n);
            }
            n += 1_u32;
        }
    }

    pub fn read_var_int_u64(&mut self) -> Result<u64, CodecError> {
        self.read_var_int()?
            .to_u64()
            .ok_or(CodecError::MalformedVarint("varint exceeds 64 bits"))
    }

    /// Reads a Bitcoin compact size, rejecting non-minimal encodings.
    pub fn read_compact_size(&mut self) -> Result<u64, CodecError> {
        let marker = self.read_u8()?;
        match marker {
            0xfd => {
                let value = u64::from(u16::from_le_bytes(
                    self.read_slice(2)?.try_into().expect("length checked"),
                ));
                if value < 0xfd {
                    return Err(CodecError::MalformedVarint("non-minimal compact size"));
                }
                Ok(value)
            }
            0xfe => {
                let value = u64::from(u32::from_le_bytes(
                    self.read_slice(4)?.try_into().expect("length checked"),
                ));
                if value <= 0xffff {
                    return Err(CodecError::MalformedVarint("non-minimal compact size"));
                }
                Ok(value)
            }
            0xff => {
                let value = u64::from_le_bytes(
                    self.read_slice(8)?.try_into().expect("length checked"),
                );
                if value <= 0xffff_ffff {
                    return Err(CodecError::MalformedVarint("non-minimal compact size"));
                }
                Ok(value)
            }
            value => Ok(u64::from(value)),
        }
    }

    /// Reads a compact-size length prefix followed by that many bytes.
    pub fn read_var_slice(&mut self) -> Result<&'a [u8], CodecError> {
        let len = self.read_compact_size()?;
        let len = usize::try_from(len)
            .map_err(|_| CodecError::MalformedVarint("length exceeds address space"))?;
        self.read_slice(len)
    }
}

/// Exact encoded length of a varint value.
#[must_use]
pub fn var_int_length(value: &BigUint) -> usize {
    let limit = BigUint::from(0x7f_u32);
    let mut len = 1;
    let mut n = value.clone();
    while n > limit {
        n = (n >> 7_u32) - 1_u32;
        len += 1;
    }
    len
}

#[must_use]
pub fn var_int_length_u64(value: u64) -> usize {
    var_int_length(&BigUint::from(value))
}

/// Exact encoded length of a compact size value.
#[must_use]
pub fn compact_size_length(value: u64) -> usize {
    match value {
        0..=0xfc => 1,
        0xfd..=0xffff => 3,
        0x1_0000..=0xffff_ffff => 5,
        _ => 9,
    }
}

/// Exact encoded length of a length-prefixed slice.
#[must_use]
pub fn var_slice_length(bytes: &[u8]) -> usize {
    compact_size_length(bytes.len() as u64) + bytes.len()
}
