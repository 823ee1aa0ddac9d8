use super::compact;
use crate::error::{CodecError, Result};
use num_bigint::{BigInt, BigUint, Sign};

/// Byte sink for SCALE encoding.
#[derive(Debug, Default)]
pub struct ScaleWriter {
    buf: Vec<u8>,
}

impl ScaleWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_u8(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(value as u8);
    }

    pub fn write_compact(&mut self, value: &BigUint) -> Result<()> {
        compact::write_compact(self, value)
    }

    pub fn write_compact_len(&mut self, len: usize) {
        compact::write_compact_u64(self, len as u64);
    }

    /// Compact length prefix followed by the bytes.
    pub fn write_len_prefixed(&mut self, bytes: &[u8]) {
        self.write_compact_len(bytes.len());
        self.write_bytes(bytes);
    }

    /// `width` bytes, little-endian, zero extended.
    pub fn write_uint_le(&mut self, width: usize, value: &BigUint) -> Result<()> {
        if value.bits() > (width * 8) as u64 {
            return Err(CodecError::out_of_range(format!("{} does not fit in {} bytes", value, width)));
        }
        let bytes = value.to_bytes_le();
        let mut out = vec![0u8; width];
        let n = bytes.len().min(width);
        out[..n].copy_from_slice(&bytes[..n]);
        self.write_bytes(&out);
        Ok(())
    }

    /// `width` bytes, little-endian two's complement, sign extended.
    pub fn write_int_le(&mut self, width: usize, value: &BigInt) -> Result<()> {
        let bytes = value.to_signed_bytes_le();
        if bytes.len() > width {
            return Err(CodecError::out_of_range(format!("{} does not fit in {} bytes", value, width)));
        }
        let fill = if value.sign() == Sign::Minus { 0xff } else { 0x00 };
        let mut out = vec![fill; width];
        out[..bytes.len()].copy_from_slice(&bytes);
        self.write_bytes(&out);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Cursor over SCALE encoded bytes.
#[derive(Debug)]
pub struct ScaleReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ScaleReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Next byte as an unsigned value (0..=255).
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let data: &'a [u8] = self.data;
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= data.len())
            .ok_or(CodecError::TruncatedInput {
                needed: self.pos.saturating_add(len),
                available: data.len(),
            })?;
        let bytes = &data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::malformed(format!("invalid bool byte 0x{:02x}", other))),
        }
    }

    pub fn read_compact(&mut self) -> Result<BigUint> {
        compact::read_compact(self)
    }

    pub fn read_compact_len(&mut self) -> Result<usize> {
        compact::read_compact_usize(self)
    }

    /// Compact length prefix followed by that many bytes.
    pub fn read_len_prefixed(&mut self) -> Result<&'a [u8]> {
        let len = self.read_compact_len()?;
        self.read_bytes(len)
    }

    pub fn read_uint_le(&mut self, width: usize) -> Result<BigUint> {
        Ok(BigUint::from_bytes_le(self.read_bytes(width)?))
    }

    pub fn read_int_le(&mut self, width: usize) -> Result<BigInt> {
        Ok(BigInt::from_signed_bytes_le(self.read_bytes(width)?))
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Fail if any input is left over.
    pub fn finish(self) -> Result<()> {
        if self.remaining() != 0 {
            return Err(CodecError::malformed(format!(
                "{} trailing bytes after SCALE value",
                self.remaining()
            )));
        }
        Ok(())
    }
}
