use super::stream::{ScaleReader, ScaleWriter};
use crate::error::{CodecError, Result};
use num_bigint::{BigInt, BigUint};
use num_traits::ToPrimitive;

/// Largest payload of the big-integer mode: 4 + 63 bytes.
pub const MAX_BIG_INTEGER_BYTES: usize = 67;
const MIN_BIG_INTEGER_BYTES: usize = 4;

/// Compact encoding mode, stored in the two low bits of the first byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompactMode {
    /// `0b00`: values below 2^6 in one byte
    SingleByte,
    /// `0b01`: values below 2^14 in two bytes
    TwoByte,
    /// `0b10`: values below 2^30 in four bytes
    FourByte,
    /// `0b11`: length header followed by 4..=67 little-endian bytes
    BigInteger,
}

impl CompactMode {
    /// Smallest mode able to hold `value`.
    pub fn for_value(value: &BigUint) -> Self {
        match value.to_u64() {
            Some(v) if v < 1 << 6 => CompactMode::SingleByte,
            Some(v) if v < 1 << 14 => CompactMode::TwoByte,
            Some(v) if v < 1 << 30 => CompactMode::FourByte,
            _ => CompactMode::BigInteger,
        }
    }

    pub fn from_prefix(byte: u8) -> Self {
        match byte & 0b11 {
            0b00 => CompactMode::SingleByte,
            0b01 => CompactMode::TwoByte,
            0b10 => CompactMode::FourByte,
            _ => CompactMode::BigInteger,
        }
    }
}

/// Append the compact encoding of `value`.
pub fn write_compact(writer: &mut ScaleWriter, value: &BigUint) -> Result<()> {
    if let Some(v) = value.to_u64() {
        write_compact_u64(writer, v);
        return Ok(());
    }
    let bytes = value.to_bytes_le();
    if bytes.len() > MAX_BIG_INTEGER_BYTES {
        return Err(CodecError::out_of_range(format!(
            "compact integer needs {} bytes, at most {} allowed",
            bytes.len(),
            MAX_BIG_INTEGER_BYTES
        )));
    }
    writer.write_u8((((bytes.len() - MIN_BIG_INTEGER_BYTES) as u8) << 2) | 0b11);
    writer.write_bytes(&bytes);
    Ok(())
}

pub fn write_compact_u64(writer: &mut ScaleWriter, value: u64) {
    match value {
        v if v < 1 << 6 => writer.write_u8((v as u8) << 2),
        v if v < 1 << 14 => writer.write_bytes(&(((v as u16) << 2) | 0b01).to_le_bytes()),
        v if v < 1 << 30 => writer.write_bytes(&(((v as u32) << 2) | 0b10).to_le_bytes()),
        v => {
            let len = 8 - v.leading_zeros() as usize / 8;
            writer.write_u8((((len - MIN_BIG_INTEGER_BYTES) as u8) << 2) | 0b11);
            writer.write_bytes(&v.to_le_bytes()[..len]);
        }
    }
}

/// Compact encoding of `value` as a fresh buffer.
pub fn encode_compact(value: &BigUint) -> Result<Vec<u8>> {
    let mut writer = ScaleWriter::new();
    write_compact(&mut writer, value)?;
    Ok(writer.into_bytes())
}

/// Compact encoding of a signed value. Negative values have no compact
/// form and are rejected.
pub fn encode_compact_int(value: &BigInt) -> Result<Vec<u8>> {
    let unsigned = value
        .to_biguint()
        .ok_or_else(|| CodecError::out_of_range(format!("compact integer {} is negative", value)))?;
    encode_compact(&unsigned)
}

/// Read one compact integer. Encodings that a smaller mode could have
/// carried are rejected.
pub fn read_compact(reader: &mut ScaleReader) -> Result<BigUint> {
    let prefix = reader.read_u8()?;
    let mode = CompactMode::from_prefix(prefix);
    let value = match mode {
        CompactMode::SingleByte => BigUint::from(prefix >> 2),
        CompactMode::TwoByte => {
            let raw = u16::from_le_bytes([prefix, reader.read_u8()?]);
            BigUint::from(raw >> 2)
        }
        CompactMode::FourByte => {
            let mut raw = [prefix, 0, 0, 0];
            raw[1..].copy_from_slice(reader.read_bytes(3)?);
            BigUint::from(u32::from_le_bytes(raw) >> 2)
        }
        CompactMode::BigInteger => {
            let len = (prefix >> 2) as usize + MIN_BIG_INTEGER_BYTES;
            let bytes = reader.read_bytes(len)?;
            if bytes.last() == Some(&0) {
                return Err(CodecError::malformed("compact integer has trailing zero bytes"));
            }
            BigUint::from_bytes_le(bytes)
        }
    };
    if CompactMode::for_value(&value) != mode {
        return Err(CodecError::malformed(format!(
            "compact value {} is not minimally encoded",
            value
        )));
    }
    Ok(value)
}

/// Read a compact length or count.
pub fn read_compact_usize(reader: &mut ScaleReader) -> Result<usize> {
    let value = read_compact(reader)?;
    value
        .to_usize()
        .ok_or_else(|| CodecError::out_of_range(format!("length {} does not fit in usize", value)))
}

/// Decode a buffer that holds exactly one compact integer.
pub fn decode_compact(data: &[u8]) -> Result<BigUint> {
    let mut reader = ScaleReader::new(data);
    let value = read_compact(&mut reader)?;
    reader.finish()?;
    Ok(value)
}
