//! Recursive length prefix encoding.
//!
//! Only canonical encodings are accepted by the decoder: single bytes below
//! `0x80` must not be wrapped, long forms must not be used for short
//! payloads, and lengths must not carry leading zero bytes.

use crate::error::{CodecError, Result};
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

const STRING_OFFSET: u8 = 0x80;
const LIST_OFFSET: u8 = 0xc0;
const SHORT_LIMIT: usize = 55;
/// Lists nested deeper than this are rejected by the decoder.
pub const MAX_DEPTH: usize = 128;

/// A decoded or to-be-encoded RLP item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RlpItem {
    String(Vec<u8>),
    List(Vec<RlpItem>),
}

impl RlpItem {
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        RlpItem::String(bytes.into())
    }

    /// Minimal big-endian bytes; zero is the empty string.
    pub fn uint(value: &BigUint) -> Self {
        if value.is_zero() {
            RlpItem::String(Vec::new())
        } else {
            RlpItem::String(value.to_bytes_be())
        }
    }

    pub fn u64(value: u64) -> Self {
        let bytes = value.to_be_bytes();
        let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
        RlpItem::String(bytes[start..].to_vec())
    }

    pub fn list(items: Vec<RlpItem>) -> Self {
        RlpItem::List(items)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_into(&mut out);
        out
    }

    pub fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            RlpItem::String(bytes) if bytes.len() == 1 && bytes[0] < STRING_OFFSET => out.push(bytes[0]),
            RlpItem::String(bytes) => {
                encode_length(bytes.len(), STRING_OFFSET, out);
                out.extend_from_slice(bytes);
            }
            RlpItem::List(items) => {
                let mut payload = Vec::new();
                for item in items {
                    item.encode_into(&mut payload);
                }
                encode_length(payload.len(), LIST_OFFSET, out);
                out.extend_from_slice(&payload);
            }
        }
    }

    /// Decode exactly one item; trailing bytes are an error.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let (item, consumed) = decode_item(data, 0)?;
        if consumed != data.len() {
            return Err(CodecError::malformed(format!(
                "{} trailing bytes after RLP item",
                data.len() - consumed
            )));
        }
        Ok(item)
    }

    pub fn as_bytes(&self) -> Result<&[u8]> {
        match self {
            RlpItem::String(bytes) => Ok(bytes),
            RlpItem::List(_) => Err(CodecError::malformed("expected RLP string, found list")),
        }
    }

    pub fn as_list(&self) -> Result<&[RlpItem]> {
        match self {
            RlpItem::List(items) => Ok(items),
            RlpItem::String(_) => Err(CodecError::malformed("expected RLP list, found string")),
        }
    }

    /// Interpret a string item as a canonical unsigned integer.
    pub fn as_biguint(&self) -> Result<BigUint> {
        let bytes = self.as_bytes()?;
        if bytes.first() == Some(&0) {
            return Err(CodecError::malformed("RLP integer has leading zero bytes"));
        }
        Ok(BigUint::from_bytes_be(bytes))
    }

    pub fn as_u64(&self) -> Result<u64> {
        self.as_biguint()?
            .to_u64()
            .ok_or_else(|| CodecError::out_of_range("RLP integer does not fit in u64"))
    }
}

impl From<&[u8]> for RlpItem {
    fn from(bytes: &[u8]) -> Self {
        RlpItem::String(bytes.to_vec())
    }
}

impl From<Vec<RlpItem>> for RlpItem {
    fn from(items: Vec<RlpItem>) -> Self {
        RlpItem::List(items)
    }
}

fn encode_length(len: usize, offset: u8, out: &mut Vec<u8>) {
    if len <= SHORT_LIMIT {
        out.push(offset + len as u8);
    } else {
        let be = (len as u64).to_be_bytes();
        let start = be.iter().position(|b| *b != 0).unwrap_or(be.len() - 1);
        let len_bytes = &be[start..];
        out.push(offset + SHORT_LIMIT as u8 + len_bytes.len() as u8);
        out.extend_from_slice(len_bytes);
    }
}

/// Decode one item from the front of `data`, returning it with the number
/// of bytes consumed. `depth` counts the enclosing lists.
fn decode_item(data: &[u8], depth: usize) -> Result<(RlpItem, usize)> {
    let prefix = *data.first().ok_or(CodecError::TruncatedInput {
        needed: 1,
        available: 0,
    })?;

    match prefix {
        0x00..=0x7f => Ok((RlpItem::String(vec![prefix]), 1)),
        0x80..=0xb7 => {
            let len = (prefix - STRING_OFFSET) as usize;
            let payload = take(data, 1, len)?;
            if len == 1 && payload[0] < STRING_OFFSET {
                return Err(CodecError::malformed("single byte below 0x80 must not be prefixed"));
            }
            Ok((RlpItem::String(payload.to_vec()), 1 + len))
        }
        0xb8..=0xbf => {
            let len_of_len = (prefix - 0xb7) as usize;
            let len = read_long_length(data, len_of_len)?;
            let payload = take(data, 1 + len_of_len, len)?;
            Ok((RlpItem::String(payload.to_vec()), 1 + len_of_len + len))
        }
        0xc0..=0xf7 => {
            let len = (prefix - LIST_OFFSET) as usize;
            let payload = take(data, 1, len)?;
            Ok((RlpItem::List(decode_list(payload, depth + 1)?), 1 + len))
        }
        0xf8..=0xff => {
            let len_of_len = (prefix - 0xf7) as usize;
            let len = read_long_length(data, len_of_len)?;
            let payload = take(data, 1 + len_of_len, len)?;
            Ok((RlpItem::List(decode_list(payload, depth + 1)?), 1 + len_of_len + len))
        }
    }
}

fn decode_list(mut payload: &[u8], depth: usize) -> Result<Vec<RlpItem>> {
    if depth > MAX_DEPTH {
        return Err(CodecError::malformed(format!(
            "RLP lists nested deeper than {}",
            MAX_DEPTH
        )));
    }
    let mut items = Vec::new();
    while !payload.is_empty() {
        let (item, consumed) = decode_item(payload, depth)?;
        items.push(item);
        payload = &payload[consumed..];
    }
    Ok(items)
}

fn read_long_length(data: &[u8], len_of_len: usize) -> Result<usize> {
    let bytes = take(data, 1, len_of_len)?;
    if bytes[0] == 0 {
        return Err(CodecError::malformed("RLP length has leading zero bytes"));
    }
    if len_of_len > std::mem::size_of::<usize>() {
        return Err(CodecError::malformed("RLP length does not fit in usize"));
    }
    let len = bytes.iter().fold(0usize, |acc, b| (acc << 8) | *b as usize);
    if len <= SHORT_LIMIT {
        return Err(CodecError::malformed("long RLP form used for a short payload"));
    }
    Ok(len)
}

fn take(data: &[u8], start: usize, len: usize) -> Result<&[u8]> {
    start
        .checked_add(len)
        .and_then(|end| data.get(start..end))
        .ok_or(CodecError::TruncatedInput {
            needed: start.saturating_add(len),
            available: data.len(),
        })
}
