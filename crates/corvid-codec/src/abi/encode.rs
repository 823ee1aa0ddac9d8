use super::types::{AbiType, WORD_SIZE};
use super::value::AbiValue;
use crate::error::{CodecError, Result};
use num_bigint::{BigInt, BigUint, Sign};

/// One 32-byte ABI word.
pub type Word = [u8; WORD_SIZE];

/// Encode values under their own declared types.
pub fn encode(values: &[AbiValue]) -> Result<Vec<u8>> {
    let types: Vec<AbiType> = values.iter().map(AbiValue::abi_type).collect();
    encode_params(&types, values)
}

/// Encode `values` as the parameter block described by `types`.
///
/// Each value is checked against its descriptor; fixed-point types are
/// rejected because the Solidity ABI cannot carry them.
pub fn encode_params(types: &[AbiType], values: &[AbiValue]) -> Result<Vec<u8>> {
    if types.len() != values.len() {
        return Err(CodecError::ArgumentCountMismatch {
            expected: types.len(),
            actual: values.len(),
        });
    }
    for ty in types {
        ty.ensure_solidity()?;
    }
    let mut out = Vec::new();
    encode_tuple(types.iter().zip(values), &mut out)?;
    Ok(out)
}

/// Head/tail layout: static members inline, dynamic members as an offset
/// (relative to the start of this block) into the tail.
///
/// Offsets are patched in once the head is complete, so the head size is
/// taken from the encoded values rather than computed from the types.
fn encode_tuple<'a, I>(items: I, out: &mut Vec<u8>) -> Result<()>
where
    I: Iterator<Item = (&'a AbiType, &'a AbiValue)>,
{
    let mut head = Vec::new();
    let mut tail = Vec::new();
    let mut offsets = Vec::new();

    for (ty, value) in items {
        if ty.is_dynamic() {
            offsets.push((head.len(), tail.len()));
            head.extend_from_slice(&[0u8; WORD_SIZE]);
            encode_value(ty, value, &mut tail)?;
        } else {
            encode_value(ty, value, &mut head)?;
        }
    }

    let head_size = head.len();
    for (slot, tail_offset) in offsets {
        head[slot..slot + WORD_SIZE].copy_from_slice(&usize_word(head_size + tail_offset));
    }

    out.extend_from_slice(&head);
    out.extend_from_slice(&tail);
    Ok(())
}

fn encode_value(ty: &AbiType, value: &AbiValue, out: &mut Vec<u8>) -> Result<()> {
    match (ty, value) {
        (AbiType::Bool, AbiValue::Bool(b)) => out.extend_from_slice(&usize_word(*b as usize)),
        (AbiType::Uint(bits), AbiValue::Uint(v)) if v.bits() == *bits => {
            out.extend_from_slice(&uint_word(v.value()))
        }
        (AbiType::Int(bits), AbiValue::Int(v)) if v.bits() == *bits => {
            out.extend_from_slice(&int_word(v.value()))
        }
        (AbiType::Address, AbiValue::Address(addr)) => {
            let mut word = [0u8; WORD_SIZE];
            word[12..].copy_from_slice(addr.as_bytes());
            out.extend_from_slice(&word);
        }
        (AbiType::FixedBytes(n), AbiValue::FixedBytes(bytes)) if bytes.len() == *n => {
            let mut word = [0u8; WORD_SIZE];
            word[..*n].copy_from_slice(bytes);
            out.extend_from_slice(&word);
        }
        (AbiType::Bytes, AbiValue::Bytes(bytes)) => encode_dynamic_bytes(bytes, out),
        (AbiType::String, AbiValue::String(s)) => encode_dynamic_bytes(s.as_bytes(), out),
        (AbiType::FixedArray(elem, len), AbiValue::FixedArray(_, items)) if items.len() == *len => {
            encode_tuple(std::iter::repeat(elem.as_ref()).zip(items), out)?
        }
        (AbiType::Array(elem), AbiValue::Array(_, items)) => {
            out.extend_from_slice(&usize_word(items.len()));
            encode_tuple(std::iter::repeat(elem.as_ref()).zip(items), out)?
        }
        (AbiType::Tuple(fields), AbiValue::Tuple(items)) if fields.len() == items.len() => {
            encode_tuple(fields.iter().map(|f| &f.ty).zip(items.iter().map(|(_, v)| v)), out)?
        }
        (AbiType::Fixed { .. }, _) => return Err(CodecError::UnsupportedType(ty.canonical())),
        (ty, value) => {
            return Err(CodecError::TypeMismatch {
                expected: ty.canonical(),
                actual: value.abi_type().canonical(),
            })
        }
    }
    Ok(())
}

fn encode_dynamic_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(&usize_word(bytes.len()));
    out.extend_from_slice(bytes);
    let rem = bytes.len() % WORD_SIZE;
    if rem != 0 {
        out.resize(out.len() + WORD_SIZE - rem, 0);
    }
}

pub(crate) fn usize_word(n: usize) -> Word {
    let mut word = [0u8; WORD_SIZE];
    word[WORD_SIZE - 8..].copy_from_slice(&(n as u64).to_be_bytes());
    word
}

/// Big-endian, left padded with zeros.
pub(crate) fn uint_word(value: &BigUint) -> Word {
    let bytes = value.to_bytes_be();
    let mut word = [0u8; WORD_SIZE];
    word[WORD_SIZE - bytes.len()..].copy_from_slice(&bytes);
    word
}

/// Two's complement, sign extended to 32 bytes.
pub(crate) fn int_word(value: &BigInt) -> Word {
    let fill = if value.sign() == Sign::Minus { 0xff } else { 0x00 };
    let bytes = value.to_signed_bytes_be();
    let mut word = [fill; WORD_SIZE];
    word[WORD_SIZE - bytes.len()..].copy_from_slice(&bytes);
    word
}
