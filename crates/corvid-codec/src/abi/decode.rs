use super::types::{AbiType, WORD_SIZE};
use super::value::{fits_signed, AbiValue, IntValue, UintValue};
use crate::error::{CodecError, Result};
use corvid_types::Address;
use num_bigint::{BigInt, BigUint};
use std::cell::Cell;

/// Decode a parameter block laid out by `types`.
///
/// Trailing bytes after the last referenced value are ignored, as node
/// output may be padded.
pub fn decode(types: &[AbiType], data: &[u8]) -> Result<Vec<AbiValue>> {
    for ty in types {
        ty.ensure_solidity()?;
    }
    let decoder = Decoder::new(types, data);
    decoder.decode_tuple(types.iter(), 0)
}

/// Decode a single value of type `ty` encoded as a one-element block.
pub fn decode_single(ty: &AbiType, data: &[u8]) -> Result<AbiValue> {
    let mut values = decode(std::slice::from_ref(ty), data)?;
    values
        .pop()
        .ok_or_else(|| CodecError::malformed("empty decode result"))
}

struct Decoder<'a> {
    data: &'a [u8],
    /// Values left to decode. Offsets may point several elements at the
    /// same bytes, so the value count is bounded by the input size instead.
    budget: Cell<usize>,
}

impl<'a> Decoder<'a> {
    /// Without aliasing every scalar owns a word, and each word sits under
    /// at most `nesting` containers.
    fn new(types: &[AbiType], data: &'a [u8]) -> Self {
        let nesting = types.iter().map(AbiType::nesting).max().unwrap_or(0);
        let budget = (data.len() / WORD_SIZE)
            .saturating_add(types.len())
            .saturating_add(1)
            .saturating_mul(nesting + 1);
        Self {
            data,
            budget: Cell::new(budget),
        }
    }

    fn charge(&self, at: usize) -> Result<()> {
        let left = self.budget.get();
        if left == 0 {
            return Err(CodecError::malformed(format!(
                "more values than the input can hold at {}",
                at
            )));
        }
        self.budget.set(left - 1);
        Ok(())
    }

    /// Decode a head/tail block starting at `base`. Offsets found in the
    /// head are relative to `base`.
    fn decode_tuple<'t, I>(&self, types: I, base: usize) -> Result<Vec<AbiValue>>
    where
        I: Iterator<Item = &'t AbiType>,
    {
        let mut values = Vec::new();
        let mut cursor = base;
        for ty in types {
            if ty.is_dynamic() {
                let offset = self.read_usize(cursor)?;
                let start = base
                    .checked_add(offset)
                    .filter(|start| *start <= self.data.len())
                    .ok_or_else(|| {
                        CodecError::malformed(format!("offset {} at {} is out of range", offset, cursor))
                    })?;
                values.push(self.decode_value(ty, start)?);
                cursor += WORD_SIZE;
            } else {
                values.push(self.decode_value(ty, cursor)?);
                cursor = cursor.checked_add(ty.head_size()?).ok_or(CodecError::TruncatedInput {
                    needed: usize::MAX,
                    available: self.data.len(),
                })?;
            }
        }
        Ok(values)
    }

    fn decode_value(&self, ty: &AbiType, at: usize) -> Result<AbiValue> {
        self.charge(at)?;
        match ty {
            AbiType::Bool => {
                let word = self.read_word(at)?;
                let clean = word[..WORD_SIZE - 1].iter().all(|b| *b == 0);
                match (clean, word[WORD_SIZE - 1]) {
                    (true, 0) => Ok(AbiValue::Bool(false)),
                    (true, 1) => Ok(AbiValue::Bool(true)),
                    _ => Err(CodecError::malformed(format!("invalid bool word at {}", at))),
                }
            }
            AbiType::Uint(bits) => {
                let value = BigUint::from_bytes_be(self.read_word(at)?);
                UintValue::new(*bits, value)
                    .map(AbiValue::Uint)
                    .map_err(|_| CodecError::malformed(format!("uint{} has high bits set at {}", bits, at)))
            }
            AbiType::Int(bits) => {
                let value = BigInt::from_signed_bytes_be(self.read_word(at)?);
                if !fits_signed(&value, *bits) {
                    return Err(CodecError::malformed(format!(
                        "int{} is not sign extended at {}",
                        bits, at
                    )));
                }
                IntValue::new(*bits, value).map(AbiValue::Int)
            }
            AbiType::Address => {
                let word = self.read_word(at)?;
                if word[..12].iter().any(|b| *b != 0) {
                    return Err(CodecError::malformed(format!("dirty address padding at {}", at)));
                }
                Ok(AbiValue::Address(Address::from_slice(&word[12..])?))
            }
            AbiType::FixedBytes(n) => {
                let word = self.read_word(at)?;
                if word[*n..].iter().any(|b| *b != 0) {
                    return Err(CodecError::malformed(format!("dirty bytes{} padding at {}", n, at)));
                }
                Ok(AbiValue::FixedBytes(word[..*n].to_vec()))
            }
            AbiType::Bytes => Ok(AbiValue::Bytes(self.read_dynamic_bytes(at)?.to_vec())),
            AbiType::String => {
                let bytes = self.read_dynamic_bytes(at)?;
                let s = std::str::from_utf8(bytes)
                    .map_err(|e| CodecError::malformed(format!("invalid utf-8 string: {}", e)))?;
                Ok(AbiValue::String(s.to_string()))
            }
            AbiType::FixedArray(elem, len) => {
                let values = self.decode_tuple(std::iter::repeat(elem.as_ref()).take(*len), at)?;
                Ok(AbiValue::FixedArray(elem.as_ref().clone(), values))
            }
            AbiType::Array(elem) => {
                let count = self.read_usize(at)?;
                let start = at + WORD_SIZE;
                // Every element needs at least one head slot; refuse counts
                // the buffer cannot possibly hold before allocating.
                let available = self.data.len().saturating_sub(start);
                let needed = count.saturating_mul(elem.head_size()?);
                if needed > available {
                    return Err(CodecError::TruncatedInput { needed, available });
                }
                let values = self.decode_tuple(std::iter::repeat(elem.as_ref()).take(count), start)?;
                Ok(AbiValue::Array(elem.as_ref().clone(), values))
            }
            AbiType::Tuple(fields) => {
                let values = self.decode_tuple(fields.iter().map(|f| &f.ty), at)?;
                Ok(AbiValue::Tuple(
                    fields.iter().map(|f| f.name.clone()).zip(values).collect(),
                ))
            }
            AbiType::Fixed { .. } => Err(CodecError::UnsupportedType(ty.canonical())),
        }
    }

    fn read_word(&self, at: usize) -> Result<&'a [u8]> {
        self.slice(at, WORD_SIZE)
    }

    fn slice(&self, at: usize, len: usize) -> Result<&'a [u8]> {
        let data: &'a [u8] = self.data;
        at.checked_add(len)
            .and_then(|end| data.get(at..end))
            .ok_or(CodecError::TruncatedInput {
                needed: at.saturating_add(len),
                available: data.len(),
            })
    }

    /// A word used as a length or offset; must fit comfortably in usize.
    fn read_usize(&self, at: usize) -> Result<usize> {
        let word = self.read_word(at)?;
        if word[..WORD_SIZE - 8].iter().any(|b| *b != 0) {
            return Err(CodecError::malformed(format!("length or offset at {} is too large", at)));
        }
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&word[WORD_SIZE - 8..]);
        usize::try_from(u64::from_be_bytes(raw))
            .map_err(|_| CodecError::malformed(format!("length or offset at {} is too large", at)))
    }

    fn read_dynamic_bytes(&self, at: usize) -> Result<&'a [u8]> {
        let len = self.read_usize(at)?;
        self.slice(at + WORD_SIZE, len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::encode::encode;

    fn parse_all(types: &[&str]) -> Vec<AbiType> {
        types.iter().map(|t| AbiType::parse(t).unwrap()).collect()
    }

    #[test]
    fn test_decode_roundtrip_mixed() {
        let values = vec![
            AbiValue::Bytes(b"dave".to_vec()),
            AbiValue::Bool(true),
            AbiValue::array(AbiType::Uint(256), vec![AbiValue::uint256(1u8), AbiValue::uint256(2u8)]).unwrap(),
            AbiValue::int(16, -300).unwrap(),
            AbiValue::string("héllo"),
        ];
        let encoded = encode(&values).unwrap();
        let types = parse_all(&["bytes", "bool", "uint256[]", "int16", "string"]);
        assert_eq!(decode(&types, &encoded).unwrap(), values);
    }

    #[test]
    fn test_decode_nested_tuple() {
        let ty = AbiType::parse("(uint8 a, string[] names, bytes2[2] tags)").unwrap();
        let value = AbiValue::Tuple(vec![
            ("a".into(), AbiValue::uint(8, 7u8).unwrap()),
            (
                "names".into(),
                AbiValue::array(AbiType::String, vec!["x".into(), "yz".into()]).unwrap(),
            ),
            (
                "tags".into(),
                AbiValue::fixed_array(
                    AbiType::FixedBytes(2),
                    vec![
                        AbiValue::fixed_bytes(vec![1, 2]).unwrap(),
                        AbiValue::fixed_bytes(vec![3, 4]).unwrap(),
                    ],
                )
                .unwrap(),
            ),
        ]);
        let encoded = crate::abi::encode::encode_params(std::slice::from_ref(&ty), std::slice::from_ref(&value)).unwrap();
        assert_eq!(decode_single(&ty, &encoded).unwrap(), value);
    }

    #[test]
    fn test_decode_truncated() {
        let encoded = encode(&[AbiValue::string("a long enough string")]).unwrap();
        let err = decode(&[AbiType::String], &encoded[..40]).unwrap_err();
        assert!(matches!(err, CodecError::TruncatedInput { .. }));

        assert!(matches!(
            decode(&[AbiType::Uint(256)], &[0u8; 31]),
            Err(CodecError::TruncatedInput { .. })
        ));
    }

    #[test]
    fn test_decode_offset_out_of_range() {
        let mut data = vec![0u8; 64];
        data[31] = 0xff;
        assert!(matches!(
            decode(&[AbiType::Bytes], &data),
            Err(CodecError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn test_decode_rejects_dirty_high_bits() {
        let mut word = vec![0u8; 32];
        word[0] = 1;
        assert!(matches!(decode(&[AbiType::Uint(8)], &word), Err(CodecError::MalformedEncoding(_))));
        assert!(matches!(decode(&[AbiType::Address], &word), Err(CodecError::MalformedEncoding(_))));
        assert!(matches!(decode(&[AbiType::Bool], &word), Err(CodecError::MalformedEncoding(_))));

        // 0x80 in the low byte without sign extension is not a valid int8
        let mut word = vec![0u8; 32];
        word[31] = 0x80;
        assert!(matches!(decode(&[AbiType::Int(8)], &word), Err(CodecError::MalformedEncoding(_))));
    }

    #[test]
    fn test_decode_huge_array_count() {
        let mut data = vec![0u8; 64];
        data[31] = 0x20;
        data[56..].copy_from_slice(&u64::MAX.to_be_bytes()[..8]);
        data[56] = 0;
        assert!(decode(&[AbiType::parse("uint256[]").unwrap()], &data).is_err());
    }

    fn word(n: usize) -> [u8; 32] {
        crate::abi::encode::usize_word(n)
    }

    #[test]
    fn test_decode_huge_fixed_array_element() {
        let types = parse_all(&["uint256[576460752303423488][]"]);
        let mut data = Vec::new();
        data.extend_from_slice(&word(0x20));
        data.extend_from_slice(&word(1));
        assert!(matches!(decode(&types, &data), Err(CodecError::ValueOutOfRange(_))));

        let types = parse_all(&["uint256[576460752303423488]"]);
        assert!(matches!(decode(&types, &word(1)), Err(CodecError::TruncatedInput { .. })));
    }

    #[test]
    fn test_decode_rejects_aliased_offsets() {
        // 1000 outer elements all pointing at one inner array of 1000 items
        let (outer, inner) = (1000, 1000);
        let mut data = Vec::new();
        data.extend_from_slice(&word(0x20));
        data.extend_from_slice(&word(outer));
        for _ in 0..outer {
            data.extend_from_slice(&word(outer * 32));
        }
        data.extend_from_slice(&word(inner));
        for _ in 0..inner {
            data.extend_from_slice(&word(1));
        }

        let types = parse_all(&["uint8[][]"]);
        assert!(matches!(decode(&types, &data), Err(CodecError::MalformedEncoding(_))));

        // the same layout without aliasing decodes
        let values = vec![AbiValue::array(
            AbiType::parse("uint8[]").unwrap(),
            vec![AbiValue::array(AbiType::Uint(8), vec![AbiValue::uint(8, 1u8).unwrap(); 3]).unwrap(); 2],
        )
        .unwrap()];
        assert_eq!(decode(&types, &encode(&values).unwrap()).unwrap(), values);
    }

    #[test]
    fn test_decode_empty_dynamic_values() {
        let types = parse_all(&["bytes", "string[]"]);
        let values = vec![
            AbiValue::Bytes(Vec::new()),
            AbiValue::array(AbiType::String, vec![]).unwrap(),
        ];
        let encoded = encode(&values).unwrap();
        assert_eq!(encoded.len(), 4 * 32);
        assert_eq!(decode(&types, &encoded).unwrap(), values);
    }
}
