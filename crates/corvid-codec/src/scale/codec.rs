use super::stream::{ScaleReader, ScaleWriter};
use crate::abi::{AbiType, AbiValue, FixedValue, Function, IntValue, UintValue};
use crate::error::{CodecError, Result};
use corvid_crypto::CryptoSuite;
use corvid_types::Address;
use num_bigint::BigInt;

/// SCALE encode values under the given descriptors.
pub fn encode(types: &[AbiType], values: &[AbiValue]) -> Result<Vec<u8>> {
    if types.len() != values.len() {
        return Err(CodecError::ArgumentCountMismatch {
            expected: types.len(),
            actual: values.len(),
        });
    }
    let mut writer = ScaleWriter::new();
    for (ty, value) in types.iter().zip(values) {
        encode_value(ty, value, &mut writer)?;
    }
    Ok(writer.into_bytes())
}

/// SCALE decode a buffer that holds exactly the values described by `types`.
pub fn decode(types: &[AbiType], data: &[u8]) -> Result<Vec<AbiValue>> {
    let mut reader = ScaleReader::new(data);
    let values = types
        .iter()
        .map(|ty| decode_value(ty, &mut reader))
        .collect::<Result<Vec<_>>>()?;
    reader.finish()?;
    Ok(values)
}

fn encode_value(ty: &AbiType, value: &AbiValue, writer: &mut ScaleWriter) -> Result<()> {
    match (ty, value) {
        (AbiType::Bool, AbiValue::Bool(b)) => writer.write_bool(*b),
        (AbiType::Uint(bits), AbiValue::Uint(v)) if v.bits() == *bits => {
            writer.write_uint_le(bits / 8, v.value())?
        }
        (AbiType::Int(bits), AbiValue::Int(v)) if v.bits() == *bits => {
            writer.write_int_le(bits / 8, v.value())?
        }
        (
            AbiType::Fixed {
                bits,
                decimals,
                signed,
            },
            AbiValue::Fixed(v),
        ) if v.bits() == *bits && v.decimals() == *decimals && v.is_signed() == *signed => {
            if *signed {
                writer.write_int_le(bits / 8, v.scaled())?
            } else {
                writer.write_uint_le(bits / 8, v.scaled().magnitude())?
            }
        }
        (AbiType::Address, AbiValue::Address(addr)) => writer.write_bytes(addr.as_bytes()),
        (AbiType::FixedBytes(n), AbiValue::FixedBytes(bytes)) if bytes.len() == *n => writer.write_bytes(bytes),
        (AbiType::Bytes, AbiValue::Bytes(bytes)) => writer.write_len_prefixed(bytes),
        (AbiType::String, AbiValue::String(s)) => writer.write_len_prefixed(s.as_bytes()),
        (AbiType::FixedArray(elem, len), AbiValue::FixedArray(_, items)) if items.len() == *len => {
            for item in items {
                encode_value(elem, item, writer)?;
            }
        }
        (AbiType::Array(elem), AbiValue::Array(_, items)) => {
            writer.write_compact_len(items.len());
            for item in items {
                encode_value(elem, item, writer)?;
            }
        }
        (AbiType::Tuple(fields), AbiValue::Tuple(items)) if fields.len() == items.len() => {
            for (field, (_, item)) in fields.iter().zip(items) {
                encode_value(&field.ty, item, writer)?;
            }
        }
        (ty, value) => {
            return Err(CodecError::TypeMismatch {
                expected: ty.canonical(),
                actual: value.abi_type().canonical(),
            })
        }
    }
    Ok(())
}

/// Longest run of zero-sized elements a dynamic array may declare.
pub const MAX_ZERO_SIZED_ELEMENTS: usize = 1 << 16;

/// Fewest bytes any value of `ty` can occupy.
fn min_encoded_size(ty: &AbiType) -> usize {
    match ty {
        AbiType::Bool => 1,
        AbiType::Uint(bits) | AbiType::Int(bits) | AbiType::Fixed { bits, .. } => bits / 8,
        AbiType::Address => 20,
        AbiType::FixedBytes(n) => *n,
        AbiType::Bytes | AbiType::String | AbiType::Array(_) => 1,
        AbiType::FixedArray(elem, len) => min_encoded_size(elem).saturating_mul(*len),
        AbiType::Tuple(fields) => fields
            .iter()
            .fold(0usize, |acc, f| acc.saturating_add(min_encoded_size(&f.ty))),
    }
}

/// Refuse element counts the remaining input cannot hold before decoding
/// any of them.
fn check_run(elem: &AbiType, count: usize, reader: &ScaleReader) -> Result<()> {
    let needed = match min_encoded_size(elem) {
        // nothing in the input bounds a run of empty values
        0 if count > MAX_ZERO_SIZED_ELEMENTS => {
            return Err(CodecError::malformed(format!(
                "{} zero-sized elements exceed the limit of {}",
                count, MAX_ZERO_SIZED_ELEMENTS
            )))
        }
        size => count.saturating_mul(size),
    };
    if needed > reader.remaining() {
        return Err(CodecError::TruncatedInput {
            needed,
            available: reader.remaining(),
        });
    }
    Ok(())
}

fn decode_value(ty: &AbiType, reader: &mut ScaleReader) -> Result<AbiValue> {
    Ok(match ty {
        AbiType::Bool => AbiValue::Bool(reader.read_bool()?),
        AbiType::Uint(bits) => AbiValue::Uint(UintValue::new(*bits, reader.read_uint_le(bits / 8)?)?),
        AbiType::Int(bits) => AbiValue::Int(IntValue::new(*bits, reader.read_int_le(bits / 8)?)?),
        AbiType::Fixed {
            bits,
            decimals,
            signed,
        } => {
            let scaled: BigInt = if *signed {
                reader.read_int_le(bits / 8)?
            } else {
                reader.read_uint_le(bits / 8)?.into()
            };
            AbiValue::Fixed(FixedValue::from_scaled(*bits, *decimals, *signed, scaled)?)
        }
        AbiType::Address => AbiValue::Address(Address::from_slice(reader.read_bytes(20)?)?),
        AbiType::FixedBytes(n) => AbiValue::FixedBytes(reader.read_bytes(*n)?.to_vec()),
        AbiType::Bytes => AbiValue::Bytes(reader.read_len_prefixed()?.to_vec()),
        AbiType::String => {
            let bytes = reader.read_len_prefixed()?;
            let s = std::str::from_utf8(bytes)
                .map_err(|e| CodecError::malformed(format!("invalid utf-8 string: {}", e)))?;
            AbiValue::String(s.to_string())
        }
        AbiType::FixedArray(elem, len) => {
            check_run(elem, *len, reader)?;
            let items = (0..*len)
                .map(|_| decode_value(elem, reader))
                .collect::<Result<Vec<_>>>()?;
            AbiValue::FixedArray(elem.as_ref().clone(), items)
        }
        AbiType::Array(elem) => {
            let count = reader.read_compact_len()?;
            check_run(elem, count, reader)?;
            let items = (0..count)
                .map(|_| decode_value(elem, reader))
                .collect::<Result<Vec<_>>>()?;
            AbiValue::Array(elem.as_ref().clone(), items)
        }
        AbiType::Tuple(fields) => AbiValue::Tuple(
            fields
                .iter()
                .map(|f| Ok((f.name.clone(), decode_value(&f.ty, reader)?)))
                .collect::<Result<Vec<_>>>()?,
        ),
    })
}

/// Call encoding for the WASM execution engine: the same selector as the
/// Solidity path, followed by SCALE encoded arguments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScaleCodec {
    suite: CryptoSuite,
}

impl ScaleCodec {
    pub fn new(suite: CryptoSuite) -> Self {
        Self { suite }
    }

    pub fn encode_function_call(&self, signature: &str, args: &[AbiValue]) -> Result<Vec<u8>> {
        let function = Function::parse(signature)?;
        self.encode_call(&function, args)
    }

    pub fn encode_call(&self, function: &Function, args: &[AbiValue]) -> Result<Vec<u8>> {
        let mut out = self.suite.hash(function.signature().as_bytes()).selector().to_vec();
        out.extend(encode(&function.input_types(), args)?);
        Ok(out)
    }

    pub fn decode_function_result(&self, function: &Function, data: &[u8]) -> Result<Vec<AbiValue>> {
        decode(&function.output_types(), data)
    }
}
