//! Conversion between `serde_json::Value` and typed [`AbiValue`]s.
//!
//! Integers are accepted as JSON numbers or as decimal / `0x` hex strings
//! and are always emitted as decimal strings so no precision is lost.

use super::types::AbiType;
use super::value::{AbiValue, FixedValue, IntValue, UintValue};
use crate::error::{CodecError, Result};
use corvid_types::{error::decode_hex, Address};
use num_bigint::{BigInt, BigUint};
use serde_json::{Map, Value};
use std::str::FromStr;

/// Build a value of type `ty` from JSON.
pub fn value_from_json(ty: &AbiType, json: &Value) -> Result<AbiValue> {
    let mismatch = || CodecError::TypeMismatch {
        expected: ty.canonical(),
        actual: json_kind(json).to_string(),
    };

    match ty {
        AbiType::Bool => match json {
            Value::Bool(b) => Ok(AbiValue::Bool(*b)),
            Value::String(s) if s == "true" => Ok(AbiValue::Bool(true)),
            Value::String(s) if s == "false" => Ok(AbiValue::Bool(false)),
            _ => Err(mismatch()),
        },
        AbiType::Uint(bits) => {
            let value = parse_biguint(json).ok_or_else(mismatch)?;
            UintValue::new(*bits, value).map(AbiValue::Uint)
        }
        AbiType::Int(bits) => {
            let value = parse_bigint(json).ok_or_else(mismatch)?;
            IntValue::new(*bits, value).map(AbiValue::Int)
        }
        AbiType::Fixed {
            bits,
            decimals,
            signed,
        } => {
            let text = match json {
                Value::Number(n) => n.to_string(),
                Value::String(s) => s.clone(),
                _ => return Err(mismatch()),
            };
            FixedValue::parse(*bits, *decimals, *signed, &text).map(AbiValue::Fixed)
        }
        AbiType::Address => {
            let s = json.as_str().ok_or_else(mismatch)?;
            let address = Address::from_str(s.trim())?;
            Ok(AbiValue::Address(address))
        }
        AbiType::FixedBytes(n) => {
            let bytes = decode_hex(json.as_str().ok_or_else(mismatch)?)?;
            if bytes.len() != *n {
                return Err(CodecError::out_of_range(format!(
                    "bytes{} needs {} bytes, got {}",
                    n,
                    n,
                    bytes.len()
                )));
            }
            Ok(AbiValue::FixedBytes(bytes))
        }
        AbiType::Bytes => Ok(AbiValue::Bytes(decode_hex(json.as_str().ok_or_else(mismatch)?)?)),
        AbiType::String => Ok(AbiValue::String(json.as_str().ok_or_else(mismatch)?.to_string())),
        AbiType::FixedArray(elem, len) => {
            let items = json.as_array().ok_or_else(mismatch)?;
            if items.len() != *len {
                return Err(CodecError::ArgumentCountMismatch {
                    expected: *len,
                    actual: items.len(),
                });
            }
            let values = items
                .iter()
                .map(|item| value_from_json(elem, item))
                .collect::<Result<Vec<_>>>()?;
            Ok(AbiValue::FixedArray(elem.as_ref().clone(), values))
        }
        AbiType::Array(elem) => {
            let items = json.as_array().ok_or_else(mismatch)?;
            let values = items
                .iter()
                .map(|item| value_from_json(elem, item))
                .collect::<Result<Vec<_>>>()?;
            Ok(AbiValue::Array(elem.as_ref().clone(), values))
        }
        AbiType::Tuple(fields) => match json {
            Value::Array(items) => {
                if items.len() != fields.len() {
                    return Err(CodecError::ArgumentCountMismatch {
                        expected: fields.len(),
                        actual: items.len(),
                    });
                }
                fields
                    .iter()
                    .zip(items)
                    .map(|(field, item)| Ok((field.name.clone(), value_from_json(&field.ty, item)?)))
                    .collect::<Result<Vec<_>>>()
                    .map(AbiValue::Tuple)
            }
            Value::Object(map) => fields
                .iter()
                .map(|field| {
                    let item = map.get(&field.name).ok_or_else(|| {
                        CodecError::Json(format!("missing tuple field '{}'", field.name))
                    })?;
                    Ok((field.name.clone(), value_from_json(&field.ty, item)?))
                })
                .collect::<Result<Vec<_>>>()
                .map(AbiValue::Tuple),
            _ => Err(mismatch()),
        },
    }
}

/// Build one value per type from a JSON array of arguments.
pub fn values_from_json(types: &[AbiType], args: &Value) -> Result<Vec<AbiValue>> {
    let items = args
        .as_array()
        .ok_or_else(|| CodecError::Json("arguments must be a JSON array".into()))?;
    if items.len() != types.len() {
        return Err(CodecError::ArgumentCountMismatch {
            expected: types.len(),
            actual: items.len(),
        });
    }
    types
        .iter()
        .zip(items)
        .map(|(ty, item)| value_from_json(ty, item))
        .collect()
}

/// Render a value as JSON. Tuples with named components become objects.
pub fn value_to_json(value: &AbiValue) -> Value {
    match value {
        AbiValue::Bool(b) => Value::Bool(*b),
        AbiValue::Uint(v) => Value::String(v.value().to_string()),
        AbiValue::Int(v) => Value::String(v.value().to_string()),
        AbiValue::Fixed(v) => Value::String(v.to_string()),
        AbiValue::Address(a) => Value::String(a.to_string()),
        AbiValue::FixedBytes(b) | AbiValue::Bytes(b) => Value::String(format!("0x{}", hex::encode(b))),
        AbiValue::String(s) => Value::String(s.clone()),
        AbiValue::FixedArray(_, items) | AbiValue::Array(_, items) => {
            Value::Array(items.iter().map(value_to_json).collect())
        }
        AbiValue::Tuple(items) => {
            let named = !items.is_empty() && items.iter().all(|(name, _)| !name.is_empty());
            if named {
                let map: Map<String, Value> = items
                    .iter()
                    .map(|(name, v)| (name.clone(), value_to_json(v)))
                    .collect();
                Value::Object(map)
            } else {
                Value::Array(items.iter().map(|(_, v)| value_to_json(v)).collect())
            }
        }
    }
}

fn parse_biguint(json: &Value) -> Option<BigUint> {
    match json {
        Value::Number(n) => n.as_u64().map(BigUint::from),
        Value::String(s) => {
            let s = s.trim();
            match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some(hex) if !hex.is_empty() => BigUint::parse_bytes(hex.as_bytes(), 16),
                Some(_) => None,
                None => BigUint::parse_bytes(s.as_bytes(), 10),
            }
        }
        _ => None,
    }
}

fn parse_bigint(json: &Value) -> Option<BigInt> {
    match json {
        Value::Number(n) => n.as_i64().map(BigInt::from),
        Value::String(s) => {
            let s = s.trim();
            match s.strip_prefix('-') {
                Some(rest) => parse_biguint(&Value::String(rest.to_string())).map(|v| -BigInt::from(v)),
                None => parse_biguint(json).map(BigInt::from),
            }
        }
        _ => None,
    }
}

fn json_kind(json: &Value) -> &'static str {
    match json {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars_from_json() {
        assert_eq!(
            value_from_json(&AbiType::Uint(256), &json!("0xff")).unwrap(),
            AbiValue::uint256(255u8)
        );
        assert_eq!(
            value_from_json(&AbiType::Uint(256), &json!(42)).unwrap(),
            AbiValue::uint256(42u8)
        );
        assert_eq!(
            value_from_json(&AbiType::Int(32), &json!("-7")).unwrap(),
            AbiValue::int(32, -7).unwrap()
        );
        assert!(matches!(
            value_from_json(&AbiType::Uint(8), &json!(256)),
            Err(CodecError::ValueOutOfRange(_))
        ));
        assert!(matches!(
            value_from_json(&AbiType::Bool, &json!(1)),
            Err(CodecError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_fixed_from_json_number() {
        let ty = AbiType::parse("fixed128x18").unwrap();
        let value = value_from_json(&ty, &json!(-1.201)).unwrap();
        assert_eq!(value.to_string(), "-1.201");
    }

    #[test]
    fn test_bytes_and_address() {
        let addr = value_from_json(&AbiType::Address, &json!("0x7e5f4552091a69125d5dfcb7b8c2659029395bdf")).unwrap();
        assert!(matches!(addr, AbiValue::Address(_)));
        assert!(value_from_json(&AbiType::FixedBytes(2), &json!("0x0102")).is_ok());
        assert!(value_from_json(&AbiType::FixedBytes(2), &json!("0x01")).is_err());
        assert_eq!(
            value_from_json(&AbiType::Bytes, &json!("0x")).unwrap(),
            AbiValue::Bytes(Vec::new())
        );
    }

    #[test]
    fn test_tuple_from_object_and_array() {
        let ty = AbiType::parse("(address owner, uint64[] amounts)").unwrap();
        let from_object = value_from_json(
            &ty,
            &json!({"owner": "0x0000000000000000000000000000000000000001", "amounts": [1, "2"]}),
        )
        .unwrap();
        let from_array = value_from_json(
            &ty,
            &json!(["0x0000000000000000000000000000000000000001", ["1", 2]]),
        )
        .unwrap();
        assert_eq!(from_object, from_array);

        let back = value_to_json(&from_object);
        assert_eq!(back["amounts"], json!(["1", "2"]));
    }

    #[test]
    fn test_values_from_json_count() {
        let types = vec![AbiType::Bool, AbiType::String];
        assert!(values_from_json(&types, &json!([true, "x"])).is_ok());
        assert_eq!(
            values_from_json(&types, &json!([true])).unwrap_err(),
            CodecError::ArgumentCountMismatch { expected: 2, actual: 1 }
        );
    }
}
