use super::types::{AbiType, TupleField};
use crate::error::{CodecError, Result};
use corvid_types::Address;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Signed, Zero};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Unsigned integer with a declared bit width.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UintValue {
    bits: usize,
    value: BigUint,
}

impl UintValue {
    /// Create a value, failing if it does not fit in `bits`.
    pub fn new(bits: usize, value: impl Into<BigUint>) -> Result<Self> {
        check_width(bits)?;
        let value = value.into();
        if value.bits() > bits as u64 {
            return Err(CodecError::out_of_range(format!("{} does not fit in uint{}", value, bits)));
        }
        Ok(Self { bits, value })
    }

    pub fn bits(&self) -> usize {
        self.bits
    }

    pub fn value(&self) -> &BigUint {
        &self.value
    }
}

/// Signed integer with a declared bit width.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IntValue {
    bits: usize,
    value: BigInt,
}

impl IntValue {
    pub fn new(bits: usize, value: impl Into<BigInt>) -> Result<Self> {
        check_width(bits)?;
        let value = value.into();
        if !fits_signed(&value, bits) {
            return Err(CodecError::out_of_range(format!("{} does not fit in int{}", value, bits)));
        }
        Ok(Self { bits, value })
    }

    pub fn bits(&self) -> usize {
        self.bits
    }

    pub fn value(&self) -> &BigInt {
        &self.value
    }
}

/// Exact fixed-point number.
///
/// Stored as the scaled integer `value * 10^decimals`; construction rejects
/// inputs that would need rounding or that overflow `bits`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FixedValue {
    bits: usize,
    decimals: usize,
    signed: bool,
    scaled: BigInt,
}

impl FixedValue {
    /// Build from an already scaled integer.
    pub fn from_scaled(bits: usize, decimals: usize, signed: bool, scaled: impl Into<BigInt>) -> Result<Self> {
        check_width(bits)?;
        let scaled = scaled.into();
        let fits = if signed {
            fits_signed(&scaled, bits)
        } else {
            !scaled.is_negative() && scaled.bits() <= bits as u64
        };
        if !fits {
            return Err(CodecError::out_of_range(format!(
                "{} does not fit in {}",
                format_scaled(&scaled, decimals),
                fixed_name(bits, decimals, signed)
            )));
        }
        Ok(Self {
            bits,
            decimals,
            signed,
            scaled,
        })
    }

    /// Parse a decimal literal such as `-1.201` or `1.25`.
    pub fn parse(bits: usize, decimals: usize, signed: bool, text: &str) -> Result<Self> {
        let invalid = || CodecError::out_of_range(format!("invalid decimal literal: {}", text));
        let text = text.trim();
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let significant = frac_part.trim_end_matches('0');
        if significant.len() > decimals {
            return Err(CodecError::out_of_range(format!(
                "{} needs more than {} decimals",
                text, decimals
            )));
        }
        let mut scaled_digits = String::with_capacity(int_part.len() + decimals);
        scaled_digits.push_str(int_part);
        scaled_digits.push_str(significant);
        scaled_digits.extend(std::iter::repeat('0').take(decimals - significant.len()));

        let magnitude = if scaled_digits.is_empty() {
            BigInt::zero()
        } else {
            BigInt::from_str(&scaled_digits).map_err(|_| invalid())?
        };
        let scaled = if negative { -magnitude } else { magnitude };
        Self::from_scaled(bits, decimals, signed, scaled)
    }

    /// Build from a `rust_decimal::Decimal`.
    pub fn from_decimal(bits: usize, decimals: usize, signed: bool, value: Decimal) -> Result<Self> {
        Self::parse(bits, decimals, signed, &value.normalize().to_string())
    }

    pub fn bits(&self) -> usize {
        self.bits
    }

    pub fn decimals(&self) -> usize {
        self.decimals
    }

    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// The integer carried on the wire.
    pub fn scaled(&self) -> &BigInt {
        &self.scaled
    }

    /// Convert to a `Decimal` if it fits in 96 bits of mantissa.
    pub fn to_decimal(&self) -> Option<Decimal> {
        Decimal::from_str(&self.to_string()).ok()
    }

    pub fn abi_type(&self) -> AbiType {
        AbiType::Fixed {
            bits: self.bits,
            decimals: self.decimals,
            signed: self.signed,
        }
    }
}

impl fmt::Display for FixedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_scaled(&self.scaled, self.decimals))
    }
}

/// A typed value ready to be encoded.
///
/// Array variants carry their element type so that empty arrays still have
/// a declared type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AbiValue {
    Bool(bool),
    Uint(UintValue),
    Int(IntValue),
    Fixed(FixedValue),
    Address(Address),
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    FixedArray(AbiType, Vec<AbiValue>),
    Array(AbiType, Vec<AbiValue>),
    Tuple(Vec<(String, AbiValue)>),
}

impl AbiValue {
    pub fn uint(bits: usize, value: impl Into<BigUint>) -> Result<Self> {
        UintValue::new(bits, value).map(AbiValue::Uint)
    }

    /// `uint256` from a primitive; always in range.
    pub fn uint256(value: impl Into<u128>) -> Self {
        AbiValue::Uint(UintValue {
            bits: 256,
            value: BigUint::from(value.into()),
        })
    }

    pub fn int(bits: usize, value: impl Into<BigInt>) -> Result<Self> {
        IntValue::new(bits, value).map(AbiValue::Int)
    }

    pub fn fixed(bits: usize, decimals: usize, signed: bool, text: &str) -> Result<Self> {
        FixedValue::parse(bits, decimals, signed, text).map(AbiValue::Fixed)
    }

    pub fn fixed_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() || bytes.len() > 32 {
            return Err(CodecError::out_of_range(format!(
                "bytesN length must be 1..=32, got {}",
                bytes.len()
            )));
        }
        Ok(AbiValue::FixedBytes(bytes))
    }

    pub fn string(s: impl Into<String>) -> Self {
        AbiValue::String(s.into())
    }

    /// Fixed-size array; every element must have type `elem`.
    pub fn fixed_array(elem: AbiType, values: Vec<AbiValue>) -> Result<Self> {
        if values.is_empty() {
            return Err(CodecError::out_of_range("fixed array must not be empty"));
        }
        check_elements(&elem, &values)?;
        Ok(AbiValue::FixedArray(elem, values))
    }

    /// Dynamic array; every element must have type `elem`.
    pub fn array(elem: AbiType, values: Vec<AbiValue>) -> Result<Self> {
        check_elements(&elem, &values)?;
        Ok(AbiValue::Array(elem, values))
    }

    /// Tuple with unnamed components.
    pub fn tuple(values: Vec<AbiValue>) -> Self {
        AbiValue::Tuple(values.into_iter().map(|v| (String::new(), v)).collect())
    }

    /// The declared type of this value.
    pub fn abi_type(&self) -> AbiType {
        match self {
            AbiValue::Bool(_) => AbiType::Bool,
            AbiValue::Uint(v) => AbiType::Uint(v.bits),
            AbiValue::Int(v) => AbiType::Int(v.bits),
            AbiValue::Fixed(v) => v.abi_type(),
            AbiValue::Address(_) => AbiType::Address,
            AbiValue::FixedBytes(b) => AbiType::FixedBytes(b.len()),
            AbiValue::Bytes(_) => AbiType::Bytes,
            AbiValue::String(_) => AbiType::String,
            AbiValue::FixedArray(elem, values) => AbiType::FixedArray(Box::new(elem.clone()), values.len()),
            AbiValue::Array(elem, _) => AbiType::Array(Box::new(elem.clone())),
            AbiValue::Tuple(items) => AbiType::Tuple(
                items
                    .iter()
                    .map(|(name, v)| TupleField::new(name.clone(), v.abi_type()))
                    .collect(),
            ),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AbiValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_biguint(&self) -> Option<&BigUint> {
        match self {
            AbiValue::Uint(v) => Some(&v.value),
            _ => None,
        }
    }

    pub fn as_bigint(&self) -> Option<&BigInt> {
        match self {
            AbiValue::Int(v) => Some(&v.value),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<&Address> {
        match self {
            AbiValue::Address(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            AbiValue::Bytes(b) | AbiValue::FixedBytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AbiValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_slice(&self) -> Option<&[AbiValue]> {
        match self {
            AbiValue::FixedArray(_, v) | AbiValue::Array(_, v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiValue::Bool(b) => write!(f, "{}", b),
            AbiValue::Uint(v) => write!(f, "{}", v.value),
            AbiValue::Int(v) => write!(f, "{}", v.value),
            AbiValue::Fixed(v) => write!(f, "{}", v),
            AbiValue::Address(a) => write!(f, "{}", a),
            AbiValue::FixedBytes(b) | AbiValue::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            AbiValue::String(s) => write!(f, "{:?}", s),
            AbiValue::FixedArray(_, values) | AbiValue::Array(_, values) => {
                write!(f, "[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            AbiValue::Tuple(items) => {
                write!(f, "(")?;
                for (i, (_, v)) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<bool> for AbiValue {
    fn from(b: bool) -> Self {
        AbiValue::Bool(b)
    }
}

impl From<Address> for AbiValue {
    fn from(a: Address) -> Self {
        AbiValue::Address(a)
    }
}

impl From<String> for AbiValue {
    fn from(s: String) -> Self {
        AbiValue::String(s)
    }
}

impl From<&str> for AbiValue {
    fn from(s: &str) -> Self {
        AbiValue::String(s.to_string())
    }
}

fn check_width(bits: usize) -> Result<()> {
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        return Err(CodecError::out_of_range(format!("invalid bit width {}", bits)));
    }
    Ok(())
}

pub(crate) fn fits_signed(value: &BigInt, bits: usize) -> bool {
    let bound = BigInt::one() << (bits - 1);
    value >= &(-bound.clone()) && value < &bound
}

fn check_elements(elem: &AbiType, values: &[AbiValue]) -> Result<()> {
    for value in values {
        let actual = value.abi_type();
        if !actual.same_shape(elem) {
            return Err(CodecError::TypeMismatch {
                expected: elem.canonical(),
                actual: actual.canonical(),
            });
        }
    }
    Ok(())
}

fn fixed_name(bits: usize, decimals: usize, signed: bool) -> String {
    AbiType::Fixed { bits, decimals, signed }.canonical()
}

/// Render a scaled integer as a plain decimal with trailing zeros trimmed.
fn format_scaled(scaled: &BigInt, decimals: usize) -> String {
    let digits = scaled.magnitude().to_str_radix(10);
    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals - digits.len() + 1), digits)
    } else {
        digits
    };
    let split = padded.len() - decimals;
    let (int_part, frac_part) = padded.split_at(split);
    let frac_part = frac_part.trim_end_matches('0');
    let sign = if scaled.sign() == Sign::Minus { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{}{}", sign, int_part)
    } else {
        format!("{}{}.{}", sign, int_part, frac_part)
    }
}
