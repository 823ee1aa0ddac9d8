use crate::error::{decode_hex, TypesError};
use std::fmt;
use std::str::FromStr;

/// 20-byte account or contract address.
///
/// How an address is derived from a public key depends on the crypto suite
/// in use, so derivation lives in `corvid-crypto`; this type only carries
/// the bytes. Display format is lowercase `0x`-prefixed hex.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address([u8; 20]);

impl Address {
    pub const ZERO: Self = Self([0u8; 20]);
    pub const LEN: usize = 20;

    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Create from a byte slice
    pub fn from_slice(slice: &[u8]) -> Result<Self, TypesError> {
        if slice.len() != 20 {
            return Err(TypesError::InvalidAddressLength(slice.len()));
        }
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    /// Check if this is the zero address
    pub fn is_zero(&self) -> bool {
        self == &Self::ZERO
    }

    /// Check if this is a precompiled contract address (all zeros except last 4 bytes)
    pub fn is_precompiled(&self) -> bool {
        self.0[..16].iter().all(|&b| b == 0) && !self.is_zero()
    }

    /// Convert to hex string without 0x prefix
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", hex::encode(self.0))
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::UpperHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode_upper(self.0))
    }
}

impl FromStr for Address {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !(s.starts_with("0x") || s.starts_with("0X")) {
            return Err(TypesError::InvalidAddressFormat(s.to_string()));
        }
        let bytes = decode_hex(s)?;
        Self::from_slice(&bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_zero() {
        assert_eq!(Address::ZERO.as_bytes(), &[0u8; 20]);
        assert!(Address::ZERO.is_zero());
    }

    #[test]
    fn test_address_from_bytes() {
        let bytes = [1u8; 20];
        let addr = Address::from_bytes(bytes);
        assert_eq!(addr.as_bytes(), &bytes);
    }

    #[test]
    fn test_address_hex_roundtrip() {
        let bytes = [0xabu8; 20];
        let addr = Address::from_bytes(bytes);

        let hex = addr.to_string();
        assert_eq!(hex, format!("0x{}", "ab".repeat(20)));
        let parsed: Address = hex.parse().unwrap();
        assert_eq!(addr, parsed);

        let upper = format!("{:X}", addr);
        assert_eq!(upper.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn test_address_from_str_invalid() {
        // Missing prefix
        assert!(Address::from_str("abababababababababababababababababababab").is_err());

        // Too short
        assert_eq!(
            Address::from_str("0x1234"),
            Err(TypesError::InvalidAddressLength(2))
        );

        // Not hex
        assert!(Address::from_str("0xzz").is_err());
    }

    #[test]
    fn test_address_is_precompiled() {
        assert!(!Address::ZERO.is_precompiled());

        let mut bytes = [0u8; 20];
        bytes[18] = 0x10;
        bytes[19] = 0x01;
        assert!(Address::from_bytes(bytes).is_precompiled());

        let mut bytes = [0u8; 20];
        bytes[0] = 1;
        assert!(!Address::from_bytes(bytes).is_precompiled());
    }
}
