use crate::error::{decode_hex, TypesError};
use std::fmt;
use std::str::FromStr;

/// 32-byte digest.
///
/// The algorithm that produced it (Keccak-256 or blake3) is a property of
/// the active crypto suite, not of this type.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Hash([u8; 32]);

impl Hash {
    pub const ZERO: Self = Self([0u8; 32]);
    pub const LEN: usize = 32;

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Create from a byte slice
    pub fn from_slice(slice: &[u8]) -> Result<Self, TypesError> {
        if slice.len() != 32 {
            return Err(TypesError::InvalidHashLength(slice.len()));
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    /// First four bytes, as used for function selectors
    pub fn selector(&self) -> [u8; 4] {
        [self.0[0], self.0[1], self.0[2], self.0[3]]
    }

    /// Check if hash is zero
    pub fn is_zero(&self) -> bool {
        self == &Self::ZERO
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self)
    }
}

impl fmt::LowerHex for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Hash {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = decode_hex(s)?;
        Self::from_slice(&bytes)
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_hex_roundtrip() {
        let hash = Hash::from_bytes([7u8; 32]);
        let hex = hash.to_string();
        assert!(hex.starts_with("0x"));
        let parsed: Hash = hex.parse().unwrap();
        assert_eq!(hash, parsed);

        // Prefix is optional when parsing
        let parsed: Hash = hash.to_hex().parse().unwrap();
        assert_eq!(hash, parsed);
    }

    #[test]
    fn test_hash_selector() {
        let mut bytes = [0u8; 32];
        bytes[..4].copy_from_slice(&[0x25, 0x7e, 0x44, 0xf7]);
        assert_eq!(Hash::from_bytes(bytes).selector(), [0x25, 0x7e, 0x44, 0xf7]);
    }

    #[test]
    fn test_hash_zero_and_length() {
        assert!(Hash::ZERO.is_zero());
        assert_eq!(Hash::from_slice(&[0u8; 31]), Err(TypesError::InvalidHashLength(31)));
    }
}
