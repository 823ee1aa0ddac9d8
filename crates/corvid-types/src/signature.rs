use crate::error::TypesError;
use std::fmt;

/// Offset added to the recovery id when it is stored in `v`.
pub const ECDSA_V_OFFSET: u8 = 27;

/// Ed25519 signature (64 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ed25519Signature([u8; 64]);

impl Ed25519Signature {
    pub const LEN: usize = 64;

    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn from_slice(slice: &[u8]) -> Result<Self, TypesError> {
        if slice.len() != 64 {
            return Err(TypesError::InvalidSignatureLength {
                expected: 64,
                actual: slice.len(),
            });
        }
        let mut bytes = [0u8; 64];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Signature(0x{}...)", &hex::encode(&self.0[..8]))
    }
}

/// Ed25519 public key (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Ed25519PublicKey([u8; 32]);

impl Ed25519PublicKey {
    pub const LEN: usize = 32;

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn from_slice(slice: &[u8]) -> Result<Self, TypesError> {
        if slice.len() != 32 {
            return Err(TypesError::InvalidPublicKeyLength {
                expected: 32,
                actual: slice.len(),
            });
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519PublicKey(0x{}...)", &hex::encode(&self.0[..8]))
    }
}

/// Uncompressed secp256k1 public key without the `0x04` tag (64 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EcdsaPublicKey([u8; 64]);

impl EcdsaPublicKey {
    pub const LEN: usize = 64;

    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Accepts either the 64-byte raw form or the 65-byte `0x04`-tagged form.
    pub fn from_slice(slice: &[u8]) -> Result<Self, TypesError> {
        let raw = match slice.len() {
            64 => slice,
            65 if slice[0] == 0x04 => &slice[1..],
            actual => {
                return Err(TypesError::InvalidPublicKeyLength {
                    expected: 64,
                    actual,
                })
            }
        };
        let mut bytes = [0u8; 64];
        bytes.copy_from_slice(raw);
        Ok(Self(bytes))
    }
}

impl fmt::Debug for EcdsaPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EcdsaPublicKey(0x{}...)", &hex::encode(&self.0[..8]))
    }
}

/// Public key of either supported suite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PublicKey {
    Ecdsa(EcdsaPublicKey),
    Ed25519(Ed25519PublicKey),
}

impl PublicKey {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            PublicKey::Ecdsa(pk) => pk.as_bytes(),
            PublicKey::Ed25519(pk) => pk.as_bytes(),
        }
    }
}

impl fmt::LowerHex for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.as_bytes()))
    }
}

/// Output of a signer, consumed by the final RLP pass of the transaction
/// encoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureResult {
    /// secp256k1 signature; `v` is the recovery id plus 27.
    Ecdsa { v: u8, r: [u8; 32], s: [u8; 32] },
    /// Ed25519 signature carried together with the signer's public key,
    /// since Ed25519 has no public key recovery.
    Ed25519 {
        signature: Ed25519Signature,
        public_key: Ed25519PublicKey,
    },
}

impl SignatureResult {
    /// Build an ECDSA result from a raw recovery id (0 or 1).
    pub fn ecdsa(recovery_id: u8, r: [u8; 32], s: [u8; 32]) -> Result<Self, TypesError> {
        if recovery_id > 1 {
            return Err(TypesError::InvalidRecoveryId(recovery_id));
        }
        Ok(SignatureResult::Ecdsa {
            v: recovery_id + ECDSA_V_OFFSET,
            r,
            s,
        })
    }

    /// Recovery id for ECDSA signatures; accepts both raw and offset `v`.
    pub fn recovery_id(&self) -> Option<u8> {
        match self {
            SignatureResult::Ecdsa { v, .. } => match *v {
                0 | 1 => Some(*v),
                27 | 28 => Some(*v - ECDSA_V_OFFSET),
                _ => None,
            },
            SignatureResult::Ed25519 { .. } => None,
        }
    }

    /// Flat byte form: `r || s || v` for ECDSA, `signature || public_key`
    /// for Ed25519.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            SignatureResult::Ecdsa { v, r, s } => {
                let mut out = Vec::with_capacity(65);
                out.extend_from_slice(r);
                out.extend_from_slice(s);
                out.push(*v);
                out
            }
            SignatureResult::Ed25519 { signature, public_key } => {
                let mut out = Vec::with_capacity(96);
                out.extend_from_slice(signature.as_bytes());
                out.extend_from_slice(public_key.as_bytes());
                out
            }
        }
    }

    /// Parse the flat byte form produced by [`SignatureResult::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypesError> {
        match bytes.len() {
            65 => {
                let mut r = [0u8; 32];
                let mut s = [0u8; 32];
                r.copy_from_slice(&bytes[..32]);
                s.copy_from_slice(&bytes[32..64]);
                let v = bytes[64];
                let recovery_id = if v >= ECDSA_V_OFFSET { v - ECDSA_V_OFFSET } else { v };
                Self::ecdsa(recovery_id, r, s)
            }
            96 => Ok(SignatureResult::Ed25519 {
                signature: Ed25519Signature::from_slice(&bytes[..64])?,
                public_key: Ed25519PublicKey::from_slice(&bytes[64..])?,
            }),
            actual => Err(TypesError::InvalidSignatureLength {
                expected: 65,
                actual,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ecdsa_v_offset() {
        let sig = SignatureResult::ecdsa(1, [1u8; 32], [2u8; 32]).unwrap();
        assert!(matches!(sig, SignatureResult::Ecdsa { v: 28, .. }));
        assert_eq!(sig.recovery_id(), Some(1));

        assert_eq!(
            SignatureResult::ecdsa(2, [0u8; 32], [0u8; 32]),
            Err(TypesError::InvalidRecoveryId(2))
        );
    }

    #[test]
    fn test_signature_bytes_roundtrip() {
        let ecdsa = SignatureResult::ecdsa(0, [3u8; 32], [4u8; 32]).unwrap();
        let bytes = ecdsa.to_bytes();
        assert_eq!(bytes.len(), 65);
        assert_eq!(bytes[64], 27);
        assert_eq!(SignatureResult::from_bytes(&bytes).unwrap(), ecdsa);

        let ed = SignatureResult::Ed25519 {
            signature: Ed25519Signature::from_bytes([5u8; 64]),
            public_key: Ed25519PublicKey::from_bytes([6u8; 32]),
        };
        let bytes = ed.to_bytes();
        assert_eq!(bytes.len(), 96);
        assert_eq!(SignatureResult::from_bytes(&bytes).unwrap(), ed);
        assert_eq!(ed.recovery_id(), None);
    }

    #[test]
    fn test_signature_from_bytes_bad_length() {
        assert!(matches!(
            SignatureResult::from_bytes(&[0u8; 10]),
            Err(TypesError::InvalidSignatureLength { actual: 10, .. })
        ));
    }

    #[test]
    fn test_ecdsa_public_key_tagged_form() {
        let mut tagged = [9u8; 65];
        tagged[0] = 0x04;
        let pk = EcdsaPublicKey::from_slice(&tagged).unwrap();
        assert_eq!(pk.as_bytes(), &[9u8; 64]);

        tagged[0] = 0x02;
        assert!(EcdsaPublicKey::from_slice(&tagged).is_err());
    }
}
