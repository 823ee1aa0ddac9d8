use crate::error::CryptoError;
use crate::hash::keccak256;
use corvid_types::{Address, EcdsaPublicKey, Hash, SignatureResult};
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use zeroize::Zeroizing;

/// secp256k1 keypair. Secret bytes are zeroized on drop.
pub struct EcdsaKeypair {
    secret: Zeroizing<[u8; 32]>,
    public: EcdsaPublicKey,
}

impl EcdsaKeypair {
    /// Generate a new random keypair
    pub fn generate() -> Self {
        let mut rng = OsRng;
        loop {
            let mut bytes = Zeroizing::new([0u8; 32]);
            rng.fill_bytes(&mut bytes[..]);
            // Out-of-range scalars (zero or >= n) are astronomically rare; draw again.
            if let Ok(keypair) = Self::from_secret(&bytes) {
                return keypair;
            }
        }
    }

    /// Create from 32 secret key bytes
    pub fn from_secret(secret: &[u8; 32]) -> Result<Self, CryptoError> {
        let key = libsecp256k1::SecretKey::parse(secret).map_err(|_| CryptoError::InvalidPrivateKey)?;
        let public = libsecp256k1::PublicKey::from_secret_key(&key);
        Ok(Self {
            secret: Zeroizing::new(*secret),
            public: public_key_from_lib(&public),
        })
    }

    /// Create from a hex-encoded secret key (with or without 0x)
    pub fn from_hex(secret: &str) -> Result<Self, CryptoError> {
        let secret = secret.trim_start_matches("0x");
        let bytes = hex::decode(secret)?;
        let bytes: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidPrivateKey)?;
        Self::from_secret(&bytes)
    }

    /// Get the public key
    pub fn public_key(&self) -> EcdsaPublicKey {
        self.public
    }

    /// Get the address derived from this keypair
    pub fn address(&self) -> Address {
        address_from_public_key(&self.public)
    }

    /// Sign a 32-byte digest, returning `v = recovery_id + 27`
    pub fn sign_hash(&self, hash: &Hash) -> Result<SignatureResult, CryptoError> {
        let key = libsecp256k1::SecretKey::parse(&self.secret)
            .map_err(|_| CryptoError::InvalidPrivateKey)?;
        let message = libsecp256k1::Message::parse(hash.as_bytes());
        let (signature, recovery_id) = libsecp256k1::sign(&message, &key);
        let raw = signature.serialize();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&raw[..32]);
        s.copy_from_slice(&raw[32..]);
        SignatureResult::ecdsa(recovery_id.serialize(), r, s)
            .map_err(|_| CryptoError::InvalidSignature)
    }

    /// Export private key bytes (CAUTION: sensitive)
    pub fn to_bytes(&self) -> [u8; 32] {
        *self.secret
    }
}

impl fmt::Debug for EcdsaKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EcdsaKeypair({})", self.address())
    }
}

impl Clone for EcdsaKeypair {
    fn clone(&self) -> Self {
        Self {
            secret: Zeroizing::new(*self.secret),
            public: self.public,
        }
    }
}

fn public_key_from_lib(public: &libsecp256k1::PublicKey) -> EcdsaPublicKey {
    let tagged = public.serialize();
    let mut raw = [0u8; 64];
    raw.copy_from_slice(&tagged[1..]);
    EcdsaPublicKey::from_bytes(raw)
}

fn public_key_to_lib(public: &EcdsaPublicKey) -> Result<libsecp256k1::PublicKey, CryptoError> {
    let mut tagged = [0u8; 65];
    tagged[0] = 0x04;
    tagged[1..].copy_from_slice(public.as_bytes());
    libsecp256k1::PublicKey::parse(&tagged).map_err(|_| CryptoError::InvalidPublicKey)
}

fn split_signature(
    signature: &SignatureResult,
) -> Result<(libsecp256k1::Signature, libsecp256k1::RecoveryId), CryptoError> {
    let SignatureResult::Ecdsa { r, s, .. } = signature else {
        return Err(CryptoError::InvalidSignature);
    };
    let recovery_id = signature.recovery_id().ok_or(CryptoError::InvalidSignature)?;
    let mut raw = [0u8; 64];
    raw[..32].copy_from_slice(r);
    raw[32..].copy_from_slice(s);
    let sig = libsecp256k1::Signature::parse_standard(&raw)
        .map_err(|_| CryptoError::InvalidSignature)?;
    let rid = libsecp256k1::RecoveryId::parse(recovery_id)
        .map_err(|_| CryptoError::InvalidSignature)?;
    Ok((sig, rid))
}

/// `address = keccak256(pubkey)[12..32]`
pub fn address_from_public_key(public_key: &EcdsaPublicKey) -> Address {
    let hash = keccak256(public_key.as_bytes());
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash.as_bytes()[12..]);
    Address::from_bytes(addr)
}

/// Verify a secp256k1 signature over a digest.
pub fn verify(
    public_key: &EcdsaPublicKey,
    hash: &Hash,
    signature: &SignatureResult,
) -> Result<(), CryptoError> {
    let (sig, _) = split_signature(signature)?;
    let pk = public_key_to_lib(public_key)?;
    let message = libsecp256k1::Message::parse(hash.as_bytes());
    if libsecp256k1::verify(&message, &sig, &pk) {
        Ok(())
    } else {
        Err(CryptoError::VerificationFailed)
    }
}

/// Recover the signer's public key from a digest and signature.
pub fn recover(hash: &Hash, signature: &SignatureResult) -> Result<EcdsaPublicKey, CryptoError> {
    let (sig, rid) = split_signature(signature)?;
    let message = libsecp256k1::Message::parse(hash.as_bytes());
    let pk = libsecp256k1::recover(&message, &sig, &rid).map_err(|_| CryptoError::RecoveryFailed)?;
    Ok(public_key_from_lib(&pk))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_known_address() {
        let mut secret = [0u8; 32];
        secret[31] = 1;
        let keypair = EcdsaKeypair::from_secret(&secret).unwrap();
        assert_eq!(
            keypair.address().as_bytes(),
            &hex!("7e5f4552091a69125d5dfcb7b8c2659029395bdf")
        );
    }

    #[test]
    fn test_invalid_secret() {
        assert_eq!(
            EcdsaKeypair::from_secret(&[0u8; 32]).unwrap_err(),
            CryptoError::InvalidPrivateKey
        );
        assert!(EcdsaKeypair::from_hex("0x1234").is_err());
    }

    #[test]
    fn test_sign_verify_recover() {
        let keypair = EcdsaKeypair::generate();
        let hash = keccak256(b"payload");

        let signature = keypair.sign_hash(&hash).unwrap();
        assert!(matches!(signature, SignatureResult::Ecdsa { v: 27 | 28, .. }));

        assert!(verify(&keypair.public_key(), &hash, &signature).is_ok());
        assert_eq!(recover(&hash, &signature).unwrap(), keypair.public_key());

        let other = keccak256(b"other payload");
        assert_eq!(
            verify(&keypair.public_key(), &other, &signature),
            Err(CryptoError::VerificationFailed)
        );
        assert_ne!(recover(&other, &signature).ok(), Some(keypair.public_key()));
    }

    #[test]
    fn test_from_hex_roundtrip() {
        let keypair = EcdsaKeypair::generate();
        let restored = EcdsaKeypair::from_hex(&format!("0x{}", hex::encode(keypair.to_bytes()))).unwrap();
        assert_eq!(restored.address(), keypair.address());
    }
}
