use crate::error::CryptoError;
use corvid_types::{Address, Ed25519PublicKey, Ed25519Signature, Hash};
use ed25519_dalek::{Signer, Verifier};
use rand::rngs::OsRng;
use std::fmt;

/// Ed25519 keypair. The signing key zeroizes itself on drop.
pub struct Ed25519Keypair {
    signing_key: ed25519_dalek::SigningKey,
}

impl Ed25519Keypair {
    /// Generate a new random keypair
    pub fn generate() -> Self {
        let mut csprng = OsRng;
        let signing_key = ed25519_dalek::SigningKey::generate(&mut csprng);
        Self { signing_key }
    }

    /// Create from a 32-byte seed
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = ed25519_dalek::SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Get the public key
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey::from_bytes(self.signing_key.verifying_key().to_bytes())
    }

    /// Get the address derived from this keypair
    pub fn address(&self) -> Address {
        address_from_public_key(&self.public_key())
    }

    /// Sign a message
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        let signature = self.signing_key.sign(message);
        Ed25519Signature::from_bytes(signature.to_bytes())
    }

    /// Sign a 32-byte digest
    pub fn sign_hash(&self, hash: &Hash) -> Ed25519Signature {
        self.sign(hash.as_bytes())
    }

    /// Export private key bytes (CAUTION: sensitive)
    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl fmt::Debug for Ed25519Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Keypair({})", self.address())
    }
}

impl Clone for Ed25519Keypair {
    fn clone(&self) -> Self {
        Self::from_seed(&self.to_bytes())
    }
}

/// `address = blake3(ed25519_pubkey)[0..20]`
pub fn address_from_public_key(public_key: &Ed25519PublicKey) -> Address {
    let hash = blake3::hash(public_key.as_bytes());
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash.as_bytes()[..20]);
    Address::from_bytes(addr)
}

/// Verify an ed25519 signature.
pub fn verify(
    public_key: &Ed25519PublicKey,
    message: &[u8],
    signature: &Ed25519Signature,
) -> Result<(), CryptoError> {
    let pk = ed25519_dalek::VerifyingKey::from_bytes(public_key.as_bytes())
        .map_err(|_| CryptoError::InvalidPublicKey)?;
    let sig = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
    pk.verify(message, &sig)
        .map_err(|_| CryptoError::VerificationFailed)
}
