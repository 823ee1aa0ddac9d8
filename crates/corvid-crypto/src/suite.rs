use crate::ecdsa::{self, EcdsaKeypair};
use crate::ed25519::{self, Ed25519Keypair};
use crate::error::CryptoError;
use crate::hash::HashAlgorithm;
use corvid_types::{Address, Hash, PublicKey, SignatureResult};
use std::fmt;
use std::str::FromStr;

/// Which suite a chain runs with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CryptoSuiteKind {
    /// secp256k1 + Keccak-256
    #[default]
    Ecdsa,
    /// Ed25519 + blake3
    Ed25519,
}

impl fmt::Display for CryptoSuiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoSuiteKind::Ecdsa => write!(f, "ecdsa"),
            CryptoSuiteKind::Ed25519 => write!(f, "ed25519"),
        }
    }
}

impl FromStr for CryptoSuiteKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ecdsa" | "secp256k1" => Ok(CryptoSuiteKind::Ecdsa),
            "ed25519" => Ok(CryptoSuiteKind::Ed25519),
            other => Err(format!("unknown crypto suite: {}", other)),
        }
    }
}

/// Key pair of either suite.
#[derive(Clone, Debug)]
pub enum KeyPair {
    Ecdsa(EcdsaKeypair),
    Ed25519(Ed25519Keypair),
}

impl KeyPair {
    pub fn kind(&self) -> CryptoSuiteKind {
        match self {
            KeyPair::Ecdsa(_) => CryptoSuiteKind::Ecdsa,
            KeyPair::Ed25519(_) => CryptoSuiteKind::Ed25519,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        match self {
            KeyPair::Ecdsa(kp) => PublicKey::Ecdsa(kp.public_key()),
            KeyPair::Ed25519(kp) => PublicKey::Ed25519(kp.public_key()),
        }
    }

    pub fn address(&self) -> Address {
        match self {
            KeyPair::Ecdsa(kp) => kp.address(),
            KeyPair::Ed25519(kp) => kp.address(),
        }
    }

    /// Export private key bytes (CAUTION: sensitive)
    pub fn secret_bytes(&self) -> [u8; 32] {
        match self {
            KeyPair::Ecdsa(kp) => kp.to_bytes(),
            KeyPair::Ed25519(kp) => kp.to_bytes(),
        }
    }
}

/// The hash and signature algorithms of the running chain.
///
/// Cheap to copy; every component that hashes or signs receives one at
/// construction time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct CryptoSuite {
    kind: CryptoSuiteKind,
}

impl CryptoSuite {
    pub const fn new(kind: CryptoSuiteKind) -> Self {
        Self { kind }
    }

    pub const fn ecdsa() -> Self {
        Self::new(CryptoSuiteKind::Ecdsa)
    }

    pub const fn ed25519() -> Self {
        Self::new(CryptoSuiteKind::Ed25519)
    }

    pub fn kind(&self) -> CryptoSuiteKind {
        self.kind
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        match self.kind {
            CryptoSuiteKind::Ecdsa => HashAlgorithm::Keccak256,
            CryptoSuiteKind::Ed25519 => HashAlgorithm::Blake3,
        }
    }

    /// Hash arbitrary data with the suite's hash function
    pub fn hash(&self, data: &[u8]) -> Hash {
        self.hash_algorithm().digest(data)
    }

    /// Generate a fresh key pair for this suite
    pub fn generate_keypair(&self) -> KeyPair {
        match self.kind {
            CryptoSuiteKind::Ecdsa => KeyPair::Ecdsa(EcdsaKeypair::generate()),
            CryptoSuiteKind::Ed25519 => KeyPair::Ed25519(Ed25519Keypair::generate()),
        }
    }

    /// Restore a key pair from 32 secret bytes
    pub fn keypair_from_secret(&self, secret: &[u8; 32]) -> Result<KeyPair, CryptoError> {
        match self.kind {
            CryptoSuiteKind::Ecdsa => Ok(KeyPair::Ecdsa(EcdsaKeypair::from_secret(secret)?)),
            CryptoSuiteKind::Ed25519 => Ok(KeyPair::Ed25519(Ed25519Keypair::from_seed(secret))),
        }
    }

    /// Restore a key pair from hex-encoded secret bytes
    pub fn keypair_from_hex(&self, secret: &str) -> Result<KeyPair, CryptoError> {
        let bytes = hex::decode(secret.trim().trim_start_matches("0x"))?;
        let bytes: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidPrivateKey)?;
        self.keypair_from_secret(&bytes)
    }

    /// Sign a digest with a key pair of this suite
    pub fn sign(&self, hash: &Hash, keypair: &KeyPair) -> Result<SignatureResult, CryptoError> {
        match keypair {
            KeyPair::Ecdsa(kp) if self.kind == CryptoSuiteKind::Ecdsa => kp.sign_hash(hash),
            KeyPair::Ed25519(kp) if self.kind == CryptoSuiteKind::Ed25519 => {
                Ok(SignatureResult::Ed25519 {
                    signature: kp.sign_hash(hash),
                    public_key: kp.public_key(),
                })
            }
            other => Err(self.mismatch(other.kind())),
        }
    }

    /// Verify a signature over a digest against a public key
    pub fn verify(
        &self,
        public_key: &PublicKey,
        hash: &Hash,
        signature: &SignatureResult,
    ) -> Result<(), CryptoError> {
        match (self.kind, public_key, signature) {
            (CryptoSuiteKind::Ecdsa, PublicKey::Ecdsa(pk), SignatureResult::Ecdsa { .. }) => {
                ecdsa::verify(pk, hash, signature)
            }
            (
                CryptoSuiteKind::Ed25519,
                PublicKey::Ed25519(pk),
                SignatureResult::Ed25519 {
                    signature: sig,
                    public_key: embedded,
                },
            ) => {
                if embedded != pk {
                    return Err(CryptoError::VerificationFailed);
                }
                ed25519::verify(pk, hash.as_bytes(), sig)
            }
            (_, PublicKey::Ecdsa(_), _) => Err(self.mismatch(CryptoSuiteKind::Ecdsa)),
            (_, PublicKey::Ed25519(_), _) => Err(self.mismatch(CryptoSuiteKind::Ed25519)),
        }
    }

    /// Recover the signer's public key.
    ///
    /// ECDSA recovers it from the signature; Ed25519 signatures carry it
    /// and are verified against it before it is returned.
    pub fn recover(&self, hash: &Hash, signature: &SignatureResult) -> Result<PublicKey, CryptoError> {
        match (self.kind, signature) {
            (CryptoSuiteKind::Ecdsa, SignatureResult::Ecdsa { .. }) => {
                Ok(PublicKey::Ecdsa(ecdsa::recover(hash, signature)?))
            }
            (CryptoSuiteKind::Ed25519, SignatureResult::Ed25519 { signature: sig, public_key }) => {
                ed25519::verify(public_key, hash.as_bytes(), sig)?;
                Ok(PublicKey::Ed25519(*public_key))
            }
            (_, SignatureResult::Ecdsa { .. }) => Err(self.mismatch(CryptoSuiteKind::Ecdsa)),
            (_, SignatureResult::Ed25519 { .. }) => Err(self.mismatch(CryptoSuiteKind::Ed25519)),
        }
    }

    /// Derive the account address of a public key
    pub fn address_of(&self, public_key: &PublicKey) -> Address {
        match public_key {
            PublicKey::Ecdsa(pk) => ecdsa::address_from_public_key(pk),
            PublicKey::Ed25519(pk) => ed25519::address_from_public_key(pk),
        }
    }

    fn mismatch(&self, actual: CryptoSuiteKind) -> CryptoError {
        CryptoError::SuiteMismatch {
            configured: self.kind,
            actual,
        }
    }
}

impl From<CryptoSuiteKind> for CryptoSuite {
    fn from(kind: CryptoSuiteKind) -> Self {
        Self::new(kind)
    }
}
