use crate::suite::CryptoSuiteKind;
use thiserror::Error;

/// Errors that can occur in cryptographic operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CryptoError {
    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid public key")]
    InvalidPublicKey,

    #[error("Invalid private key")]
    InvalidPrivateKey,

    #[error("Signature verification failed")]
    VerificationFailed,

    #[error("Public key recovery failed")]
    RecoveryFailed,

    #[error("Suite mismatch: configured {configured:?}, got {actual:?}")]
    SuiteMismatch {
        configured: CryptoSuiteKind,
        actual: CryptoSuiteKind,
    },

    #[error("Invalid hex: {0}")]
    InvalidHex(String),
}

impl From<ed25519_dalek::SignatureError> for CryptoError {
    fn from(_: ed25519_dalek::SignatureError) -> Self {
        CryptoError::InvalidSignature
    }
}

impl From<hex::FromHexError> for CryptoError {
    fn from(e: hex::FromHexError) -> Self {
        CryptoError::InvalidHex(e.to_string())
    }
}
