//! Corvid Crypto - Cryptographic suites for the Corvid SDK.
//!
//! A chain runs with exactly one of two suites, chosen when the SDK is
//! configured and fixed afterwards:
//! - `ecdsa`: secp256k1 signatures with Keccak-256 hashing
//! - `ed25519`: Ed25519 signatures with blake3 hashing
//!
//! [`CryptoSuite`] is the value threaded through the codec and the
//! transaction pipeline; there is no process-wide suite selection.

pub mod ecdsa;
pub mod ed25519;
pub mod hash;
pub mod suite;
pub mod error;

pub use ecdsa::EcdsaKeypair;
pub use ed25519::Ed25519Keypair;
pub use hash::{blake3_hash, keccak256, HashAlgorithm, IncrementalHasher};
pub use suite::{CryptoSuite, CryptoSuiteKind, KeyPair};
pub use error::CryptoError;
