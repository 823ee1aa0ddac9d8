//! Corvid Types - Core type definitions shared by the Corvid SDK crates.
//!
//! This crate provides the plain data types that flow between the codec,
//! the crypto suites and the transaction pipeline:
//! - Addresses (20-byte, hex encoded)
//! - Hashes (32-byte digests, produced by the configured crypto suite)
//! - Signature results and public keys for both supported suites
//! - Raw and signed transactions
//! - Transaction receipts and logs

pub mod address;
pub mod hash;
pub mod signature;
pub mod transaction;
pub mod receipt;
pub mod error;

#[cfg(feature = "serde")]
mod serialization;

pub use address::Address;
pub use hash::Hash;
pub use signature::{
    EcdsaPublicKey, Ed25519PublicKey, Ed25519Signature, PublicKey, SignatureResult,
};
pub use transaction::{RawTransaction, SignedTransaction};
pub use receipt::{Log, TransactionReceipt};
pub use error::TypesError;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Address, Hash, PublicKey, SignatureResult,
        RawTransaction, SignedTransaction,
        TransactionReceipt, Log, TypesError,
    };
}
