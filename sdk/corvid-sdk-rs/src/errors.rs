//! SDK error types.

use corvid_codec::CodecError;
use corvid_crypto::CryptoError;
use corvid_types::TypesError;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result type for SDK operations.
pub type Result<T> = std::result::Result<T, SdkError>;

/// A failed transaction, as reported by its receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractError {
    /// Receipt status code
    pub code: i32,
    /// Decoded revert reason, or the status table message
    pub message: String,
}

impl ContractError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ContractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (status {})", self.message, self.code)
    }
}

impl std::error::Error for ContractError {}

/// SDK errors.
#[derive(Error, Debug, Clone)]
pub enum SdkError {
    /// Encoding or decoding error
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Key or signature error
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Malformed primitive (address, hash, hex)
    #[error("Invalid value: {0}")]
    Types(#[from] TypesError),

    /// Every signing provider failed
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// No signing provider answered in time
    #[error("Signing timed out after {0:?}")]
    SigningTimeout(Duration),

    /// Transaction reverted or was rejected
    #[error("Contract error: {0}")]
    Contract(ContractError),

    /// Invalid transaction
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// RPC error
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<ContractError> for SdkError {
    fn from(err: ContractError) -> Self {
        SdkError::Contract(err)
    }
}

impl From<reqwest::Error> for SdkError {
    fn from(err: reqwest::Error) -> Self {
        SdkError::Connection(err.to_string())
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(err: serde_json::Error) -> Self {
        SdkError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for SdkError {
    fn from(err: toml::de::Error) -> Self {
        SdkError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for SdkError {
    fn from(err: toml::ser::Error) -> Self {
        SdkError::Config(err.to_string())
    }
}
