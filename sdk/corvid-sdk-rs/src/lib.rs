//! Corvid SDK for Rust
//!
//! Builds, signs and decodes transactions for Corvid chains and turns
//! receipts back into results.
//!
//! # Example
//!
//! ```rust,ignore
//! use corvid_sdk::{Contract, KeyPairSigner, SdkConfig, TransactionPipeline};
//!
//! let config = SdkConfig::from_file("corvid.toml")?;
//! let suite = config.suite();
//! let signer = KeyPairSigner::from_hex(suite, "0x...")?;
//!
//! let token = Contract::from_json(suite, abi_json)?.at(token_address);
//! let request = token.call_request("transfer", &[to.into(), AbiValue::uint256(1000u32)])?;
//!
//! let signed = TransactionPipeline::from_config(&config)
//!     .build_and_sign(request, current_block, &signer)?;
//! println!("tx hash: {}", signed.tx_hash());
//! ```

pub mod config;
pub mod contract;
pub mod errors;
pub mod events;
pub mod receipt;
pub mod remote;
pub mod signer;
pub mod transaction;

pub use config::SdkConfig;
pub use contract::{Contract, ContractBuilder};
pub use errors::{ContractError, Result, SdkError};
pub use events::{DecodedEvent, EventDecoder};
pub use receipt::ReceiptParser;
pub use remote::HttpRemoteSigner;
pub use signer::{
    sign_first_of, sign_with_callback, CallbackSigner, KeyPairSigner, RemoteSigner,
    SigningCompletion, TransactionSigner,
};
pub use transaction::{
    HashedTransaction, SignedTransaction, TransactionBuilder, TransactionPipeline,
    TransactionRequest, UnsignedTransaction,
};

// Re-export the lower layers
pub use corvid_codec::{self as codec, AbiCodec, AbiType, AbiValue, ContractAbi, CryptoSuite};
pub use corvid_types::{Address, Hash, TransactionReceipt};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sdk_imports() {
        let _ = SdkConfig::default();
        let _ = ReceiptParser::new(CryptoSuite::default());
        let _ = TransactionBuilder::new(1, 1);
    }
}
