//! Corvid Codec - wire formats for contract calls and transactions.
//!
//! - [`abi`]: type descriptors, the schema builder, and the Solidity
//!   head/tail codec (plus JSON ABI loading and revert payloads)
//! - [`scale`]: SCALE compact integers and the value codec used by the
//!   WASM execution engine
//! - [`rlp`]: recursive length prefix encoding for transactions
//!
//! All codec functions are pure and safe to call from any thread. Hashing
//! (selectors, topics) goes through an explicit [`CryptoSuite`].

pub mod abi;
pub mod scale;
pub mod rlp;
pub mod error;

pub use abi::{
    AbiCodec, AbiType, AbiValue, Constructor, ContractAbi, ErrorDef, Event, FixedValue,
    Function, IntValue, Param, RevertReason, StateMutability, TupleField, UintValue,
};
pub use corvid_crypto::CryptoSuite;
pub use error::{CodecError, Result};
pub use rlp::RlpItem;
pub use scale::ScaleCodec;
