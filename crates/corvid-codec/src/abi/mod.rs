//! Solidity contract ABI.
//!
//! [`AbiType`] describes a parameter, [`AbiValue`] carries a typed value,
//! and [`encode_params`] / [`decode`] implement the head/tail layout.
//! [`AbiCodec`] adds the hash-dependent pieces (selectors, topics) for a
//! configured crypto suite.

mod codec;
mod decode;
mod encode;
pub mod json;
pub mod json_value;
pub mod revert;
mod signature;
mod types;
mod value;

pub use codec::AbiCodec;
pub use decode::{decode, decode_single};
pub use encode::{encode, encode_params, Word};
pub use json::ContractAbi;
pub use revert::RevertReason;
pub use signature::{canonicalize, Constructor, ErrorDef, Event, Function, Param, StateMutability};
pub use types::{AbiType, TupleField, WORD_SIZE};
pub use value::{AbiValue, FixedValue, IntValue, UintValue};
