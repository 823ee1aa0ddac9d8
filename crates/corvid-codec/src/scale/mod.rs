//! SCALE encoding used by the WASM execution engine.
//!
//! Integers are little-endian with fixed width; lengths and counts use the
//! variable-length compact format from [`compact`].

pub mod compact;
mod codec;
mod stream;

pub use codec::{decode, encode, ScaleCodec};
pub use compact::CompactMode;
pub use stream::{ScaleReader, ScaleWriter};
