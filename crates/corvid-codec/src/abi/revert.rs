use super::decode::decode;
use super::encode::encode;
use super::signature::ErrorDef;
use super::types::AbiType;
use super::value::AbiValue;
use crate::error::Result;
use corvid_crypto::CryptoSuite;
use num_traits::ToPrimitive;
use std::fmt;

pub const ERROR_SIGNATURE: &str = "Error(string)";
pub const PANIC_SIGNATURE: &str = "Panic(uint256)";

/// Why a call reverted, decoded from its output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RevertReason {
    /// `revert("...")` / `require(cond, "...")`
    Error(String),
    /// Compiler inserted check (`assert`, overflow, bounds...)
    Panic { code: u64, description: &'static str },
    /// Custom error declared in the contract ABI
    Custom { name: String, args: Vec<AbiValue> },
    /// Output that matched no known selector
    Unknown(Vec<u8>),
}

impl RevertReason {
    /// Human readable message.
    pub fn message(&self) -> String {
        match self {
            RevertReason::Error(msg) => msg.clone(),
            RevertReason::Panic { code, description } => format!("panic 0x{:02x}: {}", code, description),
            RevertReason::Custom { name, args } => {
                let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                format!("{}({})", name, args.join(", "))
            }
            RevertReason::Unknown(raw) => format!("0x{}", hex::encode(raw)),
        }
    }
}

impl fmt::Display for RevertReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Description of a Solidity panic code.
pub fn panic_description(code: u64) -> &'static str {
    match code {
        0x00 => "generic compiler panic",
        0x01 => "assertion failed",
        0x11 => "arithmetic overflow or underflow",
        0x12 => "division or modulo by zero",
        0x21 => "invalid enum conversion",
        0x22 => "invalid storage byte array encoding",
        0x31 => "pop on empty array",
        0x32 => "array index out of bounds",
        0x41 => "out of memory",
        0x51 => "call to zero-initialized function",
        _ => "unknown panic code",
    }
}

/// `selector(Error(string)) ++ abi(message)`
pub fn encode_revert_message(suite: &CryptoSuite, message: &str) -> Result<Vec<u8>> {
    let mut out = suite.hash(ERROR_SIGNATURE.as_bytes()).selector().to_vec();
    out.extend(encode(&[AbiValue::string(message)])?);
    Ok(out)
}

/// Decode revert output. Returns `None` for empty output.
///
/// `errors` are the custom errors the contract declares; pass an empty
/// slice when no ABI is at hand.
pub fn decode_revert(suite: &CryptoSuite, output: &[u8], errors: &[ErrorDef]) -> Result<Option<RevertReason>> {
    if output.is_empty() {
        return Ok(None);
    }
    if output.len() < 4 {
        return Ok(Some(RevertReason::Unknown(output.to_vec())));
    }
    let (selector, body) = output.split_at(4);

    if selector == suite.hash(ERROR_SIGNATURE.as_bytes()).selector() {
        let values = decode(&[AbiType::String], body)?;
        let message = values
            .into_iter()
            .next()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        return Ok(Some(RevertReason::Error(message)));
    }

    if selector == suite.hash(PANIC_SIGNATURE.as_bytes()).selector() {
        let values = decode(&[AbiType::Uint(256)], body)?;
        let code = values.first().and_then(AbiValue::as_biguint).and_then(|c| c.to_u64());
        return Ok(Some(match code {
            Some(code) => RevertReason::Panic {
                code,
                description: panic_description(code),
            },
            None => RevertReason::Unknown(output.to_vec()),
        }));
    }

    for error in errors {
        if selector == suite.hash(error.signature().as_bytes()).selector() {
            let args = decode(&error.input_types(), body)?;
            return Ok(Some(RevertReason::Custom {
                name: error.name.clone(),
                args,
            }));
        }
    }

    Ok(Some(RevertReason::Unknown(output.to_vec())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_revert_test_string() {
        let suite = CryptoSuite::ecdsa();
        let encoded = encode_revert_message(&suite, "test string").unwrap();
        assert_eq!(&encoded[..4], &hex!("08c379a0"));
        assert_eq!(
            hex::encode(&encoded[4..]),
            concat!(
                "0000000000000000000000000000000000000000000000000000000000000020",
                "000000000000000000000000000000000000000000000000000000000000000b",
                "7465737420737472696e67000000000000000000000000000000000000000000",
            )
        );
        assert_eq!(
            decode_revert(&suite, &encoded, &[]).unwrap(),
            Some(RevertReason::Error("test string".into()))
        );
    }

    #[test]
    fn test_decode_panic() {
        let suite = CryptoSuite::ecdsa();
        let mut output = hex!("4e487b71").to_vec();
        output.extend(encode(&[AbiValue::uint256(0x11u8)]).unwrap());
        let reason = decode_revert(&suite, &output, &[]).unwrap().unwrap();
        assert_eq!(
            reason,
            RevertReason::Panic {
                code: 0x11,
                description: "arithmetic overflow or underflow"
            }
        );
        assert_eq!(reason.message(), "panic 0x11: arithmetic overflow or underflow");
    }

    #[test]
    fn test_decode_custom_error() {
        let suite = CryptoSuite::ecdsa();
        let def = ErrorDef::parse("InsufficientBalance(uint256 available, uint256 required)").unwrap();
        let mut output = suite.hash(def.signature().as_bytes()).selector().to_vec();
        output.extend(encode(&[AbiValue::uint256(5u8), AbiValue::uint256(9u8)]).unwrap());

        let reason = decode_revert(&suite, &output, std::slice::from_ref(&def)).unwrap().unwrap();
        assert_eq!(reason.message(), "InsufficientBalance(5, 9)");

        // Without the definition the payload is opaque
        assert!(matches!(
            decode_revert(&suite, &output, &[]).unwrap(),
            Some(RevertReason::Unknown(_))
        ));
    }

    #[test]
    fn test_decode_empty_and_short() {
        let suite = CryptoSuite::ecdsa();
        assert_eq!(decode_revert(&suite, &[], &[]).unwrap(), None);
        assert_eq!(
            decode_revert(&suite, &[1, 2], &[]).unwrap(),
            Some(RevertReason::Unknown(vec![1, 2]))
        );
    }

    #[test]
    fn test_suite_specific_selector() {
        let suite = CryptoSuite::ed25519();
        let encoded = encode_revert_message(&suite, "nope").unwrap();
        assert_ne!(&encoded[..4], &hex!("08c379a0"));
        assert_eq!(
            decode_revert(&suite, &encoded, &[]).unwrap(),
            Some(RevertReason::Error("nope".into()))
        );
    }
}
