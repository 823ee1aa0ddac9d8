//! Receipt interpretation.
//!
//! A receipt with status 0 succeeded. Any other status becomes a
//! [`ContractError`] whose message is the decoded revert reason when the
//! output carries one, and the status table entry otherwise.

use crate::errors::{ContractError, Result};
use corvid_codec::abi::RevertReason;
use corvid_codec::{AbiCodec, ErrorDef};
use corvid_crypto::CryptoSuite;
use corvid_types::TransactionReceipt;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Status code of a successful transaction.
pub const STATUS_SUCCESS: i32 = 0;

/// Status code of a transaction that executed a revert.
pub const STATUS_REVERT: i32 = 22;

static STATUS_MESSAGES: Lazy<HashMap<i32, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (0, "Success"),
        (1, "Unknown error"),
        (2, "Bad RLP"),
        (3, "Invalid transaction format"),
        (4, "Out of gas (intrinsic)"),
        (5, "Invalid signature"),
        (6, "Invalid random id"),
        (7, "Not enough cash"),
        (8, "Out of gas (base)"),
        (9, "Block gas limit reached"),
        (10, "Bad instruction"),
        (11, "Bad jump destination"),
        (12, "Out of gas"),
        (13, "Out of stack"),
        (14, "Stack underflow"),
        (15, "Random id check failed"),
        (16, "Block limit check failed"),
        (17, "Filter check failed"),
        (18, "No deploy permission"),
        (19, "No call permission"),
        (20, "No transaction permission"),
        (21, "Precompiled contract error"),
        (22, "Revert instruction"),
        (23, "Invalid zero signature format"),
        (24, "Address already used"),
        (25, "Permission denied"),
        (26, "Call address error"),
        (27, "Gas overflow"),
        (28, "Transaction pool is full"),
        (29, "Contract frozen"),
        (30, "Account frozen"),
        (10000, "Transaction already known"),
        (10001, "Transaction already in chain"),
        (10002, "Invalid chain id"),
        (10003, "Invalid group id"),
        (10004, "Request does not belong to this group"),
        (10005, "Malformed transaction"),
        (10006, "Group memory limit exceeded"),
    ])
});

/// Message for a receipt status code.
pub fn status_message(status: i32) -> String {
    STATUS_MESSAGES
        .get(&status)
        .map(|msg| msg.to_string())
        .unwrap_or_else(|| format!("Unknown receipt status {}", status))
}

/// Turns receipts into results.
#[derive(Debug, Clone, Default)]
pub struct ReceiptParser {
    codec: AbiCodec,
    errors: Vec<ErrorDef>,
}

impl ReceiptParser {
    pub fn new(suite: CryptoSuite) -> Self {
        Self {
            codec: AbiCodec::new(suite),
            errors: Vec::new(),
        }
    }

    /// Also recognise these custom errors in revert payloads.
    pub fn with_errors(mut self, errors: Vec<ErrorDef>) -> Self {
        self.errors = errors;
        self
    }

    /// Succeed for status 0, fail with a [`ContractError`] otherwise.
    pub fn parse(&self, receipt: &TransactionReceipt) -> std::result::Result<(), ContractError> {
        if receipt.is_success() {
            return Ok(());
        }
        Err(self.contract_error(receipt))
    }

    /// Like [`ReceiptParser::parse`], then extract a return code from a
    /// successful receipt's output with `decode`.
    ///
    /// `decode` is only called when there is output; `""` and `"0x"` give
    /// `Ok(None)`.
    pub fn parse_with<T, F>(&self, receipt: &TransactionReceipt, decode: F) -> Result<Option<T>>
    where
        F: FnOnce(&[u8]) -> Result<T>,
    {
        self.parse(receipt)?;
        if receipt.has_empty_output() {
            return Ok(None);
        }
        let output = receipt.output_bytes()?;
        decode(&output).map(Some)
    }

    /// Decoded revert reason of a failed receipt, if its output holds one.
    pub fn revert_reason(&self, receipt: &TransactionReceipt) -> Option<RevertReason> {
        if receipt.has_empty_output() {
            return None;
        }
        let output = match receipt.output_bytes() {
            Ok(output) => output,
            Err(err) => {
                tracing::debug!(error = %err, "Receipt output is not hex");
                return None;
            }
        };
        match self.codec.decode_revert(&output, &self.errors) {
            Ok(Some(RevertReason::Unknown(_))) | Ok(None) => None,
            Ok(Some(reason)) => Some(reason),
            Err(err) => {
                tracing::debug!(error = %err, "Revert payload did not decode");
                None
            }
        }
    }

    fn contract_error(&self, receipt: &TransactionReceipt) -> ContractError {
        let message = match self.revert_reason(receipt) {
            Some(reason) => reason.message(),
            None => status_message(receipt.status),
        };
        tracing::debug!(
            tx_hash = %receipt.transaction_hash,
            status = receipt.status,
            message = %message,
            "Transaction failed"
        );
        ContractError::new(receipt.status, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SdkError;
    use corvid_types::Hash;
    use std::cell::Cell;

    const TEST_STRING_REVERT: &str = concat!(
        "0x08c379a0",
        "0000000000000000000000000000000000000000000000000000000000000020",
        "000000000000000000000000000000000000000000000000000000000000000b",
        "7465737420737472696e67000000000000000000000000000000000000000000"
    );

    fn parser() -> ReceiptParser {
        ReceiptParser::new(CryptoSuite::ecdsa())
    }

    #[test]
    fn test_success_with_empty_output() {
        let receipt = TransactionReceipt::new(Hash::ZERO, 0, "0x");
        assert_eq!(parser().parse(&receipt), Ok(()));
    }

    #[test]
    fn test_revert_reason_becomes_message() {
        let receipt = TransactionReceipt::new(Hash::ZERO, STATUS_REVERT, TEST_STRING_REVERT);
        let err = parser().parse(&receipt).unwrap_err();
        assert_eq!(err, ContractError::new(22, "test string"));
    }

    #[test]
    fn test_status_table_fallback() {
        let receipt = TransactionReceipt::new(Hash::ZERO, 16, "0x");
        assert_eq!(
            parser().parse(&receipt).unwrap_err(),
            ContractError::new(16, "Block limit check failed")
        );

        // output that is not a revert payload
        let receipt = TransactionReceipt::new(Hash::ZERO, 22, "0xdeadbeef");
        assert_eq!(parser().parse(&receipt).unwrap_err().message, "Revert instruction");

        let receipt = TransactionReceipt::new(Hash::ZERO, 4242, "");
        assert_eq!(
            parser().parse(&receipt).unwrap_err().message,
            "Unknown receipt status 4242"
        );
    }

    #[test]
    fn test_custom_error_reason() {
        let error = ErrorDef::parse("InsufficientBalance(uint256,uint256)").unwrap();
        let codec = AbiCodec::new(CryptoSuite::ecdsa());
        let mut output = codec.method_id(&error.signature()).unwrap().to_vec();
        output.extend(
            corvid_codec::abi::encode(&[
                corvid_codec::AbiValue::uint256(5u8),
                corvid_codec::AbiValue::uint256(10u8),
            ])
            .unwrap(),
        );
        let receipt = TransactionReceipt::new(Hash::ZERO, 22, format!("0x{}", hex::encode(output)));

        let err = parser().with_errors(vec![error]).parse(&receipt).unwrap_err();
        assert_eq!(err.message, "InsufficientBalance(5, 10)");
    }

    #[test]
    fn test_decode_fn_skipped_for_empty_marker() {
        let calls = Cell::new(0);
        let decode = |bytes: &[u8]| {
            calls.set(calls.get() + 1);
            Ok(bytes.len())
        };

        for empty in ["", "0x", "0X"] {
            let receipt = TransactionReceipt::new(Hash::ZERO, 0, empty);
            assert_eq!(parser().parse_with(&receipt, decode).unwrap(), None);
        }
        assert_eq!(calls.get(), 0);

        let receipt = TransactionReceipt::new(Hash::ZERO, 0, "0x0102");
        assert_eq!(parser().parse_with(&receipt, decode).unwrap(), Some(2));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_decode_fn_not_called_on_failure() {
        let receipt = TransactionReceipt::new(Hash::ZERO, 16, "0x01");
        let result = parser().parse_with(&receipt, |_| -> Result<()> { panic!("must not decode") });
        assert!(matches!(result, Err(SdkError::Contract(ContractError { code: 16, .. }))));
    }

    #[test]
    fn test_decode_fn_error_propagates() {
        let receipt = TransactionReceipt::new(Hash::ZERO, 0, "0x01");
        let result: Result<Option<()>> = parser().parse_with(&receipt, |_| {
            Err(SdkError::Codec(corvid_codec::CodecError::MalformedEncoding("bad".into())))
        });
        assert!(matches!(result, Err(SdkError::Codec(_))));
    }
}
