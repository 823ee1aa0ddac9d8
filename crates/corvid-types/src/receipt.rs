use crate::address::Address;
use crate::error::{decode_hex, TypesError};
use crate::hash::Hash;
use std::fmt;

/// Output value the node reports for a transaction that returned nothing.
pub const EMPTY_OUTPUT: &str = "0x";

/// Result of executing a transaction, as reported by a node.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TransactionReceipt {
    /// Hash of the transaction
    pub transaction_hash: Hash,
    /// Number of the block containing this TX
    #[cfg_attr(feature = "serde", serde(with = "crate::serialization::quantity", default))]
    pub block_number: u64,
    /// Address of the sender
    #[cfg_attr(feature = "serde", serde(default))]
    pub from: Address,
    /// Address of the recipient (None for contract creation)
    #[cfg_attr(feature = "serde", serde(with = "crate::serialization::opt_address", default))]
    pub to: Option<Address>,
    /// Address of created contract (if contract creation)
    #[cfg_attr(feature = "serde", serde(with = "crate::serialization::opt_address", default))]
    pub contract_address: Option<Address>,
    /// Execution status, 0 on success
    #[cfg_attr(feature = "serde", serde(with = "crate::serialization::status"))]
    pub status: i32,
    /// Hex-encoded return data or revert payload
    #[cfg_attr(feature = "serde", serde(default = "default_output"))]
    pub output: String,
    /// Gas used by this transaction
    #[cfg_attr(feature = "serde", serde(with = "crate::serialization::quantity", default))]
    pub gas_used: u64,
    /// Logs emitted during execution
    #[cfg_attr(feature = "serde", serde(default))]
    pub logs: Vec<Log>,
    /// Node-side status message, if any
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub message: Option<String>,
}

#[cfg(feature = "serde")]
fn default_output() -> String {
    EMPTY_OUTPUT.to_string()
}

impl Default for TransactionReceipt {
    fn default() -> Self {
        Self {
            transaction_hash: Hash::ZERO,
            block_number: 0,
            from: Address::ZERO,
            to: None,
            contract_address: None,
            status: 0,
            output: EMPTY_OUTPUT.to_string(),
            gas_used: 0,
            logs: Vec::new(),
            message: None,
        }
    }
}

impl TransactionReceipt {
    /// Create a new receipt
    pub fn new(transaction_hash: Hash, status: i32, output: impl Into<String>) -> Self {
        Self {
            transaction_hash,
            status,
            output: output.into(),
            ..Self::default()
        }
    }

    /// Check if transaction succeeded
    pub fn is_success(&self) -> bool {
        self.status == 0
    }

    /// Check if transaction failed
    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// True when the output is the canonical empty marker (or blank)
    pub fn has_empty_output(&self) -> bool {
        let trimmed = self.output.trim();
        trimmed.is_empty() || trimmed.eq_ignore_ascii_case(EMPTY_OUTPUT)
    }

    /// Decode the hex output into raw bytes
    pub fn output_bytes(&self) -> Result<Vec<u8>, TypesError> {
        if self.has_empty_output() {
            return Ok(Vec::new());
        }
        decode_hex(self.output.trim())
    }

    /// Add a log
    pub fn add_log(&mut self, log: Log) {
        self.logs.push(log);
    }
}

/// Event log emitted by a smart contract.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Log {
    /// Address of the contract that emitted this log
    pub address: Address,
    /// Indexed topics (max 4, first is usually the event signature hash)
    pub topics: Vec<Hash>,
    /// Non-indexed event data
    #[cfg_attr(feature = "serde", serde(with = "crate::serialization::hex_bytes"))]
    pub data: Vec<u8>,
}

impl Log {
    /// Create a new log
    pub fn new(address: Address, topics: Vec<Hash>, data: Vec<u8>) -> Self {
        Self {
            address,
            topics,
            data,
        }
    }

    /// Get the event signature (first topic)
    pub fn event_signature(&self) -> Option<&Hash> {
        self.topics.first()
    }

    /// Check if log has a specific topic
    pub fn has_topic(&self, topic: &Hash) -> bool {
        self.topics.contains(topic)
    }
}

impl fmt::Display for TransactionReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Receipt {{ tx: {}, status: {}, gas_used: {} }}",
            self.transaction_hash, self.status, self.gas_used
        )
    }
}

impl fmt::Display for Log {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Log {{ address: {}, topics: {}, data: {} bytes }}",
            self.address,
            self.topics.len(),
            self.data.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_status() {
        let ok = TransactionReceipt::new(Hash::ZERO, 0, "0x");
        assert!(ok.is_success());
        assert!(ok.has_empty_output());
        assert!(ok.output_bytes().unwrap().is_empty());

        let failed = TransactionReceipt::new(Hash::ZERO, 16, "0x");
        assert!(failed.is_failure());
    }

    #[test]
    fn test_receipt_output_bytes() {
        let receipt = TransactionReceipt::new(Hash::ZERO, 0, "0x0102ff");
        assert!(!receipt.has_empty_output());
        assert_eq!(receipt.output_bytes().unwrap(), vec![1, 2, 0xff]);

        let blank = TransactionReceipt::new(Hash::ZERO, 0, "");
        assert!(blank.has_empty_output());
    }

    #[test]
    fn test_log_topics() {
        let topic = Hash::from_bytes([1u8; 32]);
        let log = Log::new(Address::ZERO, vec![topic], vec![1, 2, 3]);
        assert_eq!(log.event_signature(), Some(&topic));
        assert!(log.has_topic(&topic));
        assert!(!log.has_topic(&Hash::ZERO));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_receipt_from_node_json() {
        let json = r#"{
            "transactionHash": "0x1111111111111111111111111111111111111111111111111111111111111111",
            "blockNumber": "0x1a",
            "from": "0x2222222222222222222222222222222222222222",
            "to": "",
            "contractAddress": "0x3333333333333333333333333333333333333333",
            "status": "0x16",
            "output": "0x08c379a0",
            "gasUsed": 21000,
            "logs": [{
                "address": "0x3333333333333333333333333333333333333333",
                "topics": ["0x71e71a8458267085d5ab16980fd5f114d2d37f232479c245d523ce8d23ca40ed"],
                "data": "0x0001"
            }]
        }"#;
        let receipt: TransactionReceipt = serde_json::from_str(json).unwrap();
        assert_eq!(receipt.block_number, 26);
        assert_eq!(receipt.status, 22);
        assert_eq!(receipt.gas_used, 21000);
        assert_eq!(receipt.to, None);
        assert_eq!(
            receipt.contract_address,
            Some(Address::from_bytes([0x33; 20]))
        );
        assert_eq!(receipt.logs[0].data, vec![0, 1]);

        let encoded = serde_json::to_string(&receipt).unwrap();
        let back: TransactionReceipt = serde_json::from_str(&encoded).unwrap();
        assert_eq!(back, receipt);
    }
}
