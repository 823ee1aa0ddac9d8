//! Event log decoding.

use crate::errors::Result;
use corvid_codec::{AbiCodec, AbiValue, ContractAbi, Event};
use corvid_types::{Address, Hash, Log};
use std::collections::HashMap;

/// A log decoded against its event definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEvent {
    /// Event name
    pub name: String,
    /// Emitting contract
    pub address: Address,
    /// Parameters in declaration order
    pub params: Vec<(String, AbiValue)>,
}

impl DecodedEvent {
    /// Look up a parameter by name.
    pub fn param(&self, name: &str) -> Option<&AbiValue> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// Matches logs to the non-anonymous events of an ABI by their first topic.
#[derive(Debug, Clone)]
pub struct EventDecoder {
    codec: AbiCodec,
    events: HashMap<Hash, Event>,
}

impl EventDecoder {
    pub fn new(codec: AbiCodec, abi: &ContractAbi) -> Self {
        let events = abi
            .iter_events()
            .filter(|event| !event.anonymous)
            .map(|event| (codec.event_signature_hash(event), event.clone()))
            .collect();
        Self { codec, events }
    }

    /// Topic a log of `event` carries first.
    pub fn topic(&self, event: &Event) -> Hash {
        self.codec.event_signature_hash(event)
    }

    /// Decode a log. Logs of unknown events give `Ok(None)`; logs that
    /// match an event but do not decode are errors.
    pub fn decode(&self, log: &Log) -> Result<Option<DecodedEvent>> {
        let event = match log.event_signature().and_then(|topic| self.events.get(topic)) {
            Some(event) => event,
            None => return Ok(None),
        };
        let values = self.codec.decode_log(event, log)?;
        let params = event
            .inputs
            .iter()
            .map(|param| param.name.clone())
            .zip(values)
            .collect();
        Ok(Some(DecodedEvent {
            name: event.name.clone(),
            address: log.address,
            params,
        }))
    }

    /// Decode every log that belongs to a known event.
    pub fn decode_all(&self, logs: &[Log]) -> Result<Vec<DecodedEvent>> {
        let mut decoded = Vec::new();
        for log in logs {
            if let Some(event) = self.decode(log)? {
                decoded.push(event);
            }
        }
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corvid_crypto::CryptoSuite;

    const ABI: &str = r#"[
        {"type":"event","name":"Transfer","anonymous":false,"inputs":[
            {"indexed":true,"name":"from","type":"address"},
            {"indexed":true,"name":"to","type":"address"},
            {"indexed":false,"name":"value","type":"uint256"}]}
    ]"#;

    fn word_of(address: Address) -> Hash {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(address.as_bytes());
        Hash::from_bytes(word)
    }

    #[test]
    fn test_decode_transfer_log() {
        let codec = AbiCodec::new(CryptoSuite::ecdsa());
        let abi = ContractAbi::from_json(ABI).unwrap();
        let decoder = EventDecoder::new(codec, &abi);

        let from = Address::from_bytes([0x01; 20]);
        let to = Address::from_bytes([0x02; 20]);
        let topic = decoder.topic(abi.event("Transfer").unwrap());
        let log = Log::new(
            Address::from_bytes([0xcc; 20]),
            vec![topic, word_of(from), word_of(to)],
            corvid_codec::abi::encode(&[AbiValue::uint256(1000u32)]).unwrap(),
        );

        let event = decoder.decode(&log).unwrap().unwrap();
        assert_eq!(event.name, "Transfer");
        assert_eq!(event.address, Address::from_bytes([0xcc; 20]));
        assert_eq!(event.param("from"), Some(&AbiValue::Address(from)));
        assert_eq!(event.param("to"), Some(&AbiValue::Address(to)));
        assert_eq!(event.param("value"), Some(&AbiValue::uint256(1000u32)));
    }

    #[test]
    fn test_unknown_and_broken_logs() {
        let abi = ContractAbi::from_json(ABI).unwrap();
        let decoder = EventDecoder::new(AbiCodec::new(CryptoSuite::ecdsa()), &abi);

        let unknown = Log::new(Address::ZERO, vec![Hash::from_bytes([9u8; 32])], vec![]);
        let untopiced = Log::new(Address::ZERO, vec![], vec![]);
        assert_eq!(decoder.decode_all(&[unknown, untopiced]).unwrap(), vec![]);

        // right topic, missing indexed topics
        let topic = decoder.topic(abi.event("Transfer").unwrap());
        let broken = Log::new(Address::ZERO, vec![topic], vec![]);
        assert!(decoder.decode(&broken).is_err());
    }
}
