use super::decode::{decode, decode_single};
use super::encode::encode_params;
use super::revert::{self, RevertReason};
use super::signature::{canonicalize, Constructor, ErrorDef, Event, Function};
use super::types::AbiType;
use super::value::AbiValue;
use crate::error::{CodecError, Result};
use corvid_crypto::CryptoSuite;
use corvid_types::{Hash, Log};

/// Solidity ABI codec bound to a crypto suite.
///
/// Selectors and topics are hashes of canonical signatures, so they depend
/// on the suite the chain runs with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AbiCodec {
    suite: CryptoSuite,
}

impl AbiCodec {
    pub fn new(suite: CryptoSuite) -> Self {
        Self { suite }
    }

    pub fn suite(&self) -> CryptoSuite {
        self.suite
    }

    /// First four bytes of the hash of the canonical signature.
    pub fn method_id(&self, signature: &str) -> Result<[u8; 4]> {
        let canonical = canonicalize(signature)?;
        Ok(self.suite.hash(canonical.as_bytes()).selector())
    }

    pub fn function_selector(&self, function: &Function) -> [u8; 4] {
        self.suite.hash(function.signature().as_bytes()).selector()
    }

    /// Full hash of the canonical event signature (topic 0).
    pub fn event_topic(&self, signature: &str) -> Result<Hash> {
        let canonical = canonicalize(signature)?;
        Ok(self.suite.hash(canonical.as_bytes()))
    }

    pub fn event_signature_hash(&self, event: &Event) -> Hash {
        self.suite.hash(event.signature().as_bytes())
    }

    /// `selector ++ abi(args)` for a textual signature.
    pub fn encode_function_call(&self, signature: &str, args: &[AbiValue]) -> Result<Vec<u8>> {
        let function = Function::parse(signature)?;
        self.encode_call(&function, args)
    }

    pub fn encode_call(&self, function: &Function, args: &[AbiValue]) -> Result<Vec<u8>> {
        for param in &function.inputs {
            param.kind.ensure_solidity()?;
        }
        tracing::trace!(function = %function.signature(), args = args.len(), "Encoding call");
        let mut out = self.function_selector(function).to_vec();
        out.extend(encode_params(&function.input_types(), args)?);
        Ok(out)
    }

    /// Decode call data produced by [`encode_call`](Self::encode_call).
    pub fn decode_call(&self, function: &Function, data: &[u8]) -> Result<Vec<AbiValue>> {
        if data.len() < 4 {
            return Err(CodecError::TruncatedInput {
                needed: 4,
                available: data.len(),
            });
        }
        let (selector, body) = data.split_at(4);
        if selector != self.function_selector(function) {
            return Err(CodecError::malformed(format!(
                "selector 0x{} does not match {}",
                hex::encode(selector),
                function.signature()
            )));
        }
        decode(&function.input_types(), body)
    }

    /// Decode the return data of a call.
    pub fn decode_function_result(&self, function: &Function, data: &[u8]) -> Result<Vec<AbiValue>> {
        decode(&function.output_types(), data)
    }

    /// Deployment payload: `bytecode ++ abi(args)`.
    pub fn encode_constructor(
        &self,
        bytecode: &[u8],
        constructor: Option<&Constructor>,
        args: &[AbiValue],
    ) -> Result<Vec<u8>> {
        let types = constructor.map(Constructor::input_types).unwrap_or_default();
        let mut out = bytecode.to_vec();
        out.extend(encode_params(&types, args)?);
        Ok(out)
    }

    /// Decode an event from its topics and data.
    ///
    /// Values come back in declaration order. Indexed parameters of
    /// reference type are only available as their 32-byte hash and are
    /// returned as `bytes32`.
    pub fn decode_event(&self, event: &Event, topics: &[Hash], data: &[u8]) -> Result<Vec<AbiValue>> {
        let mut topics = topics.iter();
        if !event.anonymous {
            let first = topics
                .next()
                .ok_or_else(|| CodecError::malformed("log has no topics"))?;
            if *first != self.event_signature_hash(event) {
                return Err(CodecError::malformed(format!(
                    "topic {} does not match {}",
                    first,
                    event.signature()
                )));
            }
        }

        let indexed = event.indexed_inputs().count();
        if topics.len() != indexed {
            return Err(CodecError::malformed(format!(
                "{} expects {} indexed topics, got {}",
                event.signature(),
                indexed,
                topics.len()
            )));
        }

        let mut data_values = decode(&event.data_types(), data)?.into_iter();
        let mut values = Vec::with_capacity(event.inputs.len());
        for param in &event.inputs {
            let value = if param.indexed {
                let topic = topics
                    .next()
                    .ok_or_else(|| CodecError::malformed("missing indexed topic"))?;
                if is_value_type(&param.kind) {
                    decode_single(&param.kind, topic.as_bytes())?
                } else {
                    AbiValue::FixedBytes(topic.as_bytes().to_vec())
                }
            } else {
                data_values
                    .next()
                    .ok_or_else(|| CodecError::malformed("missing event data value"))?
            };
            values.push(value);
        }
        Ok(values)
    }

    pub fn decode_log(&self, event: &Event, log: &Log) -> Result<Vec<AbiValue>> {
        self.decode_event(event, &log.topics, &log.data)
    }

    pub fn encode_revert(&self, message: &str) -> Result<Vec<u8>> {
        revert::encode_revert_message(&self.suite, message)
    }

    pub fn decode_revert(&self, output: &[u8], errors: &[ErrorDef]) -> Result<Option<RevertReason>> {
        revert::decode_revert(&self.suite, output, errors)
    }
}

/// Value types are stored in topics directly; everything else is hashed.
fn is_value_type(ty: &AbiType) -> bool {
    !matches!(
        ty,
        AbiType::Bytes | AbiType::String | AbiType::Array(_) | AbiType::FixedArray(..) | AbiType::Tuple(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::encode::encode;
    use corvid_types::Address;
    use hex_literal::hex;

    fn codec() -> AbiCodec {
        AbiCodec::new(CryptoSuite::ecdsa())
    }

    #[test]
    fn test_method_ids() {
        assert_eq!(codec().method_id("baz(uint32,fixed72x16)").unwrap(), hex!("257e44f7"));
        assert_eq!(codec().method_id("baz(uint32,bool)").unwrap(), hex!("cdcd77c0"));
        assert_eq!(
            codec().method_id("transfer(address to, uint amount)").unwrap(),
            hex!("a9059cbb")
        );
    }

    #[test]
    fn test_event_topic() {
        assert_eq!(
            codec().event_topic("Notify(uint256,uint256)").unwrap().as_bytes(),
            &hex!("71e71a8458267085d5ab16980fd5f114d2d37f232479c245d523ce8d23ca40ed")
        );
    }

    #[test]
    fn test_encode_function_call() {
        let data = codec()
            .encode_function_call("baz(uint32,bool)", &[AbiValue::uint(32, 69u32).unwrap(), AbiValue::Bool(true)])
            .unwrap();
        assert_eq!(
            hex::encode(data),
            concat!(
                "cdcd77c0",
                "0000000000000000000000000000000000000000000000000000000000000045",
                "0000000000000000000000000000000000000000000000000000000000000001"
            )
        );
    }

    #[test]
    fn test_fixed_point_rejected_on_solidity_path() {
        let arg = AbiValue::fixed(72, 16, true, "1.25").unwrap();
        assert_eq!(
            codec()
                .encode_function_call("baz(uint32,fixed72x16)", &[AbiValue::uint(32, 1u32).unwrap(), arg])
                .unwrap_err(),
            CodecError::UnsupportedType("fixed72x16".into())
        );
    }

    #[test]
    fn test_argument_count_mismatch() {
        assert_eq!(
            codec().encode_function_call("f(uint256,bool)", &[AbiValue::Bool(true)]).unwrap_err(),
            CodecError::ArgumentCountMismatch { expected: 2, actual: 1 }
        );
    }

    #[test]
    fn test_call_roundtrip() {
        let f = Function::parse("set(string key, bytes value)").unwrap();
        let args = vec![AbiValue::string("k"), AbiValue::Bytes(vec![1, 2, 3])];
        let data = codec().encode_call(&f, &args).unwrap();
        assert_eq!(codec().decode_call(&f, &data).unwrap(), args);

        let other = Function::parse("get(string)").unwrap();
        assert!(matches!(
            codec().decode_call(&other, &data),
            Err(CodecError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn test_constructor_payload() {
        let ctor = Constructor {
            inputs: vec![super::super::Param::new("supply", AbiType::Uint(256))],
            payable: false,
        };
        let payload = codec()
            .encode_constructor(&[0x60, 0x80], Some(&ctor), &[AbiValue::uint256(1000u16)])
            .unwrap();
        assert_eq!(&payload[..2], &[0x60, 0x80]);
        assert_eq!(payload.len(), 2 + 32);

        assert_eq!(codec().encode_constructor(&[0xfe], None, &[]).unwrap(), vec![0xfe]);
    }

    #[test]
    fn test_decode_event_with_indexed() {
        let codec = codec();
        let event = Event::parse("Transfer(address indexed from, string indexed memo, uint256 value)").unwrap();
        let from = Address::from_bytes([0x11; 20]);

        let mut from_topic = [0u8; 32];
        from_topic[12..].copy_from_slice(from.as_bytes());
        let memo_hash = codec.suite().hash(b"hi");
        let topics = vec![
            codec.event_signature_hash(&event),
            Hash::from_bytes(from_topic),
            memo_hash,
        ];
        let data = encode(&[AbiValue::uint256(7u8)]).unwrap();

        let values = codec.decode_event(&event, &topics, &data).unwrap();
        assert_eq!(
            values,
            vec![
                AbiValue::Address(from),
                AbiValue::FixedBytes(memo_hash.as_bytes().to_vec()),
                AbiValue::uint256(7u8),
            ]
        );

        assert!(codec.decode_event(&event, &topics[..2], &data).is_err());
        let wrong = vec![Hash::ZERO, topics[1], topics[2]];
        assert!(codec.decode_event(&event, &wrong, &data).is_err());
    }

    #[test]
    fn test_notify_event_data() {
        let codec = codec();
        let event = Event::parse("Notify(uint256 a, uint256 b)").unwrap();
        let data = encode(&[AbiValue::uint256(1u8), AbiValue::uint256(2u8)]).unwrap();
        let topic = codec.event_topic("Notify(uint256,uint256)").unwrap();
        let log = Log::new(Address::ZERO, vec![topic], data);
        assert_eq!(
            codec.decode_log(&event, &log).unwrap(),
            vec![AbiValue::uint256(1u8), AbiValue::uint256(2u8)]
        );
    }
}
