//! Contract interaction helpers.

use crate::errors::{Result, SdkError};
use crate::events::EventDecoder;
use crate::receipt::ReceiptParser;
use crate::transaction::TransactionRequest;
use corvid_codec::abi::json_value;
use corvid_codec::{AbiCodec, AbiValue, CodecError, ContractAbi, Function};
use corvid_crypto::CryptoSuite;
use corvid_types::Address;

/// Contract interface.
#[derive(Debug, Clone)]
pub struct Contract {
    codec: AbiCodec,
    abi: ContractAbi,
    address: Option<Address>,
}

impl Contract {
    /// Create new contract interface.
    pub fn new(suite: CryptoSuite, abi: ContractAbi) -> Self {
        Self {
            codec: AbiCodec::new(suite),
            abi,
            address: None,
        }
    }

    /// Create from ABI JSON.
    pub fn from_json(suite: CryptoSuite, json: &str) -> Result<Self> {
        Ok(Self::new(suite, ContractAbi::from_json(json)?))
    }

    /// Bind to a deployed instance.
    pub fn at(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    /// Get contract address.
    pub fn address(&self) -> Option<Address> {
        self.address
    }

    pub fn abi(&self) -> &ContractAbi {
        &self.abi
    }

    pub fn codec(&self) -> &AbiCodec {
        &self.codec
    }

    /// Pick the overload of `name` whose inputs match `args`.
    pub fn function(&self, name: &str, args: &[AbiValue]) -> Result<&Function> {
        self.abi
            .overloads(name)
            .iter()
            .find(|f| {
                f.inputs.len() == args.len()
                    && f.inputs.iter().zip(args).all(|(p, a)| p.kind.same_shape(&a.abi_type()))
            })
            .ok_or_else(|| no_overload(name, args.len()))
    }

    /// Encode a call from typed values.
    pub fn encode_call(&self, name: &str, args: &[AbiValue]) -> Result<Vec<u8>> {
        let function = self.function(name, args)?;
        Ok(self.codec.encode_call(function, args)?)
    }

    /// Encode a call from a JSON array of arguments. The overload is chosen
    /// by argument count.
    pub fn encode_call_json(&self, name: &str, args: &serde_json::Value) -> Result<Vec<u8>> {
        let count = args.as_array().map(Vec::len).unwrap_or(0);
        let function = self
            .abi
            .overloads(name)
            .iter()
            .find(|f| f.inputs.len() == count)
            .ok_or_else(|| no_overload(name, count))?;
        let values = json_value::values_from_json(&function.input_types(), args)?;
        Ok(self.codec.encode_call(function, &values)?)
    }

    /// Decode the return data of the first function named `name`.
    pub fn decode_output(&self, name: &str, data: &[u8]) -> Result<Vec<AbiValue>> {
        let function = self.abi.function(name)?;
        Ok(self.codec.decode_function_result(function, data)?)
    }

    /// Transaction request calling `name` on the bound instance.
    pub fn call_request(&self, name: &str, args: &[AbiValue]) -> Result<TransactionRequest> {
        let address = self.address.ok_or_else(|| {
            SdkError::InvalidTransaction("contract has no address; bind it with `at`".into())
        })?;
        Ok(TransactionRequest::call(address, self.encode_call(name, args)?))
    }

    /// Receipt parser that also knows this contract's custom errors.
    pub fn receipt_parser(&self) -> ReceiptParser {
        ReceiptParser::new(self.codec.suite()).with_errors(self.abi.errors.clone())
    }

    pub fn event_decoder(&self) -> EventDecoder {
        EventDecoder::new(self.codec, &self.abi)
    }
}

fn no_overload(name: &str, count: usize) -> SdkError {
    SdkError::Codec(CodecError::InvalidSignature(format!(
        "no overload of {} takes {} matching arguments",
        name, count
    )))
}

/// Contract builder for deployment.
#[derive(Debug, Clone)]
pub struct ContractBuilder {
    bytecode: Vec<u8>,
    args: Vec<AbiValue>,
}

impl ContractBuilder {
    /// Create new builder with bytecode.
    pub fn new(bytecode: Vec<u8>) -> Self {
        Self {
            bytecode,
            args: vec![],
        }
    }

    /// Set constructor arguments.
    pub fn with_args(mut self, args: Vec<AbiValue>) -> Self {
        self.args = args;
        self
    }

    /// Deployment request: bytecode followed by the encoded constructor
    /// arguments, with no recipient.
    pub fn deploy_request(&self, contract: &Contract) -> Result<TransactionRequest> {
        let init_code = contract.codec.encode_constructor(
            &self.bytecode,
            contract.abi.constructor.as_ref(),
            &self.args,
        )?;
        Ok(TransactionRequest::deploy(init_code))
    }
}
