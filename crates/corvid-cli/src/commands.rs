//! CLI command implementations.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use corvid_codec::abi::{self, json_value};
use corvid_codec::scale::compact;
use corvid_codec::{AbiCodec, AbiType, ContractAbi, Function, RlpItem, ScaleCodec};
use corvid_sdk::transaction::decode_and_verify;
use corvid_sdk::{
    HttpRemoteSigner, KeyPairSigner, RemoteSigner, SdkConfig, TransactionPipeline,
    TransactionRequest,
};
use corvid_types::Address;
use num_bigint::{BigInt, BigUint};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::output::{from_hex, rlp_json, to_hex, transaction_json};

/// Main CLI.
#[derive(Parser, Debug)]
#[command(name = "corvid")]
#[command(about = "Corvid codec and transaction tool")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// SDK config file (TOML)
    #[arg(short, long, global = true, env = "CORVID_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `corvid_sdk=debug`
    #[arg(long, global = true, env = "CORVID_LOG", default_value = "warn")]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the 4-byte selector of a function signature
    MethodId {
        /// e.g. `transfer(address,uint256)`
        signature: String,
    },
    /// Print the topic hash of an event signature
    EventTopic {
        /// e.g. `Transfer(address,address,uint256)`
        signature: String,
    },
    /// ABI encode a function call
    Encode {
        /// Function signature
        signature: String,
        /// Arguments as a JSON array
        #[arg(default_value = "[]")]
        args: String,
        /// Omit the selector
        #[arg(long)]
        params_only: bool,
    },
    /// ABI decode data
    Decode {
        /// Comma separated types, e.g. `uint256,string`
        types: String,
        /// Hex data
        data: String,
        /// Skip a leading 4-byte selector
        #[arg(long)]
        skip_selector: bool,
    },
    /// Encode a call for the WASM engine (selector + SCALE arguments)
    ScaleEncode {
        /// Function signature
        signature: String,
        /// Arguments as a JSON array
        #[arg(default_value = "[]")]
        args: String,
    },
    /// Encode a decimal integer in SCALE compact form, or decode hex
    Compact {
        /// Decimal value, or hex with --decode
        value: String,
        #[arg(long)]
        decode: bool,
    },
    /// Print the structure of RLP data
    RlpDecode {
        /// Hex data
        data: String,
    },
    /// Build and sign a transaction
    SignTx {
        /// Private key (hex); remote signers from the config are used without it
        #[arg(long, env = "CORVID_PRIVATE_KEY", hide_env_values = true)]
        key: Option<String>,
        /// Recipient; omit to deploy
        #[arg(long)]
        to: Option<String>,
        /// Call data or init code (hex)
        #[arg(long, default_value = "0x")]
        data: String,
        /// Value (decimal)
        #[arg(long, default_value = "0")]
        value: String,
        /// Current block number
        #[arg(long, default_value_t = 0)]
        block_number: u64,
        /// Extra data (hex)
        #[arg(long)]
        extra_data: Option<String>,
    },
    /// Decode a signed transaction and recover its sender
    DecodeTx {
        /// Hex encoded signed transaction
        data: String,
    },
    /// Decode a revert payload
    Revert {
        /// Hex encoded call output
        output: String,
        /// ABI JSON file with custom error definitions
        #[arg(long)]
        abi: Option<PathBuf>,
    },
}

/// Load the SDK config, or defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<SdkConfig> {
    match path {
        Some(path) => SdkConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(SdkConfig::default()),
    }
}

/// Execute a command and return its output.
pub async fn execute(cmd: Commands, config: &SdkConfig) -> anyhow::Result<Value> {
    let suite = config.suite();
    let codec = AbiCodec::new(suite);
    tracing::debug!(suite = %suite.kind(), "Executing command");

    match cmd {
        Commands::MethodId { signature } => Ok(json!(to_hex(&codec.method_id(&signature)?))),
        Commands::EventTopic { signature } => Ok(json!(codec.event_topic(&signature)?.to_string())),
        Commands::Encode {
            signature,
            args,
            params_only,
        } => {
            let function = Function::parse(&signature)?;
            let values = json_value::values_from_json(&function.input_types(), &parse_args(&args)?)?;
            let data = if params_only {
                abi::encode_params(&function.input_types(), &values)?
            } else {
                codec.encode_call(&function, &values)?
            };
            Ok(json!(to_hex(&data)))
        }
        Commands::Decode {
            types,
            data,
            skip_selector,
        } => {
            let types = parse_types(&types)?;
            let bytes = from_hex(&data)?;
            let body = if skip_selector {
                bytes.get(4..).context("data is shorter than a selector")?
            } else {
                &bytes[..]
            };
            let values = abi::decode(&types, body)?;
            Ok(Value::Array(values.iter().map(json_value::value_to_json).collect()))
        }
        Commands::ScaleEncode { signature, args } => {
            let function = Function::parse(&signature)?;
            let values = json_value::values_from_json(&function.input_types(), &parse_args(&args)?)?;
            Ok(json!(to_hex(&ScaleCodec::new(suite).encode_call(&function, &values)?)))
        }
        Commands::Compact { value, decode } => {
            if decode {
                Ok(json!(compact::decode_compact(&from_hex(&value)?)?.to_string()))
            } else {
                let value = BigInt::from_str(value.trim())
                    .with_context(|| format!("not a decimal integer: {}", value))?;
                Ok(json!(to_hex(&compact::encode_compact_int(&value)?)))
            }
        }
        Commands::RlpDecode { data } => Ok(rlp_json(&RlpItem::decode(&from_hex(&data)?)?)),
        Commands::SignTx {
            key,
            to,
            data,
            value,
            block_number,
            extra_data,
        } => {
            let mut request = TransactionRequest {
                to: to.as_deref().map(Address::from_str).transpose()?,
                data: from_hex(&data)?,
                value: BigUint::from_str(value.trim())
                    .with_context(|| format!("not a decimal value: {}", value))?,
                ..TransactionRequest::default()
            };
            if let Some(extra) = extra_data {
                request.extra_data = from_hex(&extra)?;
            }
            sign_transaction(config, key.as_deref(), request, block_number).await
        }
        Commands::DecodeTx { data } => {
            let (tx, sender) = decode_and_verify(suite, &from_hex(&data)?)?;
            Ok(json!({
                "txHash": tx.tx_hash().to_string(),
                "sender": sender.to_string(),
                "signature": to_hex(&tx.signature().to_bytes()),
                "transaction": transaction_json(tx.raw()),
            }))
        }
        Commands::Revert { output, abi } => {
            let errors = match abi {
                Some(path) => {
                    let contents = std::fs::read_to_string(&path)
                        .with_context(|| format!("reading ABI {}", path.display()))?;
                    ContractAbi::from_json(&contents)?.errors
                }
                None => Vec::new(),
            };
            let reason = codec.decode_revert(&from_hex(&output)?, &errors)?;
            Ok(reason.map(|r| json!(r.message())).unwrap_or(Value::Null))
        }
    }
}

async fn sign_transaction(
    config: &SdkConfig,
    key: Option<&str>,
    request: TransactionRequest,
    block_number: u64,
) -> anyhow::Result<Value> {
    let suite = config.suite();
    let pipeline = TransactionPipeline::from_config(config);

    let signed = match key {
        Some(key) => {
            let signer = KeyPairSigner::from_hex(suite, key)?;
            pipeline.build_and_sign(request, block_number, &signer)?
        }
        None if !config.signer.endpoints.is_empty() => {
            let providers: Vec<Arc<dyn RemoteSigner>> = config
                .signer
                .endpoints
                .iter()
                .map(|url| {
                    Arc::new(HttpRemoteSigner::with_timeout(url, suite, config.signer_timeout()))
                        as Arc<dyn RemoteSigner>
                })
                .collect();
            pipeline
                .build_and_sign_remote(request, block_number, &providers)
                .await?
        }
        None => bail!("no signing key given and no remote signer configured"),
    };

    Ok(json!({
        "txHash": signed.tx_hash().to_string(),
        "sender": signed.recover_sender()?.to_string(),
        "signed": to_hex(signed.encoded()),
    }))
}

fn parse_args(args: &str) -> anyhow::Result<Value> {
    serde_json::from_str(args).with_context(|| format!("arguments are not valid JSON: {}", args))
}

/// Parse `uint256,(bool,string)[]` into a type list.
fn parse_types(types: &str) -> anyhow::Result<Vec<AbiType>> {
    if types.trim().is_empty() {
        return Ok(Vec::new());
    }
    match AbiType::parse(&format!("({})", types))? {
        AbiType::Tuple(fields) => Ok(fields.into_iter().map(|f| f.ty).collect()),
        other => bail!("expected a type list, got {}", other),
    }
}
