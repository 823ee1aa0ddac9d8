//! Loading of standard contract ABI JSON.

use super::signature::{Constructor, ErrorDef, Event, Function, Param, StateMutability};
use super::types::{AbiType, TupleField};
use crate::error::{CodecError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
struct JsonEntry {
    #[serde(rename = "type", default = "default_entry_type")]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Vec<JsonParam>,
    #[serde(default)]
    outputs: Vec<JsonParam>,
    #[serde(default)]
    anonymous: bool,
    #[serde(rename = "stateMutability", default)]
    state_mutability: Option<String>,
    /// Pre-0.5 compilers
    #[serde(default)]
    constant: Option<bool>,
    #[serde(default)]
    payable: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct JsonParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    components: Vec<JsonParam>,
    #[serde(default)]
    indexed: bool,
}

fn default_entry_type() -> String {
    "function".to_string()
}

impl JsonParam {
    fn abi_type(&self) -> Result<AbiType> {
        let Some(suffix) = self.kind.strip_prefix("tuple") else {
            return AbiType::parse(&self.kind);
        };
        let fields = self
            .components
            .iter()
            .map(|c| Ok(TupleField::new(c.name.clone(), c.abi_type()?)))
            .collect::<Result<Vec<_>>>()?;
        wrap_array_suffix(AbiType::Tuple(fields), suffix, &self.kind)
    }

    fn to_param(&self) -> Result<Param> {
        Ok(Param {
            name: self.name.clone(),
            kind: self.abi_type()?,
            indexed: self.indexed,
        })
    }
}

/// Apply `[2][]`-style suffixes, leftmost innermost.
fn wrap_array_suffix(mut ty: AbiType, mut suffix: &str, original: &str) -> Result<AbiType> {
    while !suffix.is_empty() {
        let close = suffix
            .find(']')
            .filter(|_| suffix.starts_with('['))
            .ok_or_else(|| CodecError::UnrecognizedType(original.to_string()))?;
        let size = &suffix[1..close];
        ty = if size.is_empty() {
            AbiType::Array(Box::new(ty))
        } else {
            match size.parse::<usize>() {
                Ok(n) if n > 0 => AbiType::FixedArray(Box::new(ty), n),
                _ => return Err(CodecError::UnrecognizedType(original.to_string())),
            }
        };
        suffix = &suffix[close + 1..];
    }
    Ok(ty)
}

fn to_params(params: &[JsonParam]) -> Result<Vec<Param>> {
    params.iter().map(JsonParam::to_param).collect()
}

/// A contract's interface, loaded from ABI JSON.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContractAbi {
    pub constructor: Option<Constructor>,
    /// Overloads share a name
    pub functions: BTreeMap<String, Vec<Function>>,
    pub events: BTreeMap<String, Vec<Event>>,
    pub errors: Vec<ErrorDef>,
    pub has_fallback: bool,
    pub has_receive: bool,
}

impl ContractAbi {
    /// Parse a JSON array of ABI entries.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<JsonEntry> = serde_json::from_str(json)?;
        let mut abi = ContractAbi::default();

        for entry in entries {
            match entry.kind.as_str() {
                "function" => {
                    let state_mutability = entry
                        .state_mutability
                        .as_deref()
                        .and_then(StateMutability::parse)
                        .unwrap_or(match (entry.constant, entry.payable) {
                            (Some(true), _) => StateMutability::View,
                            (_, Some(true)) => StateMutability::Payable,
                            _ => StateMutability::NonPayable,
                        });
                    let function = Function {
                        name: entry.name.clone(),
                        inputs: to_params(&entry.inputs)?,
                        outputs: to_params(&entry.outputs)?,
                        state_mutability,
                    };
                    abi.functions.entry(entry.name).or_default().push(function);
                }
                "event" => {
                    let event = Event {
                        name: entry.name.clone(),
                        inputs: to_params(&entry.inputs)?,
                        anonymous: entry.anonymous,
                    };
                    abi.events.entry(entry.name).or_default().push(event);
                }
                "constructor" => {
                    abi.constructor = Some(Constructor {
                        inputs: to_params(&entry.inputs)?,
                        payable: entry.state_mutability.as_deref() == Some("payable")
                            || entry.payable == Some(true),
                    });
                }
                "error" => abi.errors.push(ErrorDef {
                    name: entry.name,
                    inputs: to_params(&entry.inputs)?,
                }),
                "fallback" => abi.has_fallback = true,
                "receive" => abi.has_receive = true,
                other => {
                    tracing::warn!(kind = other, "Skipping unknown ABI entry type");
                }
            }
        }

        Ok(abi)
    }

    /// First function with this name.
    pub fn function(&self, name: &str) -> Result<&Function> {
        self.functions
            .get(name)
            .and_then(|overloads| overloads.first())
            .ok_or_else(|| CodecError::InvalidSignature(format!("no function named {}", name)))
    }

    /// All overloads with this name.
    pub fn overloads(&self, name: &str) -> &[Function] {
        self.functions.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn event(&self, name: &str) -> Result<&Event> {
        self.events
            .get(name)
            .and_then(|overloads| overloads.first())
            .ok_or_else(|| CodecError::InvalidSignature(format!("no event named {}", name)))
    }

    pub fn iter_functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.values().flatten()
    }

    pub fn iter_events(&self) -> impl Iterator<Item = &Event> {
        self.events.values().flatten()
    }
}
