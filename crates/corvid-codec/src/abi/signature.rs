use super::types::{parse_declaration, split_top_level, AbiType};
use crate::error::{CodecError, Result};
use std::fmt;

/// A named, typed parameter of a function, event, constructor or error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub kind: AbiType,
    /// Only meaningful for event inputs
    pub indexed: bool,
}

impl Param {
    pub fn new(name: impl Into<String>, kind: AbiType) -> Self {
        Self {
            name: name.into(),
            kind,
            indexed: false,
        }
    }

    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StateMutability {
    Pure,
    View,
    #[default]
    NonPayable,
    Payable,
}

impl StateMutability {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pure" => Some(StateMutability::Pure),
            "view" => Some(StateMutability::View),
            "nonpayable" => Some(StateMutability::NonPayable),
            "payable" => Some(StateMutability::Payable),
            _ => None,
        }
    }

    /// True for calls that do not change state.
    pub fn is_constant(&self) -> bool {
        matches!(self, StateMutability::Pure | StateMutability::View)
    }
}

/// Contract function definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub inputs: Vec<Param>,
    pub outputs: Vec<Param>,
    pub state_mutability: StateMutability,
}

impl Function {
    /// Parse `name(type [name], ...)` with an optional
    /// `returns (type, ...)` suffix.
    pub fn parse(signature: &str) -> Result<Self> {
        let signature = signature.trim();
        let signature = signature.strip_prefix("function ").unwrap_or(signature);
        let (head, outputs) = split_returns(signature)?;
        let (name, inputs) = parse_call(head)?;
        if inputs.iter().any(|p| p.indexed) {
            return Err(CodecError::InvalidSignature(format!(
                "{}: indexed is only valid for events",
                signature
            )));
        }
        Ok(Self {
            name,
            inputs,
            outputs,
            state_mutability: StateMutability::default(),
        })
    }

    /// `name(t1,t2)` with canonical types and no parameter names.
    pub fn signature(&self) -> String {
        canonical_signature(&self.name, &self.inputs)
    }

    pub fn input_types(&self) -> Vec<AbiType> {
        self.inputs.iter().map(|p| p.kind.clone()).collect()
    }

    pub fn output_types(&self) -> Vec<AbiType> {
        self.outputs.iter().map(|p| p.kind.clone()).collect()
    }

    /// Reject fixed-point parameters, which the Solidity ABI cannot carry.
    pub fn ensure_solidity(&self) -> Result<()> {
        self.inputs
            .iter()
            .chain(&self.outputs)
            .try_for_each(|p| p.kind.ensure_solidity())
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.signature())
    }
}

/// Contract event definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub name: String,
    pub inputs: Vec<Param>,
    pub anonymous: bool,
}

impl Event {
    /// Parse `Transfer(address indexed from, address indexed to, uint256 value)`.
    pub fn parse(signature: &str) -> Result<Self> {
        let signature = signature.trim();
        let signature = signature.strip_prefix("event ").unwrap_or(signature);
        let (signature, anonymous) = match signature.strip_suffix("anonymous") {
            Some(rest) if rest.ends_with(')') || rest.ends_with(' ') => (rest.trim_end(), true),
            _ => (signature, false),
        };
        let (name, inputs) = parse_call(signature)?;
        Ok(Self {
            name,
            inputs,
            anonymous,
        })
    }

    pub fn signature(&self) -> String {
        canonical_signature(&self.name, &self.inputs)
    }

    pub fn indexed_inputs(&self) -> impl Iterator<Item = &Param> {
        self.inputs.iter().filter(|p| p.indexed)
    }

    /// Types of the non-indexed inputs, in declaration order; these make up
    /// the log data.
    pub fn data_types(&self) -> Vec<AbiType> {
        self.inputs
            .iter()
            .filter(|p| !p.indexed)
            .map(|p| p.kind.clone())
            .collect()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.signature())
    }
}

/// Contract constructor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Constructor {
    pub inputs: Vec<Param>,
    pub payable: bool,
}

impl Constructor {
    pub fn input_types(&self) -> Vec<AbiType> {
        self.inputs.iter().map(|p| p.kind.clone()).collect()
    }
}

/// Custom error declared by a contract (`error Unauthorized(address)`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorDef {
    pub name: String,
    pub inputs: Vec<Param>,
}

impl ErrorDef {
    pub fn parse(signature: &str) -> Result<Self> {
        let signature = signature.trim();
        let signature = signature.strip_prefix("error ").unwrap_or(signature);
        let (name, inputs) = parse_call(signature)?;
        Ok(Self { name, inputs })
    }

    pub fn signature(&self) -> String {
        canonical_signature(&self.name, &self.inputs)
    }

    pub fn input_types(&self) -> Vec<AbiType> {
        self.inputs.iter().map(|p| p.kind.clone()).collect()
    }
}

/// Canonical form of any signature string: `name(t1,t2)`.
pub fn canonicalize(signature: &str) -> Result<String> {
    let (name, params) = parse_call(signature.trim())?;
    Ok(canonical_signature(&name, &params))
}

fn canonical_signature(name: &str, params: &[Param]) -> String {
    let types: Vec<String> = params.iter().map(|p| p.kind.canonical()).collect();
    format!("{}({})", name, types.join(","))
}

/// Split `name(...)` into the name and its parameter list.
fn parse_call(signature: &str) -> Result<(String, Vec<Param>)> {
    let invalid = || CodecError::InvalidSignature(signature.to_string());
    let open = signature.find('(').ok_or_else(invalid)?;
    let body = signature[open + 1..].strip_suffix(')').ok_or_else(invalid)?;
    let name = signature[..open].trim();
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        || name.starts_with(|c: char| c.is_ascii_digit())
    {
        return Err(invalid());
    }
    let params = parse_params(body).map_err(|e| match e {
        CodecError::UnrecognizedType(_) | CodecError::UnsupportedType(_) => e,
        _ => invalid(),
    })?;
    Ok((name.to_string(), params))
}

fn parse_params(body: &str) -> Result<Vec<Param>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    split_top_level(body)?
        .into_iter()
        .map(|part| {
            let decl = parse_declaration(part)?;
            Ok(Param {
                name: decl.name,
                kind: decl.ty,
                indexed: decl.indexed,
            })
        })
        .collect()
}

/// Separate `f(uint256) returns (bool)` into call and output params.
fn split_returns(signature: &str) -> Result<(&str, Vec<Param>)> {
    let mut depth = 0i32;
    for (i, c) in signature.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    let rest = signature[i + 1..].trim();
                    if rest.is_empty() {
                        return Ok((signature, Vec::new()));
                    }
                    let outputs = rest
                        .strip_prefix("returns")
                        .map(str::trim)
                        .and_then(|r| r.strip_prefix('('))
                        .and_then(|r| r.strip_suffix(')'))
                        .ok_or_else(|| CodecError::InvalidSignature(signature.to_string()))?;
                    return Ok((&signature[..=i], parse_params(outputs)?));
                }
            }
            _ => {}
        }
    }
    Err(CodecError::InvalidSignature(signature.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_parse_and_canonical() {
        let f = Function::parse("transfer(address to, uint amount)").unwrap();
        assert_eq!(f.name, "transfer");
        assert_eq!(f.inputs[0].name, "to");
        assert_eq!(f.signature(), "transfer(address,uint256)");

        let f = Function::parse("baz(uint32,fixed72x16)").unwrap();
        assert_eq!(f.signature(), "baz(uint32,fixed72x16)");
    }

    #[test]
    fn test_function_with_tuple_and_returns() {
        let f = Function::parse("function submit(tuple(address owner, bytes data)[] items) returns (bool ok, uint256)")
            .unwrap();
        assert_eq!(f.signature(), "submit((address,bytes)[])");
        assert_eq!(f.outputs.len(), 2);
        assert_eq!(f.outputs[0].name, "ok");
        assert_eq!(f.output_types(), vec![AbiType::Bool, AbiType::Uint(256)]);
    }

    #[test]
    fn test_function_rejects_garbage() {
        assert!(matches!(Function::parse("transfer"), Err(CodecError::InvalidSignature(_))));
        assert!(matches!(Function::parse("(uint256)"), Err(CodecError::InvalidSignature(_))));
        assert!(Function::parse("f(uint256,)").is_err());
        assert!(matches!(Function::parse("f(uint255)"), Err(CodecError::UnrecognizedType(_))));
        assert!(matches!(Function::parse("f(uint256 indexed a)"), Err(CodecError::InvalidSignature(_))));
    }

    #[test]
    fn test_event_parse() {
        let e = Event::parse("event Transfer(address indexed from, address indexed to, uint256 value)").unwrap();
        assert_eq!(e.signature(), "Transfer(address,address,uint256)");
        assert_eq!(e.indexed_inputs().count(), 2);
        assert_eq!(e.data_types(), vec![AbiType::Uint(256)]);
        assert!(!e.anonymous);

        let e = Event::parse("Ping(uint8) anonymous").unwrap();
        assert!(e.anonymous);
        assert_eq!(e.signature(), "Ping(uint8)");
    }

    #[test]
    fn test_canonicalize() {
        assert_eq!(
            canonicalize(" Notify ( uint a , uint b ) ").unwrap(),
            "Notify(uint256,uint256)"
        );
        assert_eq!(canonicalize("Notify(uint a, uint b)").unwrap(), "Notify(uint256,uint256)");
        assert_eq!(canonicalize("f()").unwrap(), "f()");
    }

    #[test]
    fn test_error_def() {
        let e = ErrorDef::parse("error Unauthorized(address caller)").unwrap();
        assert_eq!(e.signature(), "Unauthorized(address)");
    }
}
