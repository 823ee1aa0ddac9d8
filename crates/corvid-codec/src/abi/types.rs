use crate::error::{CodecError, Result};
use std::fmt;
use std::str::FromStr;

/// Size of one ABI word in bytes.
pub const WORD_SIZE: usize = 32;

/// Default widths used when a type is written without a size.
const DEFAULT_INT_BITS: usize = 256;
const DEFAULT_FIXED_BITS: usize = 128;
const DEFAULT_FIXED_DECIMALS: usize = 18;
const MAX_FIXED_DECIMALS: usize = 80;

/// Type descriptor for a contract parameter.
///
/// Built from a Solidity type string with [`AbiType::parse`] or from a JSON
/// ABI entry. Array suffixes nest outwards: `uint256[2][]` is a dynamic
/// array of `uint256[2]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AbiType {
    Bool,
    /// Unsigned integer of the given bit width (8..=256, multiple of 8)
    Uint(usize),
    /// Signed integer of the given bit width
    Int(usize),
    /// Fixed-point number. Only the SCALE codec can carry these.
    Fixed {
        bits: usize,
        decimals: usize,
        signed: bool,
    },
    Address,
    /// `bytesN`, 1 <= N <= 32
    FixedBytes(usize),
    Bytes,
    String,
    FixedArray(Box<AbiType>, usize),
    Array(Box<AbiType>),
    Tuple(Vec<TupleField>),
}

/// A named component of a tuple. Names are informational and never part of
/// the canonical type string.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TupleField {
    pub name: String,
    pub ty: AbiType,
}

impl TupleField {
    pub fn new(name: impl Into<String>, ty: AbiType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    pub fn unnamed(ty: AbiType) -> Self {
        Self::new(String::new(), ty)
    }
}

impl AbiType {
    /// Parse a Solidity type string such as `uint256[2][]` or
    /// `tuple(address to, uint256 amount)[]`.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CodecError::UnrecognizedType(s.to_string()));
        }

        if let Some(body) = s.strip_suffix(']') {
            let open = body
                .rfind('[')
                .ok_or_else(|| CodecError::UnrecognizedType(s.to_string()))?;
            let elem = Box::new(Self::parse(&body[..open])?);
            let size = body[open + 1..].trim();
            if size.is_empty() {
                return Ok(AbiType::Array(elem));
            }
            let len: usize = size
                .parse()
                .map_err(|_| CodecError::UnrecognizedType(s.to_string()))?;
            if len == 0 {
                return Err(CodecError::UnrecognizedType(s.to_string()));
            }
            return Ok(AbiType::FixedArray(elem, len));
        }

        let inner = s
            .strip_prefix("tuple")
            .unwrap_or(s)
            .trim_start()
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'));
        if let Some(inner) = inner {
            return parse_components(inner).map(AbiType::Tuple);
        }

        parse_elementary(s)
    }

    /// Canonical type string used when hashing signatures.
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    /// True if the encoding of this type has a variable length.
    pub fn is_dynamic(&self) -> bool {
        match self {
            AbiType::Bytes | AbiType::String | AbiType::Array(_) => true,
            AbiType::FixedArray(elem, _) => elem.is_dynamic(),
            AbiType::Tuple(fields) => fields.iter().any(|f| f.ty.is_dynamic()),
            _ => false,
        }
    }

    /// Bytes this type occupies in the head of its enclosing block.
    ///
    /// Dynamic types take a single offset word; static containers are
    /// inlined. Fixed arrays too large to address fail with
    /// `ValueOutOfRange`.
    pub fn head_size(&self) -> Result<usize> {
        if self.is_dynamic() {
            return Ok(WORD_SIZE);
        }
        match self {
            AbiType::FixedArray(elem, len) => elem
                .head_size()?
                .checked_mul(*len)
                .ok_or_else(|| CodecError::out_of_range(format!("{} is too large to encode", self))),
            AbiType::Tuple(fields) => fields.iter().try_fold(0usize, |acc, f| {
                acc.checked_add(f.ty.head_size()?)
                    .ok_or_else(|| CodecError::out_of_range(format!("{} is too large to encode", self)))
            }),
            _ => Ok(WORD_SIZE),
        }
    }

    /// Deepest container nesting below this type; scalars are 0.
    pub(crate) fn nesting(&self) -> usize {
        match self {
            AbiType::FixedArray(elem, _) | AbiType::Array(elem) => 1 + elem.nesting(),
            AbiType::Tuple(fields) => 1 + fields.iter().map(|f| f.ty.nesting()).max().unwrap_or(0),
            _ => 0,
        }
    }

    /// Reject types the Solidity ABI cannot carry (fixed-point numbers).
    pub fn ensure_solidity(&self) -> Result<()> {
        match self {
            AbiType::Fixed { .. } => Err(CodecError::UnsupportedType(self.canonical())),
            AbiType::FixedArray(elem, _) | AbiType::Array(elem) => elem.ensure_solidity(),
            AbiType::Tuple(fields) => fields.iter().try_for_each(|f| f.ty.ensure_solidity()),
            _ => Ok(()),
        }
    }

    /// Structural equality, ignoring tuple component names.
    pub fn same_shape(&self, other: &AbiType) -> bool {
        match (self, other) {
            (AbiType::FixedArray(a, n), AbiType::FixedArray(b, m)) => n == m && a.same_shape(b),
            (AbiType::Array(a), AbiType::Array(b)) => a.same_shape(b),
            (AbiType::Tuple(a), AbiType::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.ty.same_shape(&y.ty))
            }
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Bool => write!(f, "bool"),
            AbiType::Uint(bits) => write!(f, "uint{}", bits),
            AbiType::Int(bits) => write!(f, "int{}", bits),
            AbiType::Fixed {
                bits,
                decimals,
                signed,
            } => {
                let prefix = if *signed { "fixed" } else { "ufixed" };
                write!(f, "{}{}x{}", prefix, bits, decimals)
            }
            AbiType::Address => write!(f, "address"),
            AbiType::FixedBytes(n) => write!(f, "bytes{}", n),
            AbiType::Bytes => write!(f, "bytes"),
            AbiType::String => write!(f, "string"),
            AbiType::FixedArray(elem, len) => write!(f, "{}[{}]", elem, len),
            AbiType::Array(elem) => write!(f, "{}[]", elem),
            AbiType::Tuple(fields) => {
                write!(f, "(")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", field.ty)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl FromStr for AbiType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn parse_elementary(s: &str) -> Result<AbiType> {
    let unrecognized = || CodecError::UnrecognizedType(s.to_string());
    match s {
        "bool" => return Ok(AbiType::Bool),
        "address" => return Ok(AbiType::Address),
        "string" => return Ok(AbiType::String),
        "bytes" => return Ok(AbiType::Bytes),
        "uint" => return Ok(AbiType::Uint(DEFAULT_INT_BITS)),
        "int" => return Ok(AbiType::Int(DEFAULT_INT_BITS)),
        "fixed" | "ufixed" => {
            return Ok(AbiType::Fixed {
                bits: DEFAULT_FIXED_BITS,
                decimals: DEFAULT_FIXED_DECIMALS,
                signed: s == "fixed",
            })
        }
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("uint") {
        return parse_bits(rest).map(AbiType::Uint).ok_or_else(unrecognized);
    }
    if let Some(rest) = s.strip_prefix("int") {
        return parse_bits(rest).map(AbiType::Int).ok_or_else(unrecognized);
    }
    if let Some(rest) = s.strip_prefix("bytes") {
        return match rest.parse::<usize>() {
            Ok(n) if (1..=32).contains(&n) && !rest.starts_with('0') => Ok(AbiType::FixedBytes(n)),
            _ => Err(unrecognized()),
        };
    }
    let (signed, rest) = if let Some(rest) = s.strip_prefix("ufixed") {
        (false, rest)
    } else if let Some(rest) = s.strip_prefix("fixed") {
        (true, rest)
    } else {
        return Err(unrecognized());
    };
    let (bits, decimals) = rest.split_once('x').ok_or_else(unrecognized)?;
    let bits = parse_bits(bits).ok_or_else(unrecognized)?;
    let decimals: usize = decimals.parse().map_err(|_| unrecognized())?;
    if decimals > MAX_FIXED_DECIMALS {
        return Err(unrecognized());
    }
    Ok(AbiType::Fixed {
        bits,
        decimals,
        signed,
    })
}

fn parse_bits(s: &str) -> Option<usize> {
    if s.starts_with('0') {
        return None;
    }
    let bits: usize = s.parse().ok()?;
    (bits >= 8 && bits <= 256 && bits % 8 == 0).then_some(bits)
}

fn parse_components(inner: &str) -> Result<Vec<TupleField>> {
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    split_top_level(inner)?
        .into_iter()
        .map(|part| {
            let decl = parse_declaration(part)?;
            Ok(TupleField::new(decl.name, decl.ty))
        })
        .collect()
}

/// One parameter declaration: `type [indexed] [name]`.
#[derive(Debug)]
pub(crate) struct Declaration {
    pub ty: AbiType,
    pub name: String,
    pub indexed: bool,
}

/// Parse `uint256 indexed amount`, `tuple(address a, bool b)[] items` and
/// friends. Solidity data-location keywords are skipped.
pub(crate) fn parse_declaration(text: &str) -> Result<Declaration> {
    let text = text.trim();
    let mut depth = 0usize;
    let mut type_end = text.len();
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                // `tuple (...)` keeps its parenthesised body
                let next = text[i..].trim_start();
                if &text[..i] == "tuple" && next.starts_with('(') {
                    continue;
                }
                type_end = i;
                break;
            }
            _ => {}
        }
    }

    let ty = AbiType::parse(&text[..type_end])?;
    let mut indexed = false;
    let mut name = String::new();
    for word in text[type_end..].split_whitespace() {
        match word {
            "indexed" => indexed = true,
            "memory" | "calldata" | "storage" | "payable" => {}
            other if name.is_empty() && is_identifier(other) => name = other.to_string(),
            other => return Err(CodecError::UnrecognizedType(format!("{} ({})", text, other))),
        }
    }
    Ok(Declaration { ty, name, indexed })
}

/// Split a comma separated list at nesting depth zero.
pub(crate) fn split_top_level(s: &str) -> Result<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => {
                depth -= 1;
                if depth < 0 {
                    return Err(CodecError::UnrecognizedType(s.to_string()));
                }
            }
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(CodecError::UnrecognizedType(s.to_string()));
    }
    parts.push(&s[start..]);
    if parts.iter().any(|p| p.trim().is_empty()) {
        return Err(CodecError::UnrecognizedType(s.to_string()));
    }
    Ok(parts)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
