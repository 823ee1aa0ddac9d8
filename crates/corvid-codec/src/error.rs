use thiserror::Error;

/// Errors raised while describing, encoding or decoding values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodecError {
    #[error("Unrecognized type: {0}")]
    UnrecognizedType(String),

    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    #[error("Value out of range: {0}")]
    ValueOutOfRange(String),

    #[error("Argument count mismatch: expected {expected}, got {actual}")]
    ArgumentCountMismatch { expected: usize, actual: usize },

    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("Malformed encoding: {0}")]
    MalformedEncoding(String),

    #[error("Truncated input: needed {needed} bytes, {available} available")]
    TruncatedInput { needed: usize, available: usize },

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("JSON error: {0}")]
    Json(String),
}

impl CodecError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        CodecError::MalformedEncoding(msg.into())
    }

    pub(crate) fn out_of_range(msg: impl Into<String>) -> Self {
        CodecError::ValueOutOfRange(msg.into())
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(e: serde_json::Error) -> Self {
        CodecError::Json(e.to_string())
    }
}

impl From<hex::FromHexError> for CodecError {
    fn from(e: hex::FromHexError) -> Self {
        CodecError::MalformedEncoding(format!("invalid hex: {}", e))
    }
}

impl From<corvid_types::TypesError> for CodecError {
    fn from(e: corvid_types::TypesError) -> Self {
        CodecError::MalformedEncoding(e.to_string())
    }
}

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;
