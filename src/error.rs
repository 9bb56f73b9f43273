//! # Error Types
//!
//! Custom error types for the TT codec using `thiserror`.

use thiserror::Error;

/// Main error type for the TT codec
#[derive(Debug, Error)]
pub enum CodecError {
    /// Header carries a protocol version other than 2 or 3
    #[error("unsupported protocol version: {0}")]
    UnsupportedProtocolVersion(u8),

    /// Message type is unknown or not valid in this direction
    #[error("unsupported message type: {0}")]
    UnsupportedMessageType(String),

    /// Payload length does not match the fixed layout
    #[error("invalid {message} message length {actual} instead of {expected}")]
    InvalidMessageLength {
        /// Message the length was checked for
        message: &'static str,
        /// Expected byte count
        expected: usize,
        /// Actual byte count
        actual: usize,
    },

    /// Configuration parameter out of range or unrecognized
    #[error("{field} is out of range: {value}")]
    InvalidFieldValue {
        /// Field name as it appears in configuration documents
        field: &'static str,
        /// Offending value
        value: String,
    },

    /// Hex string contains non-hex characters or has odd length
    #[error("invalid hex input: {0}")]
    InvalidHexInput(#[from] hex::FromHexError),

    /// Configuration document lacks a required field
    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),

    /// Configuration document has the wrong shape
    #[error("document error: {0}")]
    Document(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    pub(crate) fn invalid_field(field: &'static str, value: impl ToString) -> Self {
        CodecError::InvalidFieldValue {
            field,
            value: value.to_string(),
        }
    }
}

/// Result type alias for the TT codec
pub type Result<T> = std::result::Result<T, CodecError>;
