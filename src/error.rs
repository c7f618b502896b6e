//! Error types for mcclient
//!
//! Provides a unified error type for all client operations.

use thiserror::Error;

/// Result type alias using CacheError
pub type Result<T> = std::result::Result<T, CacheError>;

/// Unified error type for mcclient operations
#[derive(Debug, Error)]
pub enum CacheError {
    // -------------------------------------------------------------------------
    // Validation Errors (raised before any network call)
    // -------------------------------------------------------------------------
    #[error("Key error: {0}")]
    Key(#[from] KeyError),

    #[error("Value error: {0}")]
    Value(#[from] ValueError),

    // -------------------------------------------------------------------------
    // Decoding Errors
    // -------------------------------------------------------------------------
    #[error("Type error: {0}")]
    Type(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Compression error: {0}")]
    Compression(String),

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected response to {command}")]
    UnexpectedResponse { command: &'static str },

    // -------------------------------------------------------------------------
    // Server Errors (session stays usable)
    // -------------------------------------------------------------------------
    #[error("Server error: {0}")]
    Server(String),
}

impl CacheError {
    /// True for failures that leave the session in an unknown state.
    ///
    /// These close the connection and are the only errors that
    /// `treat_errors_as_miss` may swallow.
    pub fn is_transport(&self) -> bool {
        matches!(self, CacheError::Io(_) | CacheError::UnexpectedResponse { .. })
    }
}

impl From<bincode::Error> for CacheError {
    fn from(err: bincode::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

/// Reasons a key is refused by the validator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("key is empty")]
    Empty,

    #[error("key is not valid unicode and cannot be encoded as UTF-8")]
    Encoding,

    #[error("key length {len} is > {max}")]
    TooLong { len: usize, max: usize },

    #[error("control characters not allowed (byte 0x{byte:02x} at position {position})")]
    ControlCharacter { byte: u8, position: usize },
}

/// Reasons a value cannot be encoded for storage
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("value must be a primitive type; serialization disabled")]
    NotPrimitive,

    #[error("value is larger than configured max value length: {len} > {max}")]
    TooLarge { len: usize, max: usize },
}
