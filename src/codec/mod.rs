//! Value Codec Module
//!
//! Turns application values into the `(flags, bytes)` pair memcached stores,
//! and back.
//!
//! ## Encoding Pipeline
//! ```text
//! Value ──► typed bytes ──► [compress if it shrinks] ──► size check ──► StoredValue
//!   Raw     as is             Raw / Long / Object only
//!   Int     decimal
//!   Long    decimal
//!   Object  serializer
//! ```
//!
//! Decoding runs the pipeline backwards: decompress when flagged, then
//! reinterpret the bytes according to the type bits.

mod compress;
mod flags;
mod value;

pub use compress::{compress, decompress};
pub use flags::{Encoding, Flags, FLAG_COMPRESSED, FLAG_INTEGER, FLAG_LONG, FLAG_OBJECT};
pub use value::Value;

use bytes::Bytes;
use num_bigint::BigInt;

use crate::config::ClientConfig;
use crate::error::{CacheError, Result, ValueError};

/// The bytes and flags actually handed to the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredValue {
    pub flags: Flags,
    pub data: Bytes,
}

impl StoredValue {
    /// Wire flags
    pub fn bits(&self) -> u32 {
        self.flags.bits()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Encodes and decodes values per the client's limits and switches
#[derive(Debug, Clone, Copy)]
pub struct ValueCodec {
    /// Largest encoded payload accepted (0 = unlimited)
    max_value_length: usize,

    /// Whether `Value::Object` may be stored
    serialization: bool,
}

impl ValueCodec {
    pub fn new(max_value_length: usize, serialization: bool) -> Self {
        Self {
            max_value_length,
            serialization,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.max_value_length, config.enable_serialization)
    }

    pub fn serialization_enabled(&self) -> bool {
        self.serialization
    }

    /// Encode a value for storage
    ///
    /// Compression is attempted when `min_compress_len > 0` and the typed
    /// payload is longer than it, and kept only if strictly smaller.
    /// Integers are never compressed.
    pub fn encode(&self, value: &Value, min_compress_len: usize) -> Result<StoredValue> {
        let (flags, data, compressible) = match value {
            Value::Raw(bytes) => (Flags::new(Encoding::Raw), bytes.clone(), true),
            Value::Int(n) => (Flags::new(Encoding::Int), Bytes::from(n.to_string()), false),
            Value::Long(n) => (Flags::new(Encoding::Long), Bytes::from(n.to_string()), true),
            Value::Object(bytes) => {
                if !self.serialization {
                    return Err(ValueError::NotPrimitive.into());
                }
                (Flags::new(Encoding::Object), bytes.clone(), true)
            }
        };

        let (flags, data) = if compressible && min_compress_len > 0 && data.len() > min_compress_len {
            let packed = compress(&data);
            if packed.len() < data.len() {
                (flags.with_compression(), Bytes::from(packed))
            } else {
                (flags, data)
            }
        } else {
            (flags, data)
        };

        if self.max_value_length != 0 && data.len() > self.max_value_length {
            return Err(ValueError::TooLarge {
                len: data.len(),
                max: self.max_value_length,
            }
            .into());
        }

        Ok(StoredValue { flags, data })
    }

    /// Decode stored bytes according to their wire flags
    pub fn decode(&self, data: Bytes, bits: u32) -> Result<Value> {
        let flags = Flags::from_bits(bits);

        let data = if flags.compressed {
            Bytes::from(decompress(&data)?)
        } else {
            data
        };

        match flags.encoding {
            Encoding::Raw => Ok(Value::Raw(data)),
            Encoding::Int => {
                let n = decimal_text(&data)?
                    .parse::<i64>()
                    .map_err(|e| CacheError::Type(format!("invalid integer payload: {}", e)))?;
                Ok(Value::Int(n))
            }
            Encoding::Long => {
                let n = decimal_text(&data)?
                    .parse::<BigInt>()
                    .map_err(|e| CacheError::Type(format!("invalid long payload: {}", e)))?;
                Ok(Value::Long(n))
            }
            Encoding::Object => Ok(Value::Object(data)),
        }
    }
}

/// Numeric payload as text; servers pad counters shrunk in place with spaces
fn decimal_text(data: &[u8]) -> Result<&str> {
    std::str::from_utf8(data)
        .map(|text| text.trim_matches(|c: char| c.is_ascii_whitespace()))
        .map_err(|_| CacheError::Type("numeric payload is not ASCII".to_string()))
}
