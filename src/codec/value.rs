//! Application values
//!
//! The variant is picked from the caller's static type through the `From`
//! impls below, so integers, big integers, and strings never get confused.

use bytes::Bytes;
use num_bigint::BigInt;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::flags::Encoding;
use crate::error::{CacheError, Result};

/// A value as stored in or read from the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Opaque bytes or text
    Raw(Bytes),

    /// Fixed-width integer
    Int(i64),

    /// Arbitrary-precision integer
    Long(BigInt),

    /// Serialized object, restored with [`Value::deserialize`]
    Object(Bytes),
}

impl Value {
    /// Serialize any serde value into an object value
    pub fn object<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let bytes = bincode::serialize(value)?;
        Ok(Value::Object(Bytes::from(bytes)))
    }

    /// Restore an object value into its original type
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        match self {
            Value::Object(bytes) => Ok(bincode::deserialize(bytes)?),
            other => Err(CacheError::Type(format!(
                "expected a serialized object, found {:?}",
                other.encoding()
            ))),
        }
    }

    /// Which wire encoding this value uses
    pub fn encoding(&self) -> Encoding {
        match self {
            Value::Raw(_) => Encoding::Raw,
            Value::Int(_) => Encoding::Int,
            Value::Long(_) => Encoding::Long,
            Value::Object(_) => Encoding::Object,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Raw(bytes) => Some(&bytes[..]),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<&BigInt> {
        match self {
            Value::Long(n) => Some(n),
            _ => None,
        }
    }
}

// =============================================================================
// Raw conversions
// =============================================================================

impl From<Bytes> for Value {
    fn from(bytes: Bytes) -> Self {
        Value::Raw(bytes)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Raw(Bytes::from(bytes))
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Value::Raw(Bytes::copy_from_slice(bytes))
    }
}

impl<const N: usize> From<&[u8; N]> for Value {
    fn from(bytes: &[u8; N]) -> Self {
        Value::Raw(Bytes::copy_from_slice(bytes))
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Raw(Bytes::from(text))
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Raw(Bytes::copy_from_slice(text.as_bytes()))
    }
}

// =============================================================================
// Integer conversions
// =============================================================================

macro_rules! int_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Int(i64::from(n))
                }
            }
        )*
    };
}

int_value!(i8, i16, i32, i64, u8, u16, u32);

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        Value::Long(n)
    }
}
