//! Flag definitions
//!
//! The wire format stores a `u32` bitmask next to each value. Bits 0-2 name
//! how the bytes were produced and are mutually exclusive; bit 3 marks a
//! compressed payload and can sit on top of any of them.
//!
//! ```text
//! bit 0  serialized object
//! bit 1  integer (i64, decimal ASCII)
//! bit 2  long integer (BigInt, decimal ASCII)
//! bit 3  compressed
//! ```

/// Serialized object payload
pub const FLAG_OBJECT: u32 = 1 << 0;

/// Fixed-width integer payload
pub const FLAG_INTEGER: u32 = 1 << 1;

/// Arbitrary-precision integer payload
pub const FLAG_LONG: u32 = 1 << 2;

/// Payload is LZ4 compressed
pub const FLAG_COMPRESSED: u32 = 1 << 3;

/// How the stored bytes map back to a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Opaque bytes, stored as is
    Raw,
    /// Decimal `i64`
    Int,
    /// Decimal arbitrary-precision integer
    Long,
    /// Serializer output
    Object,
}

impl Encoding {
    fn bit(self) -> u32 {
        match self {
            Encoding::Raw => 0,
            Encoding::Int => FLAG_INTEGER,
            Encoding::Long => FLAG_LONG,
            Encoding::Object => FLAG_OBJECT,
        }
    }
}

/// Typed view of the wire flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Flags {
    pub encoding: Encoding,
    pub compressed: bool,
}

impl Flags {
    pub fn new(encoding: Encoding) -> Self {
        Self {
            encoding,
            compressed: false,
        }
    }

    /// Same encoding with the compressed marker set
    pub fn with_compression(self) -> Self {
        Self {
            compressed: true,
            ..self
        }
    }

    /// Wire representation
    pub fn bits(&self) -> u32 {
        let mut bits = self.encoding.bit();
        if self.compressed {
            bits |= FLAG_COMPRESSED;
        }
        bits
    }

    /// Parse wire flags
    ///
    /// Type bits are checked in priority order (integer, long, object).
    /// Unknown bits with no type bit decode as raw bytes.
    pub fn from_bits(bits: u32) -> Self {
        let compressed = bits & FLAG_COMPRESSED != 0;
        let type_bits = bits & !FLAG_COMPRESSED;

        let encoding = if type_bits == 0 {
            Encoding::Raw
        } else if type_bits & FLAG_INTEGER != 0 {
            Encoding::Int
        } else if type_bits & FLAG_LONG != 0 {
            Encoding::Long
        } else if type_bits & FLAG_OBJECT != 0 {
            Encoding::Object
        } else {
            Encoding::Raw
        };

        Self {
            encoding,
            compressed,
        }
    }
}

impl From<Flags> for u32 {
    fn from(flags: Flags) -> u32 {
        flags.bits()
    }
}

impl From<u32> for Flags {
    fn from(bits: u32) -> Flags {
        Flags::from_bits(bits)
    }
}
