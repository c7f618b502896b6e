//! Flag Tests
//!
//! These tests verify:
//! - Bit values match what other memcached clients write
//! - Type bits decode in priority order
//! - Unknown bits fall back to raw bytes
//! - The compressed marker composes with every encoding

use mcclient::codec::{Encoding, Flags, FLAG_COMPRESSED, FLAG_INTEGER, FLAG_LONG, FLAG_OBJECT};

// =============================================================================
// Bit Layout
// =============================================================================

#[test]
fn test_flag_values() {
    assert_eq!(FLAG_OBJECT, 1);
    assert_eq!(FLAG_INTEGER, 2);
    assert_eq!(FLAG_LONG, 4);
    assert_eq!(FLAG_COMPRESSED, 8);
}

#[test]
fn test_encoding_bits() {
    assert_eq!(Flags::new(Encoding::Raw).bits(), 0);
    assert_eq!(Flags::new(Encoding::Int).bits(), 2);
    assert_eq!(Flags::new(Encoding::Long).bits(), 4);
    assert_eq!(Flags::new(Encoding::Object).bits(), 1);
}

#[test]
fn test_compressed_marker_composes() {
    for encoding in [Encoding::Raw, Encoding::Int, Encoding::Long, Encoding::Object] {
        let flags = Flags::new(encoding).with_compression();
        assert!(flags.compressed);
        assert_eq!(flags.bits() & FLAG_COMPRESSED, FLAG_COMPRESSED);
        assert_eq!(Flags::from_bits(flags.bits()), flags);
    }
}

#[test]
fn test_u32_conversions() {
    let flags = Flags::from(FLAG_LONG | FLAG_COMPRESSED);
    assert_eq!(flags.encoding, Encoding::Long);
    assert!(flags.compressed);
    assert_eq!(u32::from(flags), 12);
}

// =============================================================================
// Decoding Priority
// =============================================================================

#[test]
fn test_zero_is_raw() {
    let flags = Flags::from_bits(0);
    assert_eq!(flags.encoding, Encoding::Raw);
    assert!(!flags.compressed);
}

#[test]
fn test_compressed_only_is_raw() {
    let flags = Flags::from_bits(FLAG_COMPRESSED);
    assert_eq!(flags.encoding, Encoding::Raw);
    assert!(flags.compressed);
}

#[test]
fn test_integer_wins_over_others() {
    assert_eq!(Flags::from_bits(FLAG_INTEGER | FLAG_LONG).encoding, Encoding::Int);
    assert_eq!(Flags::from_bits(FLAG_INTEGER | FLAG_OBJECT).encoding, Encoding::Int);
}

#[test]
fn test_long_wins_over_object() {
    assert_eq!(Flags::from_bits(FLAG_LONG | FLAG_OBJECT).encoding, Encoding::Long);
}

#[test]
fn test_unknown_bits_are_raw() {
    for bits in [16u32, 1 << 8, 1 << 31, 0xF0] {
        assert_eq!(Flags::from_bits(bits).encoding, Encoding::Raw, "bits {:#x}", bits);
    }
}

#[test]
fn test_unknown_bits_do_not_hide_type_bits() {
    assert_eq!(Flags::from_bits(FLAG_INTEGER | 1 << 8).encoding, Encoding::Int);
    assert_eq!(Flags::from_bits(FLAG_OBJECT | 1 << 20).encoding, Encoding::Object);
}
