//! Key Validator Tests
//!
//! These tests verify:
//! - Valid keys pass through byte-for-byte
//! - Empty, oversized, and non-unicode keys are refused
//! - Every control byte (0-32) and DEL (127) is refused, wherever it sits
//! - The length limit can be disabled

use std::collections::HashMap;

use mcclient::key::{KeySource, KeyValidator};
use mcclient::KeyError;

// =============================================================================
// Helper Functions
// =============================================================================

fn default_validator() -> KeyValidator {
    KeyValidator::new(250)
}

// =============================================================================
// Accepted Keys
// =============================================================================

#[test]
fn test_valid_key_is_unchanged() {
    let validator = default_validator();
    let key = validator.validate("user:42:profile").unwrap();
    assert_eq!(key.as_bytes(), b"user:42:profile");
    assert_eq!(key.as_str(), Some("user:42:profile"));
}

#[test]
fn test_unicode_key_is_utf8_encoded() {
    let validator = default_validator();
    let key = validator.validate("üî™").unwrap();
    assert_eq!(key.as_bytes(), "üî™".as_bytes());
}

#[test]
fn test_byte_keys_accepted() {
    let validator = default_validator();
    assert_eq!(validator.validate(b"raw").unwrap().as_bytes(), b"raw");
    assert_eq!(validator.validate(&b"raw"[..]).unwrap().as_bytes(), b"raw");
    assert_eq!(validator.validate(&b"raw".to_vec()).unwrap().as_bytes(), b"raw");
}

#[test]
fn test_string_and_key_sources() {
    let validator = default_validator();
    let owned = String::from("owned");
    let key = validator.validate(&owned).unwrap();
    let again = validator.validate(&key).unwrap();
    assert_eq!(key, again);
}

#[test]
fn test_printable_ascii_range_accepted() {
    let validator = default_validator();
    let printable: Vec<u8> = (33u8..127).collect();
    let key = validator.validate(&printable).unwrap();
    assert_eq!(key.as_bytes(), printable.as_slice());
}

#[test]
fn test_key_at_max_length_accepted() {
    let validator = default_validator();
    let key = "a".repeat(250);
    assert_eq!(validator.validate(&key).unwrap().len(), 250);
}

#[test]
fn test_keys_usable_as_map_lookups() {
    let validator = default_validator();
    let mut map = HashMap::new();
    map.insert(validator.validate("k1").unwrap(), 1);
    assert_eq!(map.get("k1".as_bytes()), Some(&1));
}

// =============================================================================
// Refused Keys
// =============================================================================

#[test]
fn test_empty_key_refused() {
    let validator = default_validator();
    assert_eq!(validator.validate("").unwrap_err(), KeyError::Empty);
    assert_eq!(validator.validate(&Vec::<u8>::new()).unwrap_err(), KeyError::Empty);
}

#[test]
fn test_key_over_max_length_refused() {
    let validator = default_validator();
    let key = "a".repeat(251);
    let err = validator.validate(&key).unwrap_err();
    assert_eq!(err, KeyError::TooLong { len: 251, max: 250 });
    assert!(err.to_string().contains("length"));
}

#[test]
fn test_length_counts_encoded_bytes() {
    // 'ü' is two bytes in UTF-8
    let validator = KeyValidator::new(3);
    assert!(validator.validate("aü").is_ok());
    assert!(matches!(
        validator.validate("üü").unwrap_err(),
        KeyError::TooLong { len: 4, max: 3 }
    ));
}

#[test]
fn test_small_limit() {
    let validator = KeyValidator::new(1);
    assert_eq!(validator.validate("f").unwrap().as_bytes(), b"f");
    assert!(validator.validate("ff").unwrap_err().to_string().contains("length"));
}

#[test]
fn test_zero_limit_disables_length_check() {
    let validator = KeyValidator::new(0);
    let key = "a".repeat(10_000);
    assert_eq!(validator.validate(&key).unwrap().len(), 10_000);
}

#[test]
fn test_every_control_byte_refused() {
    let validator = default_validator();
    for byte in (0u8..33).chain(std::iter::once(127)) {
        let err = validator.validate(&[byte][..]).unwrap_err();
        assert_eq!(
            err,
            KeyError::ControlCharacter { byte, position: 0 },
            "byte {} should be refused",
            byte
        );
        assert!(err.to_string().contains("control"));
    }
}

#[test]
fn test_control_bytes_inside_key_refused() {
    let validator = default_validator();
    let err = validator
        .validate("this\x10has\x11control characters\x02")
        .unwrap_err();
    assert_eq!(err, KeyError::ControlCharacter { byte: 0x10, position: 4 });
}

#[test]
fn test_whitespace_anywhere_refused() {
    let validator = default_validator();
    assert!(validator.validate("has space").is_err());
    assert!(validator.validate(" leading").is_err());
    assert!(validator.validate("tab\there").is_err());
}

#[test]
fn test_trailing_newline_refused() {
    let validator = default_validator();
    let err = validator.validate("key\n").unwrap_err();
    assert_eq!(err, KeyError::ControlCharacter { byte: b'\n', position: 3 });
}

#[cfg(unix)]
#[test]
fn test_non_unicode_os_string_refused() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let validator = default_validator();
    let key = OsStr::from_bytes(&[0x66, 0x6f, 0xff]);
    assert_eq!(key.key_bytes().unwrap_err(), KeyError::Encoding);
    assert_eq!(validator.validate(key).unwrap_err(), KeyError::Encoding);
}

#[test]
fn test_unicode_os_string_accepted() {
    let validator = default_validator();
    let key = std::ffi::OsString::from("über");
    assert_eq!(validator.validate(&key).unwrap().as_bytes(), "über".as_bytes());
}

#[test]
fn test_validator_reports_limit_and_key_yields_bytes() {
    let validator = KeyValidator::new(64);
    assert_eq!(validator.max_length(), 64);

    let key = validator.validate("session:1").unwrap();
    assert_eq!(key.to_string(), "session:1");
    assert_eq!(key.into_bytes(), bytes::Bytes::from_static(b"session:1"));
}
