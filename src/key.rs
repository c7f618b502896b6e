//! Key validation
//!
//! Every key that reaches a transport is a [`Key`], and the only way to get
//! one is through [`KeyValidator::validate`].
//!
//! ## Rules
//! - at least one byte
//! - at most `max_length` bytes after UTF-8 encoding (0 = unlimited)
//! - no byte below 33 (controls, space) and no DEL (127), anywhere in the key

use std::borrow::{Borrow, Cow};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::ops::Deref;

use bytes::Bytes;

use crate::error::KeyError;

/// A validated cache key
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(Bytes);

impl Key {
    /// Raw key bytes as sent to the server
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The key as text, if it is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// Consume the key, returning its bytes
    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for Key {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Key {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Borrow<[u8]> for Key {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({:?})", String::from_utf8_lossy(&self.0))
    }
}

/// Anything that can be turned into key bytes
///
/// Text sources are encoded as UTF-8; sources that are not valid unicode
/// fail with [`KeyError::Encoding`].
pub trait KeySource {
    fn key_bytes(&self) -> Result<Cow<'_, [u8]>, KeyError>;
}

impl KeySource for str {
    fn key_bytes(&self) -> Result<Cow<'_, [u8]>, KeyError> {
        Ok(Cow::Borrowed(self.as_bytes()))
    }
}

impl KeySource for String {
    fn key_bytes(&self) -> Result<Cow<'_, [u8]>, KeyError> {
        Ok(Cow::Borrowed(self.as_bytes()))
    }
}

impl KeySource for [u8] {
    fn key_bytes(&self) -> Result<Cow<'_, [u8]>, KeyError> {
        Ok(Cow::Borrowed(self))
    }
}

impl<const N: usize> KeySource for [u8; N] {
    fn key_bytes(&self) -> Result<Cow<'_, [u8]>, KeyError> {
        Ok(Cow::Borrowed(&self[..]))
    }
}

impl KeySource for Vec<u8> {
    fn key_bytes(&self) -> Result<Cow<'_, [u8]>, KeyError> {
        Ok(Cow::Borrowed(self.as_slice()))
    }
}

impl KeySource for OsStr {
    fn key_bytes(&self) -> Result<Cow<'_, [u8]>, KeyError> {
        self.to_str()
            .map(|text| Cow::Borrowed(text.as_bytes()))
            .ok_or(KeyError::Encoding)
    }
}

impl KeySource for OsString {
    fn key_bytes(&self) -> Result<Cow<'_, [u8]>, KeyError> {
        self.as_os_str().key_bytes()
    }
}

impl KeySource for Key {
    fn key_bytes(&self) -> Result<Cow<'_, [u8]>, KeyError> {
        Ok(Cow::Borrowed(self.as_bytes()))
    }
}

impl<T: KeySource + ?Sized> KeySource for &T {
    fn key_bytes(&self) -> Result<Cow<'_, [u8]>, KeyError> {
        (**self).key_bytes()
    }
}

/// Validates and normalizes keys against length and character rules
#[derive(Debug, Clone, Copy)]
pub struct KeyValidator {
    max_length: usize,
}

impl KeyValidator {
    /// Create a validator; `max_length == 0` disables the length limit
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Validate a key, returning its normalized byte form
    pub fn validate<K: KeySource + ?Sized>(&self, key: &K) -> Result<Key, KeyError> {
        let bytes = key.key_bytes()?;

        if bytes.is_empty() {
            return Err(KeyError::Empty);
        }

        if self.max_length != 0 && bytes.len() > self.max_length {
            return Err(KeyError::TooLong {
                len: bytes.len(),
                max: self.max_length,
            });
        }

        // Scan the full key so a trailing newline is caught too
        if let Some(position) = bytes.iter().position(|&b| is_forbidden(b)) {
            return Err(KeyError::ControlCharacter {
                byte: bytes[position],
                position,
            });
        }

        Ok(Key(Bytes::copy_from_slice(&bytes)))
    }
}

fn is_forbidden(byte: u8) -> bool {
    byte < 33 || byte == 127
}
