//! Command definitions
//!
//! Represents requests handed to a transport. Keys are already validated
//! and values already encoded by the time a command is built.

use bytes::Bytes;

use crate::cas::CasToken;
use crate::key::Key;

/// Storage command variants sharing the `(key, value, ttl, flags)` shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreMode {
    /// Store unconditionally
    Set,
    /// Store only if the key is absent
    Add,
    /// Store only if the key is present
    Replace,
    /// Append bytes to an existing value
    Append,
    /// Prepend bytes to an existing value
    Prepend,
}

impl StoreMode {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreMode::Set => "set",
            StoreMode::Add => "add",
            StoreMode::Replace => "replace",
            StoreMode::Append => "append",
            StoreMode::Prepend => "prepend",
        }
    }
}

/// A cache command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch one value
    Get { key: Key },

    /// Fetch one value with its CAS token
    Gets { key: Key },

    /// Fetch many values
    GetMulti { keys: Vec<Key> },

    /// Fetch many values with their CAS tokens
    GetsMulti { keys: Vec<Key> },

    /// set / add / replace / append / prepend
    Store {
        mode: StoreMode,
        key: Key,
        value: Bytes,
        ttl: u32,
        flags: u32,
    },

    /// Store only if the value is unchanged since `cas` was issued
    Cas {
        key: Key,
        value: Bytes,
        cas: CasToken,
        ttl: u32,
        flags: u32,
    },

    /// Increment a decimal counter
    Incr { key: Key, amount: u64 },

    /// Decrement a decimal counter
    Decr { key: Key, amount: u64 },

    /// Remove a key
    Delete { key: Key },

    /// Invalidate every item
    FlushAll,

    /// Server statistics
    Stats,

    /// Server version string
    Version,
}

impl Command {
    /// Command name, as used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            Command::Get { .. } => "get",
            Command::Gets { .. } => "gets",
            Command::GetMulti { .. } => "get_multi",
            Command::GetsMulti { .. } => "gets_multi",
            Command::Store { mode, .. } => mode.as_str(),
            Command::Cas { .. } => "cas",
            Command::Incr { .. } => "incr",
            Command::Decr { .. } => "decr",
            Command::Delete { .. } => "delete",
            Command::FlushAll => "flush_all",
            Command::Stats => "stats",
            Command::Version => "version",
        }
    }
}
