//! Response definitions
//!
//! Represents what a transport hands back for each command.

use std::collections::HashMap;

use bytes::Bytes;

use crate::cas::CasToken;
use crate::key::Key;

/// A stored item as returned by a retrieval command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Stored bytes, still encoded
    pub data: Bytes,

    /// Wire flags stored with the bytes
    pub flags: u32,

    /// CAS token, present for `gets`/`gets_multi`
    pub cas: Option<CasToken>,
}

impl Item {
    pub fn new(data: impl Into<Bytes>, flags: u32) -> Self {
        Self {
            data: data.into(),
            flags,
            cas: None,
        }
    }

    pub fn with_cas(mut self, cas: CasToken) -> Self {
        self.cas = Some(cas);
        self
    }
}

/// Outcome of a storage command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    Stored,
    NotStored,
    /// CAS conflict: the item changed since the token was issued
    Exists,
    NotFound,
}

impl StoreStatus {
    pub fn is_stored(self) -> bool {
        self == StoreStatus::Stored
    }
}

/// A transport response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// `get` / `gets`, `None` on miss
    Item(Option<Item>),

    /// `get_multi` / `gets_multi`, hits only
    Items(HashMap<Key, Item>),

    /// Storage commands and `cas`
    Store(StoreStatus),

    /// `incr` / `decr`, `None` when the key is missing
    Counter(Option<u64>),

    /// `delete`
    Deleted(bool),

    /// `flush_all`
    Ok,

    /// `stats`
    Stats(HashMap<String, String>),

    /// `version`
    Version(String),

    /// The server refused the command (CLIENT_ERROR / SERVER_ERROR)
    Error(String),
}
