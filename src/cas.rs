//! CAS token registry
//!
//! Remembers the last CAS token observed for each key so `cas()` can run
//! without the caller threading tokens around. Owned by a single client,
//! never shared, never persisted.

use std::collections::HashMap;

use crate::key::Key;

/// Opaque version marker returned by `gets`
pub type CasToken = u64;

/// Per-client map of key to most recently observed CAS token
#[derive(Debug, Default)]
pub struct CasRegistry {
    /// Writes are dropped while disabled
    enabled: bool,

    tokens: HashMap<Key, CasToken>,
}

impl CasRegistry {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            tokens: HashMap::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Toggle caching; tokens already held are kept
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Record a token for a key, replacing any older one
    pub fn remember(&mut self, key: Key, token: CasToken) {
        if self.enabled {
            self.tokens.insert(key, token);
        }
    }

    /// Look up the token for a key
    pub fn get(&self, key: &[u8]) -> Option<CasToken> {
        self.tokens.get(key).copied()
    }

    /// Drop the token for one key
    pub fn forget(&mut self, key: &[u8]) -> Option<CasToken> {
        self.tokens.remove(key)
    }

    /// Drop every token
    pub fn reset(&mut self) {
        self.tokens.clear();
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
