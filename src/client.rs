//! Client Module
//!
//! The public operation surface. Each call validates keys, encodes values,
//! and issues exactly one command on the client's connection.
//!
//! ## Failure Policy
//! - Key and value errors are raised before anything is sent
//! - A transport failure (I/O error or a response of the wrong shape)
//!   closes the connection, then is returned, or turned into the
//!   operation's miss result when `treat_errors_as_miss` is set
//! - Server-reported errors are returned and leave the session open
//!
//! ## Concurrency
//! Every operation takes `&mut self`: one client is one session. Share a
//! client across threads through [`SharedClient`], or use one per thread.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::cas::{CasRegistry, CasToken};
use crate::codec::{StoredValue, Value, ValueCodec};
use crate::config::ClientConfig;
use crate::error::{CacheError, Result};
use crate::key::{Key, KeySource, KeyValidator};
use crate::network::{Connection, ConnectionState, Connector};
use crate::protocol::{Command, Item, Response, StoreMode};

/// A client behind a mutex, for callers that must share one session
pub type SharedClient<C> = Arc<Mutex<Client<C>>>;

/// Per-call storage options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOptions {
    /// Expiration in seconds (0 = never)
    pub ttl: u32,

    /// Compress payloads longer than this many bytes (0 = never)
    pub min_compress_len: usize,
}

impl StoreOptions {
    /// Options with an expiration and no compression
    pub fn ttl(ttl: u32) -> Self {
        Self {
            ttl,
            min_compress_len: 0,
        }
    }

    /// Same options with a compression threshold
    pub fn compress_over(mut self, min_compress_len: usize) -> Self {
        self.min_compress_len = min_compress_len;
        self
    }
}

/// Memcached client for a single server
pub struct Client<C: Connector> {
    config: ClientConfig,
    validator: KeyValidator,
    codec: ValueCodec,
    cas: CasRegistry,
    connection: Connection<C>,
}

impl<C: Connector> Client<C> {
    /// Create a client; the connection is opened on first use
    pub fn new(config: ClientConfig, connector: C) -> Self {
        let connection = Connection::new(connector, &config);
        Self {
            validator: KeyValidator::new(config.max_key_length),
            codec: ValueCodec::from_config(&config),
            cas: CasRegistry::new(config.cache_cas_tokens),
            connection,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn validator(&self) -> &KeyValidator {
        &self.validator
    }

    pub fn codec(&self) -> &ValueCodec {
        &self.codec
    }

    pub fn connection(&self) -> &Connection<C> {
        &self.connection
    }

    /// Wrap the client for sharing across threads
    pub fn into_shared(self) -> SharedClient<C> {
        Arc::new(Mutex::new(self))
    }

    // =========================================================================
    // Connection Lifecycle
    // =========================================================================

    /// Open the connection; with `reconnect` an open one is replaced
    pub fn connect(&mut self, reconnect: bool) -> Result<()> {
        self.connection.connect(reconnect)?;
        Ok(())
    }

    pub fn close(&mut self) {
        self.connection.close();
    }

    /// Alias for [`Client::close`]
    pub fn disconnect(&mut self) {
        self.connection.disconnect();
    }

    /// Probe the connection, dropping it if the transport died
    pub fn is_connected(&mut self) -> bool {
        self.connection.is_connected()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    // =========================================================================
    // CAS Registry
    // =========================================================================

    pub fn cache_cas(&self) -> bool {
        self.cas.is_enabled()
    }

    /// Turn CAS token caching on or off for later reads
    pub fn set_cache_cas(&mut self, enabled: bool) {
        self.cas.set_enabled(enabled);
    }

    /// Forget every remembered CAS token
    pub fn reset_cas(&mut self) {
        self.cas.reset();
    }

    /// Reset per-session client state
    pub fn reset_client(&mut self) {
        self.reset_cas();
    }

    /// Token remembered for a key, if any
    pub fn cas_token<K: KeySource + ?Sized>(&self, key: &K) -> Option<CasToken> {
        let bytes = key.key_bytes().ok()?;
        self.cas.get(&bytes)
    }

    pub fn cas_registry(&self) -> &CasRegistry {
        &self.cas
    }

    // =========================================================================
    // Storage Commands
    // =========================================================================

    /// Store a value unconditionally
    pub fn set<K, V>(&mut self, key: &K, value: V, options: StoreOptions) -> Result<bool>
    where
        K: KeySource + ?Sized,
        V: Into<Value>,
    {
        self.store(StoreMode::Set, key, value, options)
    }

    /// Store only if the key does not exist
    pub fn add<K, V>(&mut self, key: &K, value: V, options: StoreOptions) -> Result<bool>
    where
        K: KeySource + ?Sized,
        V: Into<Value>,
    {
        self.store(StoreMode::Add, key, value, options)
    }

    /// Store only if the key already exists
    pub fn replace<K, V>(&mut self, key: &K, value: V, options: StoreOptions) -> Result<bool>
    where
        K: KeySource + ?Sized,
        V: Into<Value>,
    {
        self.store(StoreMode::Replace, key, value, options)
    }

    /// Append to an existing value
    pub fn append<K, V>(&mut self, key: &K, value: V, options: StoreOptions) -> Result<bool>
    where
        K: KeySource + ?Sized,
        V: Into<Value>,
    {
        self.store(StoreMode::Append, key, value, options)
    }

    /// Prepend to an existing value
    pub fn prepend<K, V>(&mut self, key: &K, value: V, options: StoreOptions) -> Result<bool>
    where
        K: KeySource + ?Sized,
        V: Into<Value>,
    {
        self.store(StoreMode::Prepend, key, value, options)
    }

    /// Run any storage command; returns true when the server stored the value
    pub fn store<K, V>(&mut self, mode: StoreMode, key: &K, value: V, options: StoreOptions) -> Result<bool>
    where
        K: KeySource + ?Sized,
        V: Into<Value>,
    {
        let key = self.validate(key)?;
        let stored = self.encode(value.into(), options)?;
        self.store_encoded(mode, key, stored, options.ttl)
    }

    /// Compare-and-swap with the remembered token, or a plain set without one
    ///
    /// Returns false when the item changed since the token was observed
    /// (or vanished). Conflicts are not retried.
    pub fn cas<K, V>(&mut self, key: &K, value: V, options: StoreOptions) -> Result<bool>
    where
        K: KeySource + ?Sized,
        V: Into<Value>,
    {
        let key = self.validate(key)?;
        let stored = self.encode(value.into(), options)?;

        let token = match self.cas.get(&key) {
            Some(token) => token,
            None => {
                tracing::trace!("No CAS token for {}, storing with set", key);
                return self.store_encoded(StoreMode::Set, key, stored, options.ttl);
            }
        };

        let command = Command::Cas {
            flags: stored.bits(),
            value: stored.data,
            key,
            cas: token,
            ttl: options.ttl,
        };
        self.call(command, |response| match response {
            Response::Store(status) => Some(status.is_stored()),
            _ => None,
        })
    }

    fn store_encoded(&mut self, mode: StoreMode, key: Key, stored: StoredValue, ttl: u32) -> Result<bool> {
        let command = Command::Store {
            mode,
            flags: stored.bits(),
            value: stored.data,
            key,
            ttl,
        };
        self.call(command, |response| match response {
            Response::Store(status) => Some(status.is_stored()),
            _ => None,
        })
    }

    // =========================================================================
    // Retrieval Commands
    // =========================================================================

    /// Fetch a value
    ///
    /// A missing key and a stored empty payload both come back as `None`.
    pub fn get<K: KeySource + ?Sized>(&mut self, key: &K) -> Result<Option<Value>> {
        let key = self.validate(key)?;
        let item = self.call(Command::Get { key }, single_item)?;
        self.decode_hit(item)
    }

    /// Fetch a value and remember its CAS token (when caching is on)
    pub fn gets<K: KeySource + ?Sized>(&mut self, key: &K) -> Result<Option<Value>> {
        let key = self.validate(key)?;
        let item = self.call(Command::Gets { key: key.clone() }, single_item)?;

        if let Some(token) = item.as_ref().and_then(|item| item.cas) {
            self.cas.remember(key, token);
        }

        self.decode_hit(item)
    }

    /// Fetch many values in one command; missing keys are left out
    pub fn get_multi<I, K>(&mut self, keys: I) -> Result<HashMap<Key, Value>>
    where
        I: IntoIterator<Item = K>,
        K: KeySource,
    {
        let keys = self.validate_all(keys)?;
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let items = self.call(Command::GetMulti { keys }, many_items)?;
        self.decode_items(items)
    }

    /// Fetch many values and remember each returned CAS token
    pub fn gets_multi<I, K>(&mut self, keys: I) -> Result<HashMap<Key, Value>>
    where
        I: IntoIterator<Item = K>,
        K: KeySource,
    {
        let keys = self.validate_all(keys)?;
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let items = self.call(Command::GetsMulti { keys }, many_items)?;

        for (key, item) in &items {
            if let Some(token) = item.cas {
                self.cas.remember(key.clone(), token);
            }
        }

        self.decode_items(items)
    }

    // =========================================================================
    // Counters
    // =========================================================================

    /// Increment a counter; `None` if the key does not exist
    ///
    /// The stored flags are kept, so a counter stored as a string stays a
    /// string.
    pub fn incr<K: KeySource + ?Sized>(&mut self, key: &K, amount: u64) -> Result<Option<u64>> {
        let key = self.validate(key)?;
        self.call(Command::Incr { key, amount }, counter)
    }

    /// Decrement a counter (stops at zero); `None` if the key does not exist
    pub fn decr<K: KeySource + ?Sized>(&mut self, key: &K, amount: u64) -> Result<Option<u64>> {
        let key = self.validate(key)?;
        self.call(Command::Decr { key, amount }, counter)
    }

    // =========================================================================
    // Housekeeping
    // =========================================================================

    /// Remove a key; true if it existed
    pub fn delete<K: KeySource + ?Sized>(&mut self, key: &K) -> Result<bool> {
        let key = self.validate(key)?;
        self.call(Command::Delete { key }, |response| match response {
            Response::Deleted(deleted) => Some(deleted),
            _ => None,
        })
    }

    /// Invalidate every item on the server
    pub fn flush_all(&mut self) -> Result<()> {
        self.call(Command::FlushAll, |response| match response {
            Response::Ok => Some(()),
            _ => None,
        })
    }

    pub fn stats(&mut self) -> Result<HashMap<String, String>> {
        self.call(Command::Stats, |response| match response {
            Response::Stats(stats) => Some(stats),
            _ => None,
        })
    }

    pub fn version(&mut self) -> Result<String> {
        self.call(Command::Version, |response| match response {
            Response::Version(version) => Some(version),
            _ => None,
        })
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn validate<K: KeySource + ?Sized>(&self, key: &K) -> Result<Key> {
        Ok(self.validator.validate(key)?)
    }

    /// Validate every key before anything is sent
    fn validate_all<I, K>(&self, keys: I) -> Result<Vec<Key>>
    where
        I: IntoIterator<Item = K>,
        K: KeySource,
    {
        keys.into_iter().map(|key| self.validate(&key)).collect()
    }

    fn encode(&self, value: Value, options: StoreOptions) -> Result<StoredValue> {
        self.codec.encode(&value, options.min_compress_len)
    }

    fn decode_hit(&self, item: Option<Item>) -> Result<Option<Value>> {
        match item {
            Some(item) if !item.data.is_empty() => self.codec.decode(item.data, item.flags).map(Some),
            _ => Ok(None),
        }
    }

    fn decode_items(&self, items: HashMap<Key, Item>) -> Result<HashMap<Key, Value>> {
        items
            .into_iter()
            .map(|(key, item)| Ok((key, self.codec.decode(item.data, item.flags)?)))
            .collect()
    }

    /// Send one command and pick the expected response apart
    ///
    /// Transport failures close the connection; with `treat_errors_as_miss`
    /// they become `T::default()`.
    fn call<T, F>(&mut self, command: Command, extract: F) -> Result<T>
    where
        T: Default,
        F: FnOnce(Response) -> Option<T>,
    {
        let name = command.name();

        let outcome = match self.connection.execute(command) {
            Ok(Response::Error(message)) => return Err(CacheError::Server(message)),
            Ok(response) => extract(response).ok_or(CacheError::UnexpectedResponse { command: name }),
            Err(e) => Err(CacheError::Io(e)),
        };

        match outcome {
            Ok(value) => Ok(value),
            Err(e) => {
                self.connection.close();
                if self.config.treat_errors_as_miss {
                    tracing::warn!("{} failed, reporting a miss: {}", name, e);
                    Ok(T::default())
                } else {
                    Err(e)
                }
            }
        }
    }
}

fn single_item(response: Response) -> Option<Option<Item>> {
    match response {
        Response::Item(item) => Some(item),
        _ => None,
    }
}

fn many_items(response: Response) -> Option<HashMap<Key, Item>> {
    match response {
        Response::Items(items) => Some(items),
        _ => None,
    }
}

fn counter(response: Response) -> Option<Option<u64>> {
    match response {
        Response::Counter(value) => Some(value),
        _ => None,
    }
}
