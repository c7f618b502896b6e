//! In-memory transport
//!
//! An in-process stand-in for a memcached server. Every transport opened
//! through a [`MemoryConnector`] shares the state of one [`MemoryServer`],
//! so several clients see each other's writes the way they would against a
//! real server.
//!
//! Besides cache semantics the server records every socket-level call and
//! every command it receives, and can inject faults:
//! - [`MemoryServer::set_down`] refuses new connects and kills live ones
//! - [`MemoryServer::kill_connections`] drops every live transport
//! - [`MemoryServer::fail_next`] makes the next commands fail with a timeout

use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};
use parking_lot::Mutex;

use crate::key::Key;
use crate::protocol::{Command, Item, Response, StoreMode, StoreStatus};

use super::transport::{Connector, Transport};

/// Default version string reported by `version`
pub const MEMORY_SERVER_VERSION: &str = "1.6.21";

/// Socket-level calls observed by the server, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Open { addr: String },
    SetTimeout(Option<Duration>),
    Connect,
    SetNodelay(bool),
    Close,
}

#[derive(Debug, Clone)]
struct StoredItem {
    data: Bytes,
    flags: u32,
    cas: u64,
    expires_at: Option<Instant>,
}

impl StoredItem {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }
}

#[derive(Debug, Default)]
struct ServerState {
    items: HashMap<Key, StoredItem>,
    next_cas: u64,
    version: String,

    // -------------------------------------------------------------------------
    // Fault injection
    // -------------------------------------------------------------------------
    down: bool,
    fail_next: usize,
    /// Bumped to invalidate every live transport
    generation: u64,

    // -------------------------------------------------------------------------
    // Observability
    // -------------------------------------------------------------------------
    events: Vec<TransportEvent>,
    commands: Vec<Command>,
    connections: u64,
    get_hits: u64,
    get_misses: u64,
    cmd_set: u64,
}

impl ServerState {
    fn next_cas(&mut self) -> u64 {
        self.next_cas += 1;
        self.next_cas
    }

    /// Look up a key, evicting it first if it has expired
    fn live(&mut self, key: &Key) -> Option<&mut StoredItem> {
        let now = Instant::now();
        if self.items.get(key).map(|item| item.is_expired(now)).unwrap_or(false) {
            self.items.remove(key);
        }
        self.items.get_mut(key)
    }

    fn fetch(&mut self, key: &Key, with_cas: bool) -> Option<Item> {
        let item = match self.live(key) {
            Some(stored) => {
                let item = Item::new(stored.data.clone(), stored.flags);
                if with_cas {
                    Some(item.with_cas(stored.cas))
                } else {
                    Some(item)
                }
            }
            None => None,
        };

        if item.is_some() {
            self.get_hits += 1;
        } else {
            self.get_misses += 1;
        }
        item
    }

    fn fetch_many(&mut self, keys: Vec<Key>, with_cas: bool) -> HashMap<Key, Item> {
        let mut found = HashMap::with_capacity(keys.len());
        for key in keys {
            if let Some(item) = self.fetch(&key, with_cas) {
                found.insert(key, item);
            }
        }
        found
    }

    fn put(&mut self, key: Key, data: Bytes, flags: u32, ttl: u32) {
        let cas = self.next_cas();
        let expires_at = if ttl > 0 {
            Some(Instant::now() + Duration::from_secs(u64::from(ttl)))
        } else {
            None
        };
        self.items.insert(
            key,
            StoredItem {
                data,
                flags,
                cas,
                expires_at,
            },
        );
    }

    fn store(&mut self, mode: StoreMode, key: Key, value: Bytes, ttl: u32, flags: u32) -> StoreStatus {
        self.cmd_set += 1;
        let exists = self.live(&key).is_some();

        match mode {
            StoreMode::Set => {
                self.put(key, value, flags, ttl);
                StoreStatus::Stored
            }
            StoreMode::Add if exists => StoreStatus::NotStored,
            StoreMode::Add => {
                self.put(key, value, flags, ttl);
                StoreStatus::Stored
            }
            StoreMode::Replace if !exists => StoreStatus::NotStored,
            StoreMode::Replace => {
                self.put(key, value, flags, ttl);
                StoreStatus::Stored
            }
            StoreMode::Append | StoreMode::Prepend => {
                let cas = self.next_cas();
                // Flags and ttl of the existing item are kept
                match self.live(&key) {
                    Some(item) => {
                        let mut joined = BytesMut::with_capacity(item.data.len() + value.len());
                        if mode == StoreMode::Append {
                            joined.extend_from_slice(&item.data);
                            joined.extend_from_slice(&value);
                        } else {
                            joined.extend_from_slice(&value);
                            joined.extend_from_slice(&item.data);
                        }
                        item.data = joined.freeze();
                        item.cas = cas;
                        StoreStatus::Stored
                    }
                    None => StoreStatus::NotStored,
                }
            }
        }
    }

    fn cas(&mut self, key: Key, value: Bytes, token: u64, ttl: u32, flags: u32) -> StoreStatus {
        self.cmd_set += 1;
        let current = self.live(&key).map(|item| item.cas);
        match current {
            None => StoreStatus::NotFound,
            Some(cas) if cas != token => StoreStatus::Exists,
            Some(_) => {
                self.put(key, value, flags, ttl);
                StoreStatus::Stored
            }
        }
    }

    /// incr wraps at 2^64, decr stops at zero; flags are left untouched
    fn counter(&mut self, key: &Key, amount: u64, increment: bool) -> Response {
        let current = match self.live(key) {
            Some(item) => std::str::from_utf8(&item.data)
                .ok()
                .and_then(|text| text.trim().parse::<u64>().ok()),
            None => return Response::Counter(None),
        };

        let current = match current {
            Some(n) => n,
            None => {
                return Response::Error(
                    "cannot increment or decrement non-numeric value".to_string(),
                )
            }
        };

        let next = if increment {
            current.wrapping_add(amount)
        } else {
            current.saturating_sub(amount)
        };

        let cas = self.next_cas();
        if let Some(item) = self.items.get_mut(key) {
            item.data = Bytes::from(next.to_string());
            item.cas = cas;
        }
        Response::Counter(Some(next))
    }

    /// Expired items count as missing
    fn delete(&mut self, key: &Key) -> bool {
        let found = self.live(key).is_some();
        if found {
            self.items.remove(key);
        }
        found
    }

    fn stats(&self) -> HashMap<String, String> {
        let mut stats = HashMap::new();
        stats.insert("version".to_string(), self.version.clone());
        stats.insert("curr_items".to_string(), self.items.len().to_string());
        stats.insert("total_connections".to_string(), self.connections.to_string());
        stats.insert("cmd_get".to_string(), (self.get_hits + self.get_misses).to_string());
        stats.insert("cmd_set".to_string(), self.cmd_set.to_string());
        stats.insert("get_hits".to_string(), self.get_hits.to_string());
        stats.insert("get_misses".to_string(), self.get_misses.to_string());
        stats
    }

    fn apply(&mut self, command: Command) -> Response {
        match command {
            Command::Get { key } => Response::Item(self.fetch(&key, false)),
            Command::Gets { key } => Response::Item(self.fetch(&key, true)),
            Command::GetMulti { keys } => Response::Items(self.fetch_many(keys, false)),
            Command::GetsMulti { keys } => Response::Items(self.fetch_many(keys, true)),
            Command::Store {
                mode,
                key,
                value,
                ttl,
                flags,
            } => Response::Store(self.store(mode, key, value, ttl, flags)),
            Command::Cas {
                key,
                value,
                cas,
                ttl,
                flags,
            } => Response::Store(self.cas(key, value, cas, ttl, flags)),
            Command::Incr { key, amount } => self.counter(&key, amount, true),
            Command::Decr { key, amount } => self.counter(&key, amount, false),
            Command::Delete { key } => Response::Deleted(self.delete(&key)),
            Command::FlushAll => {
                self.items.clear();
                Response::Ok
            }
            Command::Stats => Response::Stats(self.stats()),
            Command::Version => Response::Version(self.version.clone()),
        }
    }
}

/// Shared in-memory cache state
#[derive(Debug, Clone)]
pub struct MemoryServer {
    state: Arc<Mutex<ServerState>>,
}

impl Default for MemoryServer {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryServer {
    pub fn new() -> Self {
        Self::with_version(MEMORY_SERVER_VERSION)
    }

    pub fn with_version(version: impl Into<String>) -> Self {
        let state = ServerState {
            version: version.into(),
            ..ServerState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Connector handing out transports bound to this server
    pub fn connector(&self) -> MemoryConnector {
        MemoryConnector {
            server: self.clone(),
        }
    }

    // =========================================================================
    // Fault Injection
    // =========================================================================

    /// While down, connects are refused and live transports report dead
    pub fn set_down(&self, down: bool) {
        let mut state = self.state.lock();
        state.down = down;
        if down {
            state.generation += 1;
        }
    }

    /// Drop every live transport; new connects still succeed
    pub fn kill_connections(&self) {
        self.state.lock().generation += 1;
    }

    /// Fail the next `count` commands with a timeout
    pub fn fail_next(&self, count: usize) {
        self.state.lock().fail_next = count;
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Socket-level calls seen so far
    pub fn events(&self) -> Vec<TransportEvent> {
        self.state.lock().events.clone()
    }

    /// Commands received so far
    pub fn commands(&self) -> Vec<Command> {
        self.state.lock().commands.clone()
    }

    /// Forget recorded events and commands
    pub fn clear_history(&self) {
        let mut state = self.state.lock();
        state.events.clear();
        state.commands.clear();
    }

    /// Number of successful connects
    pub fn connections(&self) -> u64 {
        self.state.lock().connections
    }

    /// Stored bytes and flags for a key, bypassing the client codec
    pub fn raw(&self, key: &[u8]) -> Option<(Bytes, u32)> {
        let state = self.state.lock();
        state.items.get(key).map(|item| (item.data.clone(), item.flags))
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    fn record(&self, event: TransportEvent) {
        self.state.lock().events.push(event);
    }
}

/// Opens [`MemoryTransport`]s against one [`MemoryServer`]
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    server: MemoryServer,
}

impl MemoryConnector {
    pub fn server(&self) -> &MemoryServer {
        &self.server
    }
}

impl Connector for MemoryConnector {
    type Transport = MemoryTransport;

    fn open(&self, addr: &str) -> io::Result<MemoryTransport> {
        self.server.record(TransportEvent::Open {
            addr: addr.to_string(),
        });
        Ok(MemoryTransport {
            server: self.server.clone(),
            generation: None,
            timeout: None,
            nodelay: false,
        })
    }
}

/// One session against a [`MemoryServer`]
#[derive(Debug)]
pub struct MemoryTransport {
    server: MemoryServer,

    /// Server generation captured at connect, `None` until connected
    generation: Option<u64>,

    timeout: Option<Duration>,
    nodelay: bool,
}

impl MemoryTransport {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn nodelay(&self) -> bool {
        self.nodelay
    }
}

impl Transport for MemoryTransport {
    fn set_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        self.timeout = timeout;
        self.server.record(TransportEvent::SetTimeout(timeout));
        Ok(())
    }

    fn set_nodelay(&mut self, nodelay: bool) -> io::Result<()> {
        self.nodelay = nodelay;
        self.server.record(TransportEvent::SetNodelay(nodelay));
        Ok(())
    }

    fn connect(&mut self) -> io::Result<()> {
        let mut state = self.server.state.lock();
        if state.down {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "memory server is down",
            ));
        }
        state.connections += 1;
        state.events.push(TransportEvent::Connect);
        self.generation = Some(state.generation);
        Ok(())
    }

    fn close(&mut self) {
        if self.generation.take().is_some() {
            self.server.record(TransportEvent::Close);
        }
    }

    fn is_connected(&self) -> bool {
        let state = self.server.state.lock();
        !state.down && self.generation == Some(state.generation)
    }

    fn execute(&mut self, command: Command) -> io::Result<Response> {
        let mut state = self.server.state.lock();

        if state.down || self.generation != Some(state.generation) {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset by memory server",
            ));
        }

        if state.fail_next > 0 {
            state.fail_next -= 1;
            return Err(io::Error::new(io::ErrorKind::TimedOut, "injected timeout"));
        }

        state.commands.push(command.clone());
        Ok(state.apply(command))
    }
}
