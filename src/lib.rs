//! # mcclient
//!
//! A memcached client focused on the client-side encoding layer:
//! - Typed values tagged with wire flags (raw, integer, long, object)
//! - Optional LZ4 compression, kept only when it shrinks the payload
//! - Key validation before anything touches the network
//! - A per-client CAS token cache so `cas()` works across calls
//! - Lazy connect, self-healing liveness checks, optional errors-as-misses
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Client                              │
//! │     get / gets / set / add / replace / append / prepend      │
//! │     cas / incr / decr / delete / get_multi / gets_multi      │
//! └──────┬──────────────┬───────────────┬───────────────┬───────┘
//!        │              │               │               │
//!        ▼              ▼               ▼               ▼
//! ┌─────────────┐ ┌─────────────┐ ┌─────────────┐ ┌─────────────┐
//! │KeyValidator │ │ ValueCodec  │ │ CasRegistry │ │ Connection  │
//! │  (key.rs)   │ │  (codec/)   │ │  (cas.rs)   │ │ (network/)  │
//! └─────────────┘ └─────────────┘ └─────────────┘ └──────┬──────┘
//!                                                        │
//!                                                        ▼
//!                                                 ┌─────────────┐
//!                                                 │  Transport  │
//!                                                 │  (driver)   │
//!                                                 └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use mcclient::{Client, ClientConfig, StoreOptions, Value};
//! use mcclient::network::MemoryServer;
//!
//! let server = MemoryServer::new();
//! let mut client = Client::new(ClientConfig::default(), server.connector());
//!
//! client.set("answer", 42, StoreOptions::default()).unwrap();
//! assert_eq!(client.get("answer").unwrap(), Some(Value::Int(42)));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod key;
pub mod codec;
pub mod cas;
pub mod protocol;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CacheError, KeyError, Result, ValueError};
pub use config::ClientConfig;
pub use key::{Key, KeySource, KeyValidator};
pub use codec::{Flags, Encoding, StoredValue, Value, ValueCodec};
pub use cas::{CasRegistry, CasToken};
pub use client::{Client, SharedClient, StoreOptions};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of mcclient
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
