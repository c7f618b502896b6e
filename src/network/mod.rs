//! Network Module
//!
//! Connection lifecycle and the transport boundary.
//!
//! ## Architecture
//! - `Connector` opens a `Transport` for `host:port`
//! - `Connection` owns at most one transport and reconnects on demand
//! - `memory` provides an in-process transport with memcached semantics

mod connection;
mod memory;
mod transport;

pub use connection::{Connection, ConnectionState};
pub use memory::{MemoryConnector, MemoryServer, MemoryTransport, TransportEvent, MEMORY_SERVER_VERSION};
pub use transport::{Connector, Transport};
