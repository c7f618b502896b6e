//! Transport boundary
//!
//! A transport owns one socket to one server and speaks the wire protocol.
//! The client only drives its lifecycle and hands it commands.

use std::io;
use std::time::Duration;

use crate::protocol::{Command, Response};

/// One socket-backed session with a cache server
pub trait Transport {
    /// Apply a read/write timeout to the underlying socket
    fn set_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()>;

    /// Enable or disable TCP_NODELAY
    fn set_nodelay(&mut self, nodelay: bool) -> io::Result<()>;

    /// Perform the connect handshake
    fn connect(&mut self) -> io::Result<()>;

    /// Release the socket; must be safe to call more than once
    fn close(&mut self);

    /// Whether the socket is still usable
    fn is_connected(&self) -> bool;

    /// Run one command and return its response
    fn execute(&mut self, command: Command) -> io::Result<Response>;
}

/// Opens transports for an address
pub trait Connector {
    type Transport: Transport;

    /// Create an unconnected transport for `addr` (`host:port`)
    fn open(&self, addr: &str) -> io::Result<Self::Transport>;
}
