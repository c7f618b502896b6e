//! Connection Handler
//!
//! Guards the single transport owned by a client and tracks whether it is
//! usable.
//!
//! ## States
//! ```text
//!                connect()
//!  Disconnected ───────────► Connected
//!       ▲                        │
//!       └────────────────────────┘
//!   close() / dead transport / I/O error
//! ```

use std::io;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::protocol::{Command, Response};

use super::transport::{Connector, Transport};

/// Whether the client currently holds a live session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Lazily (re)connecting wrapper around one transport
pub struct Connection<C: Connector> {
    /// Factory for new transports
    connector: C,

    /// Server address, `host:port`
    addr: String,

    /// Timeout while the handshake runs
    connect_timeout: Option<Duration>,

    /// Timeout for every command after connect
    timeout: Option<Duration>,

    /// Disable Nagle's algorithm after connect
    nodelay: bool,

    state: ConnectionState,

    transport: Option<C::Transport>,
}

impl<C: Connector> Connection<C> {
    /// Create a disconnected handle; nothing is opened until first use
    pub fn new(connector: C, config: &ClientConfig) -> Self {
        Self {
            connector,
            addr: config.addr(),
            connect_timeout: config.connect_timeout(),
            timeout: config.timeout(),
            nodelay: config.disable_small_packet_coalescing,
            state: ConnectionState::Disconnected,
            transport: None,
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Local state, without probing the transport
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The live transport, if any
    pub fn transport(&self) -> Option<&C::Transport> {
        self.transport.as_ref()
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Open a session
    ///
    /// No-op when already connected unless `reconnect` is set, in which
    /// case the current transport is closed first. On failure the state
    /// stays `Disconnected`.
    pub fn connect(&mut self, reconnect: bool) -> io::Result<()> {
        if self.state == ConnectionState::Connected && !reconnect {
            return Ok(());
        }

        self.close();

        let mut transport = self.connector.open(&self.addr)?;
        if let Err(e) = self.handshake(&mut transport) {
            tracing::warn!("Connect to {} failed: {}", self.addr, e);
            transport.close();
            return Err(e);
        }

        tracing::debug!("Connected to {}", self.addr);
        self.transport = Some(transport);
        self.state = ConnectionState::Connected;
        Ok(())
    }

    /// Connect-phase timeout, handshake, steady-state timeout, then nodelay
    fn handshake(&self, transport: &mut C::Transport) -> io::Result<()> {
        transport.set_timeout(self.connect_timeout)?;
        transport.connect()?;
        transport.set_timeout(self.timeout)?;
        if self.nodelay {
            transport.set_nodelay(true)?;
        }
        Ok(())
    }

    /// Release the transport; safe to call when already closed
    pub fn close(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
            tracing::debug!("Closed connection to {}", self.addr);
        }
        self.state = ConnectionState::Disconnected;
    }

    /// Alias for [`Connection::close`]
    pub fn disconnect(&mut self) {
        self.close();
    }

    /// True only if locally connected and the transport reports alive
    ///
    /// A dead transport is dropped and the state reset as a side effect.
    pub fn is_connected(&mut self) -> bool {
        if self.state != ConnectionState::Connected {
            return false;
        }

        let alive = match &self.transport {
            Some(transport) => transport.is_connected(),
            None => false,
        };

        if !alive {
            tracing::debug!("Transport to {} is no longer alive", self.addr);
            self.transport = None;
            self.state = ConnectionState::Disconnected;
        }

        alive
    }

    /// Connect if the session is not usable
    pub fn ensure_connected(&mut self) -> io::Result<()> {
        if !self.is_connected() {
            self.connect(false)?;
        }
        Ok(())
    }

    /// Run one command, connecting first if needed
    ///
    /// Any I/O error closes the session before it is returned.
    pub fn execute(&mut self, command: Command) -> io::Result<Response> {
        self.ensure_connected()?;

        let transport = self.transport.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "no transport after connect")
        })?;

        tracing::trace!("Sending {} to {}", command.name(), self.addr);

        match transport.execute(command) {
            Ok(response) => Ok(response),
            Err(e) => {
                tracing::warn!("Transport error on {}: {}", self.addr, e);
                self.close();
                Err(e)
            }
        }
    }
}
