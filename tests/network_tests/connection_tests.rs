//! Connection Tests
//!
//! These tests verify:
//! - The connect handshake order (timeouts, connect, nodelay)
//! - connect() is a no-op when connected unless asked to reconnect
//! - close() is idempotent
//! - is_connected() notices dead transports and resets local state
//! - I/O errors close the session

use std::io;
use std::time::Duration;

use mcclient::config::ClientConfig;
use mcclient::network::{Connection, ConnectionState, MemoryConnector, MemoryServer, TransportEvent};
use mcclient::protocol::{Command, Response};

// =============================================================================
// Helper Functions
// =============================================================================

fn connection(server: &MemoryServer) -> Connection<MemoryConnector> {
    Connection::new(server.connector(), &ClientConfig::default())
}

fn connection_with(server: &MemoryServer, config: ClientConfig) -> Connection<MemoryConnector> {
    Connection::new(server.connector(), &config)
}

// =============================================================================
// Handshake Tests
// =============================================================================

#[test]
fn test_starts_disconnected() {
    let server = MemoryServer::new();
    let mut conn = connection(&server);

    assert_eq!(conn.state(), ConnectionState::Disconnected);
    assert!(!conn.is_connected());
    assert!(conn.transport().is_none());
    assert!(server.events().is_empty());
}

#[test]
fn test_connect_handshake_order() {
    let server = MemoryServer::new();
    let mut conn = connection(&server);

    conn.connect(false).unwrap();

    let three_seconds = Some(Duration::from_secs(3));
    assert_eq!(
        server.events(),
        vec![
            TransportEvent::Open {
                addr: "127.0.0.1:11211".to_string()
            },
            TransportEvent::SetTimeout(three_seconds),
            TransportEvent::Connect,
            TransportEvent::SetTimeout(three_seconds),
            TransportEvent::SetNodelay(true),
        ]
    );
    assert_eq!(conn.state(), ConnectionState::Connected);
    assert!(conn.is_connected());
}

#[test]
fn test_separate_connect_and_io_timeouts() {
    let server = MemoryServer::new();
    let config = ClientConfig::builder()
        .connect_timeout_ms(500)
        .timeout_ms(0)
        .build();
    let mut conn = connection_with(&server, config);

    conn.connect(false).unwrap();

    let events = server.events();
    assert_eq!(events[1], TransportEvent::SetTimeout(Some(Duration::from_millis(500))));
    assert_eq!(events[3], TransportEvent::SetTimeout(None));

    let transport = conn.transport().unwrap();
    assert_eq!(transport.timeout(), None);
    assert!(transport.nodelay());
}

#[test]
fn test_nodelay_skipped_when_coalescing_allowed() {
    let server = MemoryServer::new();
    let config = ClientConfig::builder()
        .disable_small_packet_coalescing(false)
        .build();
    let mut conn = connection_with(&server, config);

    conn.connect(false).unwrap();

    assert!(!server
        .events()
        .iter()
        .any(|event| matches!(event, TransportEvent::SetNodelay(_))));
    assert!(!conn.transport().unwrap().nodelay());
}

#[test]
fn test_custom_address() {
    let server = MemoryServer::new();
    let config = ClientConfig::builder().host("cache.local").port(11311).build();
    let mut conn = connection_with(&server, config);

    assert_eq!(conn.addr(), "cache.local:11311");
    conn.connect(false).unwrap();
    assert_eq!(
        server.events()[0],
        TransportEvent::Open {
            addr: "cache.local:11311".to_string()
        }
    );
}

// =============================================================================
// Reconnect Tests
// =============================================================================

#[test]
fn test_connect_when_connected_is_noop() {
    let server = MemoryServer::new();
    let mut conn = connection(&server);

    conn.connect(false).unwrap();
    conn.connect(false).unwrap();

    assert_eq!(server.connections(), 1);
    assert!(!server.events().contains(&TransportEvent::Close));
}

#[test]
fn test_reconnect_closes_then_reopens() {
    let server = MemoryServer::new();
    let mut conn = connection(&server);

    conn.connect(false).unwrap();
    server.clear_history();
    conn.connect(true).unwrap();

    let events = server.events();
    assert_eq!(events[0], TransportEvent::Close);
    assert!(matches!(events[1], TransportEvent::Open { .. }));
    assert_eq!(server.connections(), 2);
    assert!(conn.is_connected());
}

#[test]
fn test_connect_refused_while_server_down() {
    let server = MemoryServer::new();
    server.set_down(true);
    let mut conn = connection(&server);

    let err = conn.connect(false).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::ConnectionRefused);
    assert_eq!(conn.state(), ConnectionState::Disconnected);
    assert!(conn.transport().is_none());

    server.set_down(false);
    conn.connect(false).unwrap();
    assert!(conn.is_connected());
}

// =============================================================================
// Close Tests
// =============================================================================

#[test]
fn test_close_is_idempotent() {
    let server = MemoryServer::new();
    let mut conn = connection(&server);

    conn.close();
    conn.connect(false).unwrap();
    conn.close();
    conn.close();
    conn.disconnect();

    let closes = server
        .events()
        .into_iter()
        .filter(|event| *event == TransportEvent::Close)
        .count();
    assert_eq!(closes, 1);
    assert_eq!(conn.state(), ConnectionState::Disconnected);
}

// =============================================================================
// Liveness Tests
// =============================================================================

#[test]
fn test_is_connected_self_heals() {
    let server = MemoryServer::new();
    let mut conn = connection(&server);
    conn.connect(false).unwrap();

    server.kill_connections();

    // Local state still says connected until probed
    assert_eq!(conn.state(), ConnectionState::Connected);
    assert!(!conn.is_connected());
    assert_eq!(conn.state(), ConnectionState::Disconnected);
    assert!(conn.transport().is_none());
}

#[test]
fn test_execute_reconnects_after_dead_transport() {
    let server = MemoryServer::new();
    let mut conn = connection(&server);
    conn.connect(false).unwrap();
    server.kill_connections();

    let response = conn.execute(Command::Version).unwrap();
    assert_eq!(response, Response::Version("1.6.21".to_string()));
    assert_eq!(server.connections(), 2);
}

#[test]
fn test_execute_connects_lazily() {
    let server = MemoryServer::new();
    let mut conn = connection(&server);

    conn.execute(Command::FlushAll).unwrap();
    assert_eq!(server.connections(), 1);
    assert_eq!(server.commands(), vec![Command::FlushAll]);
}

#[test]
fn test_io_error_closes_session() {
    let server = MemoryServer::new();
    let mut conn = connection(&server);
    conn.connect(false).unwrap();

    server.fail_next(1);
    let err = conn.execute(Command::Version).unwrap_err();

    assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    assert_eq!(conn.state(), ConnectionState::Disconnected);
    assert!(server.events().contains(&TransportEvent::Close));

    // Next command opens a fresh session
    assert!(conn.execute(Command::Version).is_ok());
    assert_eq!(server.connections(), 2);
}

#[test]
fn test_execute_fails_while_server_down() {
    let server = MemoryServer::new();
    let mut conn = connection(&server);
    conn.connect(false).unwrap();
    server.set_down(true);

    let err = conn.execute(Command::Stats).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::ConnectionRefused);
    assert_eq!(conn.state(), ConnectionState::Disconnected);
}
