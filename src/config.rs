//! Configuration for mcclient
//!
//! Centralized client configuration with sensible defaults.

use std::time::Duration;

/// Default maximum key length accepted by memcached
pub const DEFAULT_MAX_KEY_LENGTH: usize = 250;

/// Default maximum value length (memcached's 1 MB item limit)
pub const DEFAULT_MAX_VALUE_LENGTH: usize = 1_000_000;

/// Main configuration for a client instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    // -------------------------------------------------------------------------
    // Server Address
    // -------------------------------------------------------------------------
    /// Server host name or IP
    pub host: String,

    /// Server TCP port
    pub port: u16,

    // -------------------------------------------------------------------------
    // Timeouts
    // -------------------------------------------------------------------------
    /// Timeout applied while the transport performs its handshake
    /// (milliseconds, 0 = none)
    pub connect_timeout_ms: u64,

    /// Steady-state timeout for every command after connect
    /// (milliseconds, 0 = none)
    pub timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Size Limits (0 = unlimited)
    // -------------------------------------------------------------------------
    /// Longest key accepted by the validator, in bytes
    pub max_key_length: usize,

    /// Largest encoded (and possibly compressed) value, in bytes
    pub max_value_length: usize,

    // -------------------------------------------------------------------------
    // Behavior Switches
    // -------------------------------------------------------------------------
    /// Allow non-primitive values to be stored through the serializer
    pub enable_serialization: bool,

    /// Disable Nagle's algorithm on the transport socket
    pub disable_small_packet_coalescing: bool,

    /// Remember CAS tokens observed by `gets`/`gets_multi`
    pub cache_cas_tokens: bool,

    /// Turn transport failures into cache misses instead of errors
    pub treat_errors_as_miss: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 11211,
            connect_timeout_ms: 3000,
            timeout_ms: 3000,
            max_key_length: DEFAULT_MAX_KEY_LENGTH,
            max_value_length: DEFAULT_MAX_VALUE_LENGTH,
            enable_serialization: true,
            disable_small_packet_coalescing: true,
            cache_cas_tokens: false,
            treat_errors_as_miss: false,
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Server address in `host:port` form
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Connect-phase timeout, `None` when disabled
    pub fn connect_timeout(&self) -> Option<Duration> {
        millis(self.connect_timeout_ms)
    }

    /// Steady-state timeout, `None` when disabled
    pub fn timeout(&self) -> Option<Duration> {
        millis(self.timeout_ms)
    }
}

fn millis(ms: u64) -> Option<Duration> {
    if ms > 0 {
        Some(Duration::from_millis(ms))
    } else {
        None
    }
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the server host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the connect-phase timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the steady-state timeout (in milliseconds)
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeout_ms = ms;
        self
    }

    /// Set the maximum key length (0 disables the check)
    pub fn max_key_length(mut self, len: usize) -> Self {
        self.config.max_key_length = len;
        self
    }

    /// Set the maximum value length (0 disables the check)
    pub fn max_value_length(mut self, len: usize) -> Self {
        self.config.max_value_length = len;
        self
    }

    /// Allow or refuse serialized object values
    pub fn enable_serialization(mut self, enabled: bool) -> Self {
        self.config.enable_serialization = enabled;
        self
    }

    /// Disable small-packet coalescing (TCP_NODELAY) on connect
    pub fn disable_small_packet_coalescing(mut self, disabled: bool) -> Self {
        self.config.disable_small_packet_coalescing = disabled;
        self
    }

    /// Remember CAS tokens from `gets` reads
    pub fn cache_cas_tokens(mut self, enabled: bool) -> Self {
        self.config.cache_cas_tokens = enabled;
        self
    }

    /// Report transport failures as misses
    pub fn treat_errors_as_miss(mut self, enabled: bool) -> Self {
        self.config.treat_errors_as_miss = enabled;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}
