//! Configuration for Parchment
//!
//! Centralized client configuration with sensible defaults.

use std::time::Duration;

/// Configuration for client connections and buffer pooling
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP connect timeout (milliseconds)
    pub connect_timeout_ms: u64,

    /// Default read timeout applied while awaiting a reply (milliseconds).
    /// A write concern's own timeout, when present, takes precedence.
    pub read_timeout_ms: u64,

    /// Write timeout for outbound sends (milliseconds)
    pub write_timeout_ms: u64,

    /// Disable Nagle's algorithm for low latency
    pub nodelay: bool,

    // -------------------------------------------------------------------------
    // Buffer Pool Configuration
    // -------------------------------------------------------------------------
    /// Initial capacity of each pooled buffer (in bytes)
    pub buffer_capacity: usize,

    /// Max number of idle buffers retained by the pool
    pub max_pooled_buffers: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 10_000,
            read_timeout_ms: 30_000,
            write_timeout_ms: 30_000,
            nodelay: true,
            buffer_capacity: 64 * 1024, // 64 KB
            max_pooled_buffers: 16,
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Default read timeout as a Duration, `None` when disabled (0)
    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_ms > 0).then(|| Duration::from_millis(self.read_timeout_ms))
    }

    /// Write timeout as a Duration, `None` when disabled (0)
    pub fn write_timeout(&self) -> Option<Duration> {
        (self.write_timeout_ms > 0).then(|| Duration::from_millis(self.write_timeout_ms))
    }
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the TCP connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the default read timeout (in milliseconds, 0 disables)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds, 0 disables)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Enable or disable TCP_NODELAY
    pub fn nodelay(mut self, nodelay: bool) -> Self {
        self.config.nodelay = nodelay;
        self
    }

    /// Set the initial capacity of pooled buffers (in bytes)
    pub fn buffer_capacity(mut self, bytes: usize) -> Self {
        self.config.buffer_capacity = bytes;
        self
    }

    /// Set the max number of idle buffers the pool retains
    pub fn max_pooled_buffers(mut self, count: usize) -> Self {
        self.config.max_pooled_buffers = count;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}
