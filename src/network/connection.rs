//! Client Connection
//!
//! Blocking TCP connection to a document-store server: buffered framed
//! I/O, configurable timeouts, and the `Connection` capability the write
//! executor runs against.

use std::io::{BufReader, BufWriter, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::buffer::BufferPool;
use crate::config::ClientConfig;
use crate::error::{ParchmentError, Result};
use crate::protocol::{read_frame, ResponseBuffers};

/// Negotiated per-connection limits
///
/// Read fresh from the connection on every operation; a description can
/// change over a connection's lifetime (e.g. after topology changes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDescription {
    /// Max size of one wire frame, header included (in bytes)
    pub max_message_size: u32,

    /// Max wire size of a single document (in bytes)
    pub max_document_size: u32,

    /// Max number of documents batched into one frame
    pub max_write_batch_size: usize,
}

impl Default for ConnectionDescription {
    fn default() -> Self {
        Self {
            max_message_size: 16 * 1024 * 1024, // 16 MB
            max_document_size: 2 * 1024 * 1024, // 2 MB
            max_write_batch_size: 1000,
        }
    }
}

/// A connection capable of one framed request/reply exchange at a time
///
/// `send_message` transmits an accumulated buffer in a single flush;
/// `receive_message` blocks for exactly one reply frame.
pub trait Connection {
    /// Current negotiated limits
    fn description(&self) -> ConnectionDescription;

    /// Transmit raw frame bytes in one ordered flush
    fn send_message(&mut self, message: &[u8]) -> Result<()>;

    /// Block for exactly one reply frame
    fn receive_message(&mut self) -> Result<ResponseBuffers>;

    /// Install a receive deadline; `None` restores the configured default
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()>;

    /// Close the connection
    fn close(&mut self) -> Result<()>;
}

/// Hands out connections for the self-acquiring execute entry point
pub trait ConnectionSource {
    /// Produce a connection owned by the caller for one operation
    fn connection(&self) -> Result<Box<dyn Connection>>;
}

// =============================================================================
// TCP implementation
// =============================================================================

/// Blocking TCP connection
pub struct TcpConnection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Pool supplying reply payload buffers
    pool: BufferPool,

    /// Negotiated limits for this connection
    description: ConnectionDescription,

    /// Default receive deadline from the client config
    default_read_timeout: Option<Duration>,

    /// Deadline currently installed on the stream (for timeout reporting)
    effective_read_timeout: Option<Duration>,

    /// Peer address for logging
    peer_addr: String,
}

impl TcpConnection {
    /// Connect to a server address
    ///
    /// Resolves the address, applies the connect timeout, disables
    /// Nagle's algorithm when configured, and installs the default
    /// read/write timeouts.
    pub fn connect(addr: &str, config: &ClientConfig, pool: BufferPool) -> Result<Self> {
        let stream = Self::open_stream(addr, config)?;

        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        if config.nodelay {
            stream.set_nodelay(true)?;
        }

        let default_read_timeout = config.read_timeout();
        stream.set_read_timeout(default_read_timeout)?;
        stream.set_write_timeout(config.write_timeout())?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        tracing::debug!("Connected to {}", peer_addr);

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            pool,
            description: ConnectionDescription::default(),
            default_read_timeout,
            effective_read_timeout: default_read_timeout,
            peer_addr,
        })
    }

    fn open_stream(addr: &str, config: &ClientConfig) -> Result<TcpStream> {
        let mut last_err: Option<std::io::Error> = None;

        for resolved in addr.to_socket_addrs()? {
            let attempt = if config.connect_timeout_ms > 0 {
                TcpStream::connect_timeout(
                    &resolved,
                    Duration::from_millis(config.connect_timeout_ms),
                )
            } else {
                TcpStream::connect(resolved)
            };
            match attempt {
                Ok(stream) => return Ok(stream),
                Err(e) => last_err = Some(e),
            }
        }

        Err(match last_err {
            Some(e) => ParchmentError::Io(e),
            None => ParchmentError::Connection(format!("No addresses resolved for {}", addr)),
        })
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    fn timeout_ms(&self) -> u64 {
        self.effective_read_timeout
            .map(|t| t.as_millis() as u64)
            .unwrap_or(0)
    }
}

impl Connection for TcpConnection {
    fn description(&self) -> ConnectionDescription {
        self.description.clone()
    }

    fn send_message(&mut self, message: &[u8]) -> Result<()> {
        self.writer.write_all(message)?;
        self.writer.flush()?;
        tracing::trace!(bytes = message.len(), peer = %self.peer_addr, "Message sent");
        Ok(())
    }

    fn receive_message(&mut self) -> Result<ResponseBuffers> {
        let mut body = self.pool.checkout();
        let header = match read_frame(&mut self.reader, &mut body) {
            Ok(header) => header,
            Err(ParchmentError::Io(ref e))
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                tracing::debug!(peer = %self.peer_addr, "Receive deadline exceeded");
                return Err(ParchmentError::Timeout(self.timeout_ms()));
            }
            Err(e) => return Err(e),
        };
        tracing::trace!(
            request_id = header.request_id,
            response_to = header.response_to,
            peer = %self.peer_addr,
            "Reply received"
        );
        Ok(ResponseBuffers::new(header, body))
    }

    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        let effective = timeout.or(self.default_read_timeout);
        self.reader.get_ref().set_read_timeout(effective)?;
        self.effective_read_timeout = effective;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        tracing::debug!("Closing connection to {}", self.peer_addr);
        match self.writer.get_ref().shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            // Already gone; nothing left to release.
            Err(ref e) if e.kind() == std::io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(ParchmentError::Io(e)),
        }
    }
}

/// Dials a fresh TCP connection per operation
pub struct TcpConnector {
    addr: String,
    config: ClientConfig,
    pool: BufferPool,
}

impl TcpConnector {
    pub fn new(addr: impl Into<String>, config: ClientConfig, pool: BufferPool) -> Self {
        Self {
            addr: addr.into(),
            config,
            pool,
        }
    }
}

impl ConnectionSource for TcpConnector {
    fn connection(&self) -> Result<Box<dyn Connection>> {
        let connection = TcpConnection::connect(&self.addr, &self.config, self.pool.clone())?;
        Ok(Box::new(connection))
    }
}
