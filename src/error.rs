//! Error types for Parchment
//!
//! Provides a unified error type for all client protocol operations.
//!
//! Server-reported write failures (duplicate key, validation) are NOT
//! errors at this level: they are delivered as data inside an
//! [`Acknowledgment`](crate::operation::Acknowledgment).

use thiserror::Error;

/// Result type alias using ParchmentError
pub type Result<T> = std::result::Result<T, ParchmentError>;

/// Unified error type for Parchment client operations
#[derive(Debug, Error)]
pub enum ParchmentError {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Receive timed out after {0} ms")]
    Timeout(u64),

    #[error("Connection error: {0}")]
    Connection(String),

    // -------------------------------------------------------------------------
    // Protocol-Framing Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Reply correlation mismatch: expected {expected}, got {actual}")]
    CorrelationMismatch { expected: u32, actual: u32 },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ParchmentError {
    /// Whether this error is the distinct receive-deadline overrun
    pub fn is_timeout(&self) -> bool {
        matches!(self, ParchmentError::Timeout(_))
    }
}
