//! # Parchment
//!
//! Client-side write protocol for the Parchment document store:
//! - Framed, checksummed wire protocol with correlation identifiers
//! - Writes that transparently span multiple frames (message chains)
//! - Optional synchronous acknowledgment per write concern
//! - Pooled output buffers released exactly once on every exit path
//!
//! ## Protocol Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Write Executor                          │
//! │        (buffer checkout, settings, message chain)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!        write concern mandates acknowledgment?
//!          │                              │
//!          ▼ yes                          ▼ no
//!   ┌─────────────┐                ┌─────────────┐
//!   │  Acknowledg-│                │  send once, │
//!   │  ment cmd → │                │  await      │
//!   │  one reply  │                │  nothing    │
//!   └──────┬──────┘                └──────┬──────┘
//!          │                              │
//!          ▼                              ▼
//!   ┌─────────────────────────────────────────────┐
//!   │    WriteResult { intent, outcome? }          │
//!   └─────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod buffer;
pub mod document;
pub mod namespace;
pub mod network;
pub mod operation;
pub mod protocol;
pub mod write_concern;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use buffer::{BufferPool, PooledBuffer};
pub use config::ClientConfig;
pub use document::{Document, Value};
pub use error::{ParchmentError, Result};
pub use namespace::Namespace;
pub use network::{Connection, ConnectionDescription, ConnectionSource, TcpConnection,
    TcpConnector};
pub use operation::{
    Acknowledgment, Delete, Insert, Update, Write, WriteFailure, WriteFailureKind,
    WriteOperation, WriteResult,
};
pub use write_concern::{AckLevel, WriteConcern};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of Parchment
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
