//! Network layer
//!
//! The connection capability the executor runs against, plus the
//! blocking TCP implementation.

pub mod connection;

pub use connection::{
    Connection, ConnectionDescription, ConnectionSource, TcpConnection, TcpConnector,
};
