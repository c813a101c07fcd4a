//! Write operations
//!
//! The write executor and the acknowledgment sub-protocol it runs when
//! the write concern mandates confirmation.

pub mod acknowledge;
pub mod result;
pub mod write;

pub use acknowledge::{acknowledgment_command, parse_acknowledgment, CONFIRM_COMMAND_NAME};
pub use result::{Acknowledgment, WriteFailure, WriteFailureKind, WriteResult};
pub use write::{Delete, Insert, Update, Write, WriteOperation};
