//! Write results
//!
//! The final output of a write operation: the original intent plus, for
//! acknowledged writes, the server-confirmed outcome. A server-reported
//! write failure (duplicate key, validation) lives here as data; the
//! protocol exchange that carried it succeeded.

use crate::namespace::Namespace;
use crate::write_concern::WriteConcern;

/// Category of a server-reported write failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFailureKind {
    /// A unique-index constraint was violated
    DuplicateKey,

    /// The document failed server-side validation
    ValidationFailed,

    /// Any other server-reported failure
    Other,
}

/// A write failure reported by the server inside an acknowledgment
#[derive(Debug, Clone, PartialEq)]
pub struct WriteFailure {
    /// Failure category derived from the server code
    pub kind: WriteFailureKind,

    /// Raw server error code
    pub code: i64,

    /// Server error message
    pub message: String,
}

/// Parsed outcome of the acknowledgment command
#[derive(Debug, Clone, PartialEq)]
pub struct Acknowledgment {
    /// Number of documents the write affected
    pub documents_affected: u64,

    /// Server-reported write failure, if the write violated a constraint
    pub failure: Option<WriteFailure>,
}

impl Acknowledgment {
    /// Whether the server confirmed the write without a failure
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// The final result of an executed write
///
/// The acknowledgment is present if and only if the write concern
/// mandated the acknowledgment exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteResult {
    namespace: Namespace,
    write_concern: WriteConcern,
    acknowledgment: Option<Acknowledgment>,
}

impl WriteResult {
    pub fn new(
        namespace: Namespace,
        write_concern: WriteConcern,
        acknowledgment: Option<Acknowledgment>,
    ) -> Self {
        Self {
            namespace,
            write_concern,
            acknowledgment,
        }
    }

    /// The namespace the write targeted
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// The durability policy the write was executed under
    pub fn write_concern(&self) -> &WriteConcern {
        &self.write_concern
    }

    /// The server-confirmed outcome, absent for unacknowledged writes
    pub fn acknowledgment(&self) -> Option<&Acknowledgment> {
        self.acknowledgment.as_ref()
    }

    /// Whether an acknowledgment exchange took place
    pub fn was_acknowledged(&self) -> bool {
        self.acknowledgment.is_some()
    }
}
