//! Write concern definitions
//!
//! A write concern is the caller-specified durability policy for a write:
//! whether the client waits for the server to confirm the write, and what
//! guarantee the server must satisfy before confirming.

use std::time::Duration;

/// Required acknowledgment level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckLevel {
    /// Fire-and-forget: no acknowledgment exchange at all
    Unacknowledged,

    /// Server-default acknowledgment
    Default,

    /// Acknowledged by at least this many nodes
    Nodes(u32),

    /// Acknowledged by a majority of nodes
    Majority,
}

/// Durability policy for a write
#[derive(Debug, Clone, PartialEq)]
pub struct WriteConcern {
    ack: AckLevel,
    journal: bool,
    timeout: Option<Duration>,
}

impl WriteConcern {
    /// Fire-and-forget: the write is sent and nothing is awaited
    pub fn unacknowledged() -> Self {
        Self {
            ack: AckLevel::Unacknowledged,
            journal: false,
            timeout: None,
        }
    }

    /// Server-default acknowledgment
    pub fn acknowledged() -> Self {
        Self {
            ack: AckLevel::Default,
            journal: false,
            timeout: None,
        }
    }

    /// Acknowledged by at least `n` nodes
    pub fn nodes(n: u32) -> Self {
        Self {
            ack: AckLevel::Nodes(n),
            journal: false,
            timeout: None,
        }
    }

    /// Acknowledged by a majority of nodes
    pub fn majority() -> Self {
        Self {
            ack: AckLevel::Majority,
            journal: false,
            timeout: None,
        }
    }

    /// Require the write to be journaled before acknowledgment
    pub fn with_journal(mut self, journal: bool) -> Self {
        self.journal = journal;
        self
    }

    /// Hard deadline for the acknowledgment reply
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Whether this concern mandates the acknowledgment exchange
    pub fn requires_acknowledgment(&self) -> bool {
        self.ack != AckLevel::Unacknowledged
    }

    /// The acknowledgment level
    pub fn ack_level(&self) -> AckLevel {
        self.ack
    }

    /// Whether journal sync is required before acknowledgment
    pub fn journal(&self) -> bool {
        self.journal
    }

    /// The confirmation deadline, if one was set
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Default for WriteConcern {
    fn default() -> Self {
        Self::acknowledged()
    }
}
