//! Write Executor
//!
//! Orchestrates one logical write against a connection: checks out a
//! pooled output buffer, encodes the write's message chain, and, when
//! the write concern mandates it, runs the acknowledgment exchange on
//! the same connection before assembling the final result.
//!
//! ## Control Flow
//!
//! ```text
//! execute / execute_on
//!   │
//!   ├─ checkout output buffer          (returned on every exit path)
//!   ├─ derive MessageSettings          (fresh from the description)
//!   ├─ encode message chain            (loop until the chain ends)
//!   │
//!   ├─ concern mandates acknowledgment?
//!   │    ├─ yes: encode command into same buffer → send once →
//!   │    │       receive one reply → decode (correlated) → outcome
//!   │    └─ no:  send once, await nothing
//!   │
//!   └─ WriteResult { intent, outcome? }
//! ```

use crate::buffer::BufferPool;
use crate::document::Document;
use crate::error::Result;
use crate::namespace::Namespace;
use crate::network::{Connection, ConnectionSource};
use crate::operation::acknowledge;
use crate::operation::result::WriteResult;
use crate::protocol::{
    DeleteMessage, InsertMessage, MessageSettings, RequestMessage, UpdateMessage,
};
use crate::write_concern::WriteConcern;

/// A logical write that knows how to build its own request message
///
/// Each write kind supplies its namespace, durability policy, and the
/// head of its request-message chain; the executor is generic over this
/// capability.
pub trait Write {
    /// Target namespace of the write
    fn namespace(&self) -> &Namespace;

    /// Durability policy of the write
    fn write_concern(&self) -> &WriteConcern;

    /// Head of the request-message chain under the given settings
    fn request_message(&self, settings: MessageSettings) -> Box<dyn RequestMessage>;
}

// =============================================================================
// Write Kinds
// =============================================================================

/// Insert one or more documents
pub struct Insert {
    namespace: Namespace,
    write_concern: WriteConcern,
    documents: Vec<Document>,
}

impl Insert {
    pub fn new(
        namespace: Namespace,
        write_concern: WriteConcern,
        documents: Vec<Document>,
    ) -> Self {
        Self {
            namespace,
            write_concern,
            documents,
        }
    }
}

impl Write for Insert {
    fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    fn write_concern(&self) -> &WriteConcern {
        &self.write_concern
    }

    fn request_message(&self, settings: MessageSettings) -> Box<dyn RequestMessage> {
        Box::new(InsertMessage::new(
            &self.namespace,
            self.documents.clone(),
            settings,
        ))
    }
}

/// Update documents matching a filter
pub struct Update {
    namespace: Namespace,
    write_concern: WriteConcern,
    filter: Document,
    update: Document,
    multi: bool,
    upsert: bool,
}

impl Update {
    pub fn new(
        namespace: Namespace,
        write_concern: WriteConcern,
        filter: Document,
        update: Document,
    ) -> Self {
        Self {
            namespace,
            write_concern,
            filter,
            update,
            multi: false,
            upsert: false,
        }
    }

    /// Update every matching document instead of the first
    pub fn multi(mut self, multi: bool) -> Self {
        self.multi = multi;
        self
    }

    /// Insert the document if nothing matches
    pub fn upsert(mut self, upsert: bool) -> Self {
        self.upsert = upsert;
        self
    }
}

impl Write for Update {
    fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    fn write_concern(&self) -> &WriteConcern {
        &self.write_concern
    }

    fn request_message(&self, settings: MessageSettings) -> Box<dyn RequestMessage> {
        Box::new(UpdateMessage::new(
            &self.namespace,
            self.filter.clone(),
            self.update.clone(),
            self.multi,
            self.upsert,
            settings,
        ))
    }
}

/// Delete documents matching a filter
pub struct Delete {
    namespace: Namespace,
    write_concern: WriteConcern,
    filter: Document,
    multi: bool,
}

impl Delete {
    pub fn new(namespace: Namespace, write_concern: WriteConcern, filter: Document) -> Self {
        Self {
            namespace,
            write_concern,
            filter,
            multi: true,
        }
    }

    /// Delete every matching document (default) or only the first
    pub fn multi(mut self, multi: bool) -> Self {
        self.multi = multi;
        self
    }
}

impl Write for Delete {
    fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    fn write_concern(&self) -> &WriteConcern {
        &self.write_concern
    }

    fn request_message(&self, _settings: MessageSettings) -> Box<dyn RequestMessage> {
        Box::new(DeleteMessage::new(
            &self.namespace,
            self.filter.clone(),
            self.multi,
        ))
    }
}

// =============================================================================
// Executor
// =============================================================================

/// Executes one logical write, optionally acknowledged
pub struct WriteOperation<W: Write> {
    write: W,
    pool: BufferPool,
}

impl<W: Write> WriteOperation<W> {
    pub fn new(write: W, pool: BufferPool) -> Self {
        Self { write, pool }
    }

    /// The write this operation executes
    pub fn write(&self) -> &W {
        &self.write
    }

    /// Execute on a connection acquired from the source
    ///
    /// The connection is released exactly once, whether the write
    /// succeeds or fails. A close failure is logged and never masks an
    /// in-flight failure.
    pub fn execute(&self, source: &dyn ConnectionSource) -> Result<WriteResult> {
        let mut connection = source.connection()?;
        let result = self.execute_on(connection.as_mut());
        if let Err(close_err) = connection.close() {
            tracing::warn!("Connection close failed: {}", close_err);
        }
        result
    }

    /// Execute on a caller-supplied connection (caller retains ownership)
    pub fn execute_on(&self, connection: &mut dyn Connection) -> Result<WriteResult> {
        // Returned to the pool when this scope exits, on every path.
        let mut buffer = self.pool.checkout();

        let settings = MessageSettings::from_description(&connection.description());

        let mut next = Some(self.write.request_message(settings));
        while let Some(message) = next {
            next = message.encode(&mut buffer)?;
        }

        let write_concern = self.write.write_concern();
        let acknowledgment = if write_concern.requires_acknowledgment() {
            Some(acknowledge::confirm_write(
                self.write.namespace(),
                write_concern,
                connection,
                &mut buffer,
                settings,
            )?)
        } else {
            connection.send_message(buffer.as_slice())?;
            tracing::debug!(
                namespace = %self.write.namespace(),
                "Unacknowledged write sent"
            );
            None
        };

        Ok(WriteResult::new(
            self.write.namespace().clone(),
            write_concern.clone(),
            acknowledgment,
        ))
    }
}
