//! Request messages
//!
//! Typed request messages and the chaining capability that lets one
//! logical write span multiple wire frames. Encoding a message appends
//! one frame to the output buffer and either terminates the chain or
//! yields the next link carrying the remainder of the payload.

use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

use crate::buffer::PooledBuffer;
use crate::document::{self, Document};
use crate::error::{ParchmentError, Result};
use crate::namespace::Namespace;
use crate::network::ConnectionDescription;
use crate::protocol::wire::{self, OpCode, HEADER_SIZE};

/// Process-wide request id allocator; 0 is reserved for "not a reply"
static REQUEST_ID: AtomicU32 = AtomicU32::new(1);

/// Allocate the next correlation identifier
pub fn next_request_id() -> u32 {
    REQUEST_ID.fetch_add(1, Ordering::SeqCst)
}

// =============================================================================
// Message Settings
// =============================================================================

/// Per-connection message limits
///
/// Derived fresh from the connection's current description on every
/// call; never cached across connections, since a description can
/// change over a connection's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageSettings {
    /// Max size of one wire frame, header included (in bytes)
    pub max_message_size: u32,

    /// Max wire size of a single document (in bytes)
    pub max_document_size: u32,

    /// Max number of documents batched into one frame
    pub max_write_batch_size: usize,
}

impl MessageSettings {
    /// Derive settings from a connection's current description
    pub fn from_description(description: &ConnectionDescription) -> Self {
        Self {
            max_message_size: description.max_message_size,
            max_document_size: description.max_document_size,
            max_write_batch_size: description.max_write_batch_size,
        }
    }
}

// =============================================================================
// Wire Payload Bodies
// =============================================================================

/// Payload of an insert frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertBody {
    pub namespace: String,
    pub documents: Vec<Document>,
}

/// Payload of an update frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateBody {
    pub namespace: String,
    pub filter: Document,
    pub update: Document,
    pub multi: bool,
    pub upsert: bool,
}

/// Payload of a delete frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteBody {
    pub namespace: String,
    pub filter: Document,
    pub multi: bool,
}

/// Payload of a command frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandBody {
    pub namespace: String,
    pub command: Document,
}

fn serialize_body<T: Serialize>(body: &T) -> Result<Vec<u8>> {
    bincode::serialize(body).map_err(|e| ParchmentError::Serialization(e.to_string()))
}

// =============================================================================
// Request Message Chain
// =============================================================================

/// One encodable link of an outbound message chain
///
/// `encode` consumes the link, appends exactly one frame to the buffer,
/// and returns the next link, or `None` when the chain is complete. A
/// logical write that exceeds one frame's capacity is transparently
/// split across links; every link lands in the same buffer before any
/// network send.
pub trait RequestMessage: std::fmt::Debug {
    /// This link's correlation identifier
    fn request_id(&self) -> u32;

    /// Encode one frame into the buffer, yielding the next link if any
    fn encode(self: Box<Self>, buffer: &mut PooledBuffer)
        -> Result<Option<Box<dyn RequestMessage>>>;
}

// =============================================================================
// Insert
// =============================================================================

/// Insert request; splits its batch across frames as settings demand
#[derive(Debug)]
pub struct InsertMessage {
    request_id: u32,
    namespace: String,
    documents: Vec<Document>,
    settings: MessageSettings,
}

impl InsertMessage {
    pub fn new(namespace: &Namespace, documents: Vec<Document>, settings: MessageSettings) -> Self {
        Self {
            request_id: next_request_id(),
            namespace: namespace.full_name(),
            documents,
            settings,
        }
    }

    fn continuation(namespace: String, documents: Vec<Document>, settings: MessageSettings) -> Self {
        Self {
            request_id: next_request_id(),
            namespace,
            documents,
            settings,
        }
    }

    /// Number of documents that fit in this frame under the settings
    fn batch_len(&self) -> Result<usize> {
        // Frame budget after the envelope and namespace overhead.
        let overhead = (HEADER_SIZE + self.namespace.len() + 16) as u64;
        let budget = u64::from(self.settings.max_message_size).saturating_sub(overhead);

        let mut taken = 0;
        let mut used = 0u64;
        for doc in &self.documents {
            let size = document::encoded_size(doc)?;
            if size > u64::from(self.settings.max_document_size) {
                return Err(ParchmentError::Protocol(format!(
                    "Document of {} bytes exceeds max document size {}",
                    size, self.settings.max_document_size
                )));
            }
            if taken > 0
                && (used + size > budget || taken >= self.settings.max_write_batch_size)
            {
                break;
            }
            used += size;
            taken += 1;
        }
        Ok(taken)
    }
}

impl RequestMessage for InsertMessage {
    fn request_id(&self) -> u32 {
        self.request_id
    }

    fn encode(
        mut self: Box<Self>,
        buffer: &mut PooledBuffer,
    ) -> Result<Option<Box<dyn RequestMessage>>> {
        let taken = self.batch_len()?;
        let rest = self.documents.split_off(taken);

        let payload = serialize_body(&InsertBody {
            namespace: self.namespace.clone(),
            documents: self.documents,
        })?;
        wire::write_frame(buffer, OpCode::Insert, self.request_id, 0, &payload)?;

        if rest.is_empty() {
            Ok(None)
        } else {
            tracing::trace!(
                remaining = rest.len(),
                "Insert batch split across message chain"
            );
            Ok(Some(Box::new(InsertMessage::continuation(
                self.namespace,
                rest,
                self.settings,
            ))))
        }
    }
}

// =============================================================================
// Update
// =============================================================================

/// Update request; always a single frame
#[derive(Debug)]
pub struct UpdateMessage {
    request_id: u32,
    body: UpdateBody,
    settings: MessageSettings,
}

impl UpdateMessage {
    pub fn new(
        namespace: &Namespace,
        filter: Document,
        update: Document,
        multi: bool,
        upsert: bool,
        settings: MessageSettings,
    ) -> Self {
        Self {
            request_id: next_request_id(),
            body: UpdateBody {
                namespace: namespace.full_name(),
                filter,
                update,
                multi,
                upsert,
            },
            settings,
        }
    }
}

impl RequestMessage for UpdateMessage {
    fn request_id(&self) -> u32 {
        self.request_id
    }

    fn encode(
        self: Box<Self>,
        buffer: &mut PooledBuffer,
    ) -> Result<Option<Box<dyn RequestMessage>>> {
        check_document_size(&self.body.update, &self.settings)?;
        let payload = serialize_body(&self.body)?;
        wire::write_frame(buffer, OpCode::Update, self.request_id, 0, &payload)?;
        Ok(None)
    }
}

// =============================================================================
// Delete
// =============================================================================

/// Delete request; always a single frame
#[derive(Debug)]
pub struct DeleteMessage {
    request_id: u32,
    body: DeleteBody,
}

impl DeleteMessage {
    pub fn new(namespace: &Namespace, filter: Document, multi: bool) -> Self {
        Self {
            request_id: next_request_id(),
            body: DeleteBody {
                namespace: namespace.full_name(),
                filter,
                multi,
            },
        }
    }
}

impl RequestMessage for DeleteMessage {
    fn request_id(&self) -> u32 {
        self.request_id
    }

    fn encode(
        self: Box<Self>,
        buffer: &mut PooledBuffer,
    ) -> Result<Option<Box<dyn RequestMessage>>> {
        let payload = serialize_body(&self.body)?;
        wire::write_frame(buffer, OpCode::Delete, self.request_id, 0, &payload)?;
        Ok(None)
    }
}

// =============================================================================
// Command
// =============================================================================

/// Administrative command request; always a single frame
///
/// The correlation identifier is fixed at construction so callers can
/// record it before encoding and match it against the reply.
#[derive(Debug)]
pub struct CommandMessage {
    request_id: u32,
    body: CommandBody,
    settings: MessageSettings,
}

impl CommandMessage {
    pub fn new(namespace: &Namespace, command: Document, settings: MessageSettings) -> Self {
        Self {
            request_id: next_request_id(),
            body: CommandBody {
                namespace: namespace.full_name(),
                command,
            },
            settings,
        }
    }
}

impl RequestMessage for CommandMessage {
    fn request_id(&self) -> u32 {
        self.request_id
    }

    fn encode(
        self: Box<Self>,
        buffer: &mut PooledBuffer,
    ) -> Result<Option<Box<dyn RequestMessage>>> {
        check_document_size(&self.body.command, &self.settings)?;
        let payload = serialize_body(&self.body)?;
        wire::write_frame(buffer, OpCode::Command, self.request_id, 0, &payload)?;
        Ok(None)
    }
}

fn check_document_size(doc: &Document, settings: &MessageSettings) -> Result<()> {
    let size = document::encoded_size(doc)?;
    if size > u64::from(settings.max_document_size) {
        return Err(ParchmentError::Protocol(format!(
            "Document of {} bytes exceeds max document size {}",
            size, settings.max_document_size
        )));
    }
    Ok(())
}
