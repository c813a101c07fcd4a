//! Reply decoding
//!
//! Ownership of one server reply's raw bytes and its decoding into a
//! document, with correlation enforcement: a reply that does not answer
//! the expected request id cannot be trusted and fails the exchange.

use crate::buffer::PooledBuffer;
use crate::document::{self, Document};
use crate::error::{ParchmentError, Result};
use crate::protocol::wire::{FrameHeader, OpCode};

/// The raw bytes of exactly one server reply
///
/// Owns the pooled payload buffer; dropping the value returns the buffer
/// to the pool. Decoding consumes the buffers so they are released
/// immediately after the document is extracted, parse failure included.
pub struct ResponseBuffers {
    header: FrameHeader,
    body: PooledBuffer,
}

impl ResponseBuffers {
    pub fn new(header: FrameHeader, body: PooledBuffer) -> Self {
        Self { header, body }
    }

    /// The reply's frame envelope
    pub fn header(&self) -> &FrameHeader {
        &self.header
    }
}

/// A decoded reply, correlated to its originating request
#[derive(Debug)]
pub struct ReplyMessage {
    document: Document,
    request_id: u32,
    response_to: u32,
}

impl ReplyMessage {
    /// Decode a reply and verify it answers the expected request
    ///
    /// Consumes the response buffers; they are released when this call
    /// returns, whether it succeeds or fails.
    pub fn decode(buffers: ResponseBuffers, expected_response_to: u32) -> Result<Self> {
        let header = buffers.header;

        if header.op != OpCode::Reply {
            return Err(ParchmentError::Protocol(format!(
                "Expected reply frame, got {:?}",
                header.op
            )));
        }
        if header.response_to != expected_response_to {
            return Err(ParchmentError::CorrelationMismatch {
                expected: expected_response_to,
                actual: header.response_to,
            });
        }

        let document = document::decode_document(buffers.body.as_slice())?;

        Ok(Self {
            document,
            request_id: header.request_id,
            response_to: header.response_to,
        })
    }

    /// The decoded reply document
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The reply's own correlation identifier
    pub fn request_id(&self) -> u32 {
        self.request_id
    }

    /// The request id this reply answers
    pub fn response_to(&self) -> u32 {
        self.response_to
    }
}
