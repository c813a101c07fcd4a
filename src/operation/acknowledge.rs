//! Acknowledgment sub-protocol
//!
//! A bounded request/response exchange that confirms the outcome of the
//! immediately preceding write on the same connection. The command is
//! addressed to the administrative namespace of the write's database,
//! encodes the write concern's parameters, and its reply is correlated
//! to the request; an uncorrelated reply fails the exchange.

use crate::buffer::PooledBuffer;
use crate::document::{Document, Value};
use crate::error::{ParchmentError, Result};
use crate::namespace::Namespace;
use crate::network::Connection;
use crate::operation::result::{Acknowledgment, WriteFailure, WriteFailureKind};
use crate::protocol::{CommandMessage, MessageSettings, ReplyMessage, RequestMessage};
use crate::write_concern::{AckLevel, WriteConcern};

/// Command field that requests write confirmation
pub const CONFIRM_COMMAND_NAME: &str = "confirmWrite";

/// Server code for a unique-index violation
pub const DUPLICATE_KEY_CODE: i64 = 11000;

/// Server code for a document validation failure
pub const VALIDATION_FAILED_CODE: i64 = 121;

impl WriteFailureKind {
    /// Map a server error code to a failure category
    pub fn from_code(code: i64) -> Self {
        match code {
            DUPLICATE_KEY_CODE => WriteFailureKind::DuplicateKey,
            VALIDATION_FAILED_CODE => WriteFailureKind::ValidationFailed,
            _ => WriteFailureKind::Other,
        }
    }
}

/// Build the acknowledgment command document for a write concern
///
/// Embeds the concern's parameters so the server knows exactly what
/// durability guarantee to confirm before replying.
pub fn acknowledgment_command(write_concern: &WriteConcern) -> Document {
    let mut command = Document::new().with(CONFIRM_COMMAND_NAME, 1i64);

    match write_concern.ack_level() {
        AckLevel::Unacknowledged | AckLevel::Default => {}
        AckLevel::Nodes(n) => command.insert("w", i64::from(n)),
        AckLevel::Majority => command.insert("w", "majority"),
    }
    if write_concern.journal() {
        command.insert("journal", true);
    }
    if let Some(timeout) = write_concern.timeout() {
        command.insert("timeoutMs", timeout.as_millis() as i64);
    }

    command
}

/// Interpret an acknowledgment reply document
///
/// A truthy `ok` with an `err` field is a *successful* exchange carrying
/// a server-reported write failure as data. A non-truthy `ok` means the
/// command itself failed and the exchange cannot be trusted.
pub fn parse_acknowledgment(document: &Document) -> Result<Acknowledgment> {
    let ok = document.get("ok").map(Value::is_truthy).unwrap_or(false);
    if !ok {
        return Err(ParchmentError::Protocol(format!(
            "Acknowledgment command failed: {:?}",
            document
        )));
    }

    let documents_affected = document
        .get("n")
        .and_then(Value::as_int)
        .unwrap_or(0)
        .max(0) as u64;

    let failure = match document.get("err") {
        None | Some(Value::Null) => None,
        Some(err) => {
            let code = document.get("code").and_then(Value::as_int).unwrap_or(0);
            Some(WriteFailure {
                kind: WriteFailureKind::from_code(code),
                code,
                message: err.as_str().unwrap_or("write failed").to_string(),
            })
        }
    };

    Ok(Acknowledgment {
        documents_affected,
        failure,
    })
}

/// Run the acknowledgment exchange for a just-encoded write
///
/// Encodes the command into the same buffer as the write so both go out
/// in one ordered flush, installs the concern's receive deadline, blocks
/// for exactly one reply, and decodes it against the command's
/// correlation identifier. The response buffers are released as soon as
/// decoding finishes, on failure included.
pub fn confirm_write(
    namespace: &Namespace,
    write_concern: &WriteConcern,
    connection: &mut dyn Connection,
    buffer: &mut PooledBuffer,
    settings: MessageSettings,
) -> Result<Acknowledgment> {
    let command = acknowledgment_command(write_concern);
    let message = CommandMessage::new(&namespace.command_namespace(), command, settings);
    let request_id = message.request_id();
    Box::new(message).encode(buffer)?;

    connection.send_message(buffer.as_slice())?;

    connection.set_read_timeout(write_concern.timeout())?;
    let response = connection.receive_message()?;
    let reply = ReplyMessage::decode(response, request_id)?;

    let acknowledgment = parse_acknowledgment(reply.document())?;
    tracing::debug!(
        namespace = %namespace,
        affected = acknowledgment.documents_affected,
        failed = acknowledgment.failure.is_some(),
        "Write acknowledged"
    );
    Ok(acknowledgment)
}
