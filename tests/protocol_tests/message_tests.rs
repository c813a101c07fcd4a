//! Request message tests
//!
//! Message chaining, batch splitting by settings, and per-message
//! framing.

use parchment::buffer::BufferPool;
use parchment::document::Document;
use parchment::error::ParchmentError;
use parchment::namespace::Namespace;
use parchment::network::ConnectionDescription;
use parchment::protocol::{
    split_frame, CommandMessage, DeleteMessage, InsertBody, InsertMessage, MessageSettings,
    OpCode, RequestMessage, UpdateMessage,
};

fn settings() -> MessageSettings {
    MessageSettings::from_description(&ConnectionDescription::default())
}

fn tiny_settings(max_message_size: u32) -> MessageSettings {
    MessageSettings::from_description(&ConnectionDescription {
        max_message_size,
        max_document_size: 1024,
        max_write_batch_size: 1000,
    })
}

fn namespace() -> Namespace {
    Namespace::new("app", "events").unwrap()
}

fn doc(seq: i64) -> Document {
    Document::new().with("seq", seq).with("payload", "x".repeat(100))
}

/// Drive a message chain to completion, returning the number of links
fn drain_chain(head: Box<dyn RequestMessage>, pool: &BufferPool) -> (usize, Vec<u8>) {
    let mut buffer = pool.checkout();
    let mut links = 0;
    let mut next = Some(head);
    while let Some(message) = next {
        next = message.encode(&mut buffer).unwrap();
        links += 1;
    }
    (links, buffer.as_slice().to_vec())
}

#[test]
fn test_small_insert_is_single_link() {
    let pool = BufferPool::new(1024, 4);
    let message = InsertMessage::new(&namespace(), vec![doc(1), doc(2)], settings());
    let (links, bytes) = drain_chain(Box::new(message), &pool);

    assert_eq!(links, 1);
    let (header, payload, consumed) = split_frame(&bytes).unwrap();
    assert_eq!(header.op, OpCode::Insert);
    assert_eq!(consumed, bytes.len());

    let body: InsertBody = bincode::deserialize(payload).unwrap();
    assert_eq!(body.namespace, "app.events");
    assert_eq!(body.documents.len(), 2);
}

#[test]
fn test_insert_chain_splits_by_message_size() {
    let pool = BufferPool::new(1024, 4);
    // Budget fits one ~130-byte document per frame.
    let message = InsertMessage::new(
        &namespace(),
        vec![doc(1), doc(2), doc(3)],
        tiny_settings(200),
    );
    let (links, bytes) = drain_chain(Box::new(message), &pool);
    assert_eq!(links, 3);

    // Every link landed in the same buffer, one insert frame each.
    let mut rest: &[u8] = &bytes;
    let mut total_docs = 0;
    let mut ids = Vec::new();
    while !rest.is_empty() {
        let (header, payload, consumed) = split_frame(rest).unwrap();
        assert_eq!(header.op, OpCode::Insert);
        ids.push(header.request_id);
        let body: InsertBody = bincode::deserialize(payload).unwrap();
        total_docs += body.documents.len();
        rest = &rest[consumed..];
    }
    assert_eq!(ids.len(), 3);
    assert_eq!(total_docs, 3);
    // Each link carries its own correlation identifier.
    ids.dedup();
    assert_eq!(ids.len(), 3);
}

#[test]
fn test_insert_chain_splits_by_batch_count() {
    let pool = BufferPool::new(1024, 4);
    let settings = MessageSettings::from_description(&ConnectionDescription {
        max_message_size: 16 * 1024 * 1024,
        max_document_size: 1024,
        max_write_batch_size: 2,
    });
    let documents = vec![doc(1), doc(2), doc(3), doc(4), doc(5)];
    let message = InsertMessage::new(&namespace(), documents, settings);
    let (links, _) = drain_chain(Box::new(message), &pool);
    assert_eq!(links, 3); // 2 + 2 + 1
}

#[test]
fn test_oversized_document_rejected() {
    let pool = BufferPool::new(1024, 4);
    let settings = MessageSettings::from_description(&ConnectionDescription {
        max_message_size: 16 * 1024 * 1024,
        max_document_size: 64,
        max_write_batch_size: 1000,
    });
    let message = InsertMessage::new(&namespace(), vec![doc(1)], settings);
    let mut buffer = pool.checkout();
    let err = Box::new(message).encode(&mut buffer).unwrap_err();
    assert!(matches!(err, ParchmentError::Protocol(_)), "got {:?}", err);
}

#[test]
fn test_update_and_delete_never_chain() {
    let pool = BufferPool::new(1024, 4);
    let filter = Document::new().with("seq", 1i64);
    let update = Document::new().with("payload", "updated");

    let message = UpdateMessage::new(&namespace(), filter.clone(), update, true, false, settings());
    let (links, bytes) = drain_chain(Box::new(message), &pool);
    assert_eq!(links, 1);
    assert_eq!(split_frame(&bytes).unwrap().0.op, OpCode::Update);

    let message = DeleteMessage::new(&namespace(), filter, true);
    let (links, bytes) = drain_chain(Box::new(message), &pool);
    assert_eq!(links, 1);
    assert_eq!(split_frame(&bytes).unwrap().0.op, OpCode::Delete);
}

#[test]
fn test_command_message_id_is_stable_across_encode() {
    let pool = BufferPool::new(1024, 4);
    let command = Document::new().with("confirmWrite", 1i64);
    let message = CommandMessage::new(&namespace().command_namespace(), command, settings());
    let id_before = message.request_id();
    assert_ne!(id_before, 0);

    let mut buffer = pool.checkout();
    Box::new(message).encode(&mut buffer).unwrap();

    let (header, _, _) = split_frame(buffer.as_slice()).unwrap();
    assert_eq!(header.op, OpCode::Command);
    assert_eq!(header.request_id, id_before);
    assert_eq!(header.response_to, 0);
}

#[test]
fn test_request_ids_are_unique() {
    let a = InsertMessage::new(&namespace(), vec![doc(1)], settings());
    let b = InsertMessage::new(&namespace(), vec![doc(1)], settings());
    assert_ne!(a.request_id(), b.request_id());
}
