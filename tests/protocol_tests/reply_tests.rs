//! Reply decoding tests
//!
//! Correlation enforcement and reply-document extraction.

use parchment::buffer::BufferPool;
use parchment::document::{encode_document, Document};
use parchment::error::ParchmentError;
use parchment::protocol::{FrameHeader, OpCode, ReplyMessage, ResponseBuffers};

fn reply_buffers(
    pool: &BufferPool,
    op: OpCode,
    response_to: u32,
    document: &Document,
) -> ResponseBuffers {
    let payload = encode_document(document).unwrap();
    let mut body = pool.checkout();
    body.extend_from_slice(&payload);
    let header = FrameHeader {
        op,
        request_id: 99,
        response_to,
        payload_len: payload.len() as u32,
        checksum: crc32fast::hash(&payload),
    };
    ResponseBuffers::new(header, body)
}

#[test]
fn test_decode_correlated_reply() {
    let pool = BufferPool::new(1024, 4);
    let document = Document::new().with("ok", true).with("n", 1i64);
    let buffers = reply_buffers(&pool, OpCode::Reply, 42, &document);

    let reply = ReplyMessage::decode(buffers, 42).unwrap();
    assert_eq!(reply.response_to(), 42);
    assert_eq!(reply.request_id(), 99);
    assert_eq!(reply.document(), &document);
}

#[test]
fn test_uncorrelated_reply_is_distinct_failure() {
    let pool = BufferPool::new(1024, 4);
    let document = Document::new().with("ok", true);
    let buffers = reply_buffers(&pool, OpCode::Reply, 41, &document);

    let err = ReplyMessage::decode(buffers, 42).unwrap_err();
    assert!(
        matches!(
            err,
            ParchmentError::CorrelationMismatch {
                expected: 42,
                actual: 41
            }
        ),
        "got {:?}",
        err
    );
}

#[test]
fn test_non_reply_frame_rejected() {
    let pool = BufferPool::new(1024, 4);
    let document = Document::new().with("ok", true);
    let buffers = reply_buffers(&pool, OpCode::Insert, 42, &document);

    let err = ReplyMessage::decode(buffers, 42).unwrap_err();
    assert!(matches!(err, ParchmentError::Protocol(_)), "got {:?}", err);
}

#[test]
fn test_response_buffers_released_even_on_decode_failure() {
    let pool = BufferPool::new(1024, 4);

    // Garbage payload: the header is fine but the document is not.
    let mut body = pool.checkout();
    body.extend_from_slice(&[0xff; 3]);
    let header = FrameHeader {
        op: OpCode::Reply,
        request_id: 7,
        response_to: 42,
        payload_len: 3,
        checksum: crc32fast::hash(&[0xff; 3]),
    };
    let buffers = ResponseBuffers::new(header, body);

    assert_eq!(pool.in_flight(), 1);
    let err = ReplyMessage::decode(buffers, 42).unwrap_err();
    assert!(matches!(err, ParchmentError::Serialization(_)), "got {:?}", err);
    assert_eq!(pool.in_flight(), 0);
}
