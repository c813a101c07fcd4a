//! Wire framing tests
//!
//! Frame envelope encoding, stream reading, and framing validation.

use std::io::Cursor;

use bytes::BytesMut;

use parchment::buffer::BufferPool;
use parchment::error::ParchmentError;
use parchment::protocol::{read_frame, split_frame, write_frame, OpCode, HEADER_SIZE};

#[test]
fn test_frame_roundtrip_through_stream() {
    let pool = BufferPool::new(1024, 4);
    let mut out = BytesMut::new();
    write_frame(&mut out, OpCode::Insert, 7, 0, b"payload bytes").unwrap();

    let mut cursor = Cursor::new(out.to_vec());
    let mut body = pool.checkout();
    let header = read_frame(&mut cursor, &mut body).unwrap();

    assert_eq!(header.op, OpCode::Insert);
    assert_eq!(header.request_id, 7);
    assert_eq!(header.response_to, 0);
    assert_eq!(body.as_slice(), b"payload bytes");
}

#[test]
fn test_split_frame_walks_accumulated_buffer() {
    let mut out = BytesMut::new();
    write_frame(&mut out, OpCode::Insert, 1, 0, b"first").unwrap();
    write_frame(&mut out, OpCode::Command, 2, 0, b"second").unwrap();

    let (first, payload, consumed) = split_frame(&out).unwrap();
    assert_eq!(first.op, OpCode::Insert);
    assert_eq!(payload, b"first");
    assert_eq!(consumed, HEADER_SIZE + 5);

    let (second, payload, _) = split_frame(&out[consumed..]).unwrap();
    assert_eq!(second.op, OpCode::Command);
    assert_eq!(second.request_id, 2);
    assert_eq!(payload, b"second");
}

#[test]
fn test_corrupted_checksum_is_protocol_error() {
    let pool = BufferPool::new(1024, 4);
    let mut out = BytesMut::new();
    write_frame(&mut out, OpCode::Reply, 3, 1, b"reply body").unwrap();

    // Flip a payload byte; the header checksum no longer matches.
    let mut bytes = out.to_vec();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;

    let mut cursor = Cursor::new(bytes);
    let mut body = pool.checkout();
    let err = read_frame(&mut cursor, &mut body).unwrap_err();
    assert!(matches!(err, ParchmentError::Protocol(_)), "got {:?}", err);
}

#[test]
fn test_unknown_op_code_rejected() {
    let pool = BufferPool::new(1024, 4);
    let mut out = BytesMut::new();
    write_frame(&mut out, OpCode::Delete, 4, 0, b"").unwrap();

    let mut bytes = out.to_vec();
    bytes[0] = 0x7f;

    let mut cursor = Cursor::new(bytes);
    let mut body = pool.checkout();
    let err = read_frame(&mut cursor, &mut body).unwrap_err();
    assert!(matches!(err, ParchmentError::Protocol(_)), "got {:?}", err);
}

#[test]
fn test_truncated_header_is_io_error() {
    let pool = BufferPool::new(1024, 4);
    let mut cursor = Cursor::new(vec![0x01, 0x00, 0x00]);
    let mut body = pool.checkout();
    let err = read_frame(&mut cursor, &mut body).unwrap_err();
    assert!(matches!(err, ParchmentError::Io(_)), "got {:?}", err);
}

#[test]
fn test_oversized_payload_length_rejected() {
    let pool = BufferPool::new(1024, 4);

    // Hand-build a header announcing a payload beyond the frame cap.
    let mut bytes = vec![0x01];
    bytes.extend_from_slice(&1u32.to_be_bytes());
    bytes.extend_from_slice(&0u32.to_be_bytes());
    bytes.extend_from_slice(&u32::MAX.to_be_bytes());
    bytes.extend_from_slice(&0u32.to_be_bytes());

    let mut cursor = Cursor::new(bytes);
    let mut body = pool.checkout();
    let err = read_frame(&mut cursor, &mut body).unwrap_err();
    assert!(matches!(err, ParchmentError::Protocol(_)), "got {:?}", err);
}

#[test]
fn test_empty_payload_frame() {
    let pool = BufferPool::new(1024, 4);
    let mut out = BytesMut::new();
    write_frame(&mut out, OpCode::Command, 9, 0, b"").unwrap();

    let mut cursor = Cursor::new(out.to_vec());
    let mut body = pool.checkout();
    let header = read_frame(&mut cursor, &mut body).unwrap();
    assert_eq!(header.payload_len, 0);
    assert!(body.as_slice().is_empty());
}
