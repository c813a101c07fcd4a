//! Acknowledgment sub-protocol tests
//!
//! Command construction per write-concern variant and reply parsing.

use std::time::Duration;

use parchment::document::{Document, Value};
use parchment::error::ParchmentError;
use parchment::operation::{acknowledgment_command, parse_acknowledgment, WriteFailureKind};
use parchment::write_concern::WriteConcern;

// =============================================================================
// Command Construction
// =============================================================================

#[test]
fn test_default_concern_has_no_parameters() {
    let command = acknowledgment_command(&WriteConcern::acknowledged());
    assert_eq!(command.get("confirmWrite").and_then(Value::as_int), Some(1));
    assert!(!command.contains("w"));
    assert!(!command.contains("journal"));
    assert!(!command.contains("timeoutMs"));
}

#[test]
fn test_majority_journal_timeout_embedded() {
    let concern = WriteConcern::majority()
        .with_journal(true)
        .with_timeout(Duration::from_millis(1500));
    let command = acknowledgment_command(&concern);

    assert_eq!(command.get("w").and_then(Value::as_str), Some("majority"));
    assert_eq!(command.get("journal"), Some(&Value::Bool(true)));
    assert_eq!(command.get("timeoutMs").and_then(Value::as_int), Some(1500));
}

#[test]
fn test_node_count_embedded_as_int() {
    let command = acknowledgment_command(&WriteConcern::nodes(3));
    assert_eq!(command.get("w").and_then(Value::as_int), Some(3));
}

// =============================================================================
// Reply Parsing
// =============================================================================

#[test]
fn test_parse_pure_success() {
    let reply = Document::new().with("ok", true).with("n", 2i64);
    let ack = parse_acknowledgment(&reply).unwrap();
    assert!(ack.is_success());
    assert_eq!(ack.documents_affected, 2);
}

#[test]
fn test_parse_numeric_ok_and_missing_count() {
    let reply = Document::new().with("ok", 1i64);
    let ack = parse_acknowledgment(&reply).unwrap();
    assert!(ack.is_success());
    assert_eq!(ack.documents_affected, 0);
}

#[test]
fn test_parse_validation_failure_as_data() {
    let reply = Document::new()
        .with("ok", true)
        .with("n", 0i64)
        .with("code", 121i64)
        .with("err", "document failed validation");
    let ack = parse_acknowledgment(&reply).unwrap();

    let failure = ack.failure.unwrap();
    assert_eq!(failure.kind, WriteFailureKind::ValidationFailed);
    assert_eq!(failure.message, "document failed validation");
}

#[test]
fn test_parse_unknown_code_is_other() {
    let reply = Document::new()
        .with("ok", true)
        .with("code", 999i64)
        .with("err", "something else");
    let ack = parse_acknowledgment(&reply).unwrap();
    assert_eq!(ack.failure.unwrap().kind, WriteFailureKind::Other);
}

#[test]
fn test_null_err_field_is_success() {
    let reply = Document::new()
        .with("ok", true)
        .with("n", 1i64)
        .with("err", Value::Null);
    let ack = parse_acknowledgment(&reply).unwrap();
    assert!(ack.is_success());
}

#[test]
fn test_command_failure_is_protocol_error() {
    let reply = Document::new().with("ok", false);
    let err = parse_acknowledgment(&reply).unwrap_err();
    assert!(matches!(err, ParchmentError::Protocol(_)), "got {:?}", err);
}

#[test]
fn test_missing_ok_is_protocol_error() {
    let reply = Document::new().with("n", 1i64);
    assert!(parse_acknowledgment(&reply).is_err());
}
