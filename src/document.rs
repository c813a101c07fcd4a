//! Document model and codec boundary
//!
//! A minimal ordered-field document type plus the serialization boundary
//! used by the wire protocol. Message payloads carry documents in their
//! bincode encoding; the rest of the crate never touches raw document
//! bytes directly.

use serde::{Deserialize, Serialize};

use crate::error::{ParchmentError, Result};

/// A single field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Document(Document),
}

impl Value {
    /// Interpret this value as a truthiness flag
    ///
    /// Servers report command status as either a boolean or a numeric 0/1.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Double(d) => *d != 0.0,
            _ => false,
        }
    }

    /// Interpret this value as an integer, if it is one
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Double(d) => Some(*d as i64),
            _ => None,
        }
    }

    /// Interpret this value as a string slice, if it is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

/// An ordered collection of named fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    fields: Vec<(String, Value)>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, returning self for chaining
    ///
    /// Field order is preserved; an existing field with the same name is
    /// replaced in place.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a field
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Look up a field by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Whether a field is present
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the document has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
}

// =============================================================================
// Codec boundary
// =============================================================================

/// Encode a document to its wire payload bytes
pub fn encode_document(document: &Document) -> Result<Vec<u8>> {
    bincode::serialize(document).map_err(|e| ParchmentError::Serialization(e.to_string()))
}

/// Decode a document from wire payload bytes
pub fn decode_document(bytes: &[u8]) -> Result<Document> {
    bincode::deserialize(bytes).map_err(|e| ParchmentError::Serialization(e.to_string()))
}

/// Size in bytes of a document's wire encoding, without producing it
pub fn encoded_size(document: &Document) -> Result<u64> {
    bincode::serialized_size(document).map_err(|e| ParchmentError::Serialization(e.to_string()))
}
