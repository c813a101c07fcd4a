//! Namespace definitions
//!
//! A namespace identifies a collection within a database. Administrative
//! commands (including write acknowledgment) target the reserved `$cmd`
//! collection of the same database, never a regular collection.

use serde::{Deserialize, Serialize};

use crate::error::{ParchmentError, Result};

/// Reserved collection name for administrative commands
pub const COMMAND_COLLECTION_NAME: &str = "$cmd";

/// A fully qualified `database.collection` namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace {
    database: String,
    collection: String,
}

impl Namespace {
    /// Create a validated namespace
    ///
    /// The database name must be non-empty and must not contain `.`,
    /// which separates the two parts on the wire. The collection name
    /// must be non-empty.
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Result<Self> {
        let database = database.into();
        let collection = collection.into();

        if database.is_empty() {
            return Err(ParchmentError::Config("Database name is empty".to_string()));
        }
        if database.contains('.') {
            return Err(ParchmentError::Config(format!(
                "Database name must not contain '.': {}",
                database
            )));
        }
        if collection.is_empty() {
            return Err(ParchmentError::Config(
                "Collection name is empty".to_string(),
            ));
        }

        Ok(Self {
            database,
            collection,
        })
    }

    /// The database part
    pub fn database(&self) -> &str {
        &self.database
    }

    /// The collection part
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// The full `database.collection` name as sent on the wire
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.database, self.collection)
    }

    /// The administrative command namespace of the same database
    pub fn command_namespace(&self) -> Namespace {
        Namespace {
            database: self.database.clone(),
            collection: COMMAND_COLLECTION_NAME.to_string(),
        }
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}
