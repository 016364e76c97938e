//! Typed gateway commands.
//!
//! Every tool call is validated into one of these before it reaches the
//! gateway. Filters, updates and documents stay opaque BSON documents; only
//! their shape is checked.

use std::fmt;

use mongodb::bson::Document;

use crate::error::{McpError, Result};
use crate::session::ConnectConfig;

/// Default number of documents returned by a find.
pub const DEFAULT_FIND_LIMIT: u64 = 100;

/// A validated, non-empty collection name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionName(String);

impl CollectionName {
    /// Validate and wrap a collection name.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(McpError::invalid_arg(
                "collection_name",
                "must be a non-empty name",
            ));
        }
        if name.contains('\0') {
            return Err(McpError::invalid_arg(
                "collection_name",
                "must not contain a NUL byte",
            ));
        }
        Ok(Self(name))
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CollectionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Sort direction for a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest first (`1`).
    Ascending,
    /// Largest first (`-1`).
    Descending,
}

impl SortDirection {
    /// The value MongoDB expects in a sort document.
    pub fn as_i32(self) -> i32 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }
}

impl TryFrom<i64> for SortDirection {
    type Error = McpError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            1 => Ok(SortDirection::Ascending),
            -1 => Ok(SortDirection::Descending),
            other => Err(McpError::invalid_arg(
                "sort",
                format!("direction must be 1 or -1, got {}", other),
            )),
        }
    }
}

/// Ordered list of sort keys. Earlier keys take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec(Vec<(String, SortDirection)>);

impl SortSpec {
    /// Build a sort spec, rejecting empty field names.
    pub fn new(keys: Vec<(String, SortDirection)>) -> Result<Self> {
        if keys.iter().any(|(field, _)| field.is_empty()) {
            return Err(McpError::invalid_arg("sort", "field names must be non-empty"));
        }
        Ok(Self(keys))
    }

    /// Whether no sort keys were given.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The sort keys in precedence order.
    pub fn keys(&self) -> &[(String, SortDirection)] {
        &self.0
    }

    /// Render as a MongoDB sort document, preserving key order.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        for (field, direction) in &self.0 {
            doc.insert(field.clone(), direction.as_i32());
        }
        doc
    }
}

/// Parameters of a find.
#[derive(Debug, Clone)]
pub struct FindCommand {
    /// Collection to query.
    pub collection: CollectionName,
    /// Filter document, `{}` matches everything.
    pub filter: Document,
    /// Maximum number of documents returned, always positive.
    pub limit: u64,
    /// Optional sort, applied before the limit.
    pub sort: Option<SortSpec>,
}

impl FindCommand {
    /// A find with the default filter and limit.
    pub fn new(collection: CollectionName) -> Self {
        Self {
            collection,
            filter: Document::new(),
            limit: DEFAULT_FIND_LIMIT,
            sort: None,
        }
    }
}

/// Parameters of a multi-document update.
#[derive(Debug, Clone)]
pub struct UpdateCommand {
    /// Collection to update.
    pub collection: CollectionName,
    /// Selects the documents to update.
    pub query: Document,
    /// Update operators, passed through uninterpreted.
    pub update: Document,
    /// Insert a new document when nothing matches.
    pub upsert: bool,
}

/// One gateway operation with its validated parameters.
#[derive(Debug, Clone)]
pub enum Command {
    /// Open (or replace) the session.
    Connect(ConnectConfig),
    /// Drop the session.
    Disconnect,
    /// List collection names of the selected database.
    ListCollections,
    /// Query documents.
    Find(FindCommand),
    /// Insert a single document.
    Insert {
        /// Target collection.
        collection: CollectionName,
        /// Non-empty document to insert.
        document: Document,
    },
    /// Update every matching document.
    Update(UpdateCommand),
    /// Delete every matching document.
    Delete {
        /// Target collection.
        collection: CollectionName,
        /// Selects the documents to delete.
        query: Document,
    },
    /// Storage statistics of a collection.
    Stats {
        /// Target collection.
        collection: CollectionName,
    },
}

impl Command {
    /// Build an insert, rejecting an empty document.
    pub fn insert(collection: CollectionName, document: Document) -> Result<Self> {
        let command = Command::Insert {
            collection,
            document,
        };
        command.validate()?;
        Ok(command)
    }

    /// Check the shape rules that the public fields cannot enforce.
    ///
    /// The gateway runs this on every command, so values built by hand are
    /// held to the same rules as parsed tool calls.
    pub fn validate(&self) -> Result<()> {
        match self {
            Command::Connect(config) => {
                if config.database_name.trim().is_empty() {
                    return Err(McpError::invalid_arg(
                        "database_name",
                        "must be a non-empty name",
                    ));
                }
                if config.timeout.is_zero() {
                    return Err(McpError::invalid_arg(
                        "timeout_ms",
                        "must be a positive integer",
                    ));
                }
            }
            // A zero limit means "no limit" to the server
            Command::Find(find) if find.limit == 0 => {
                return Err(McpError::invalid_arg("limit", "must be a positive integer"));
            }
            Command::Insert { document, .. } if document.is_empty() => {
                return Err(McpError::invalid_arg("document", "must not be empty"));
            }
            _ => {}
        }
        Ok(())
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Connect(_) => "connect",
            Command::Disconnect => "disconnect",
            Command::ListCollections => "list_collections",
            Command::Find(_) => "find",
            Command::Insert { .. } => "insert",
            Command::Update(_) => "update",
            Command::Delete { .. } => "delete",
            Command::Stats { .. } => "stats",
        }
    }

    /// Phrase used to prefix failure messages, as in "Error finding documents".
    pub fn action(&self) -> &'static str {
        match self {
            Command::Connect(_) => "connecting",
            Command::Disconnect => "disconnecting",
            Command::ListCollections => "listing collections",
            Command::Find(_) => "finding documents",
            Command::Insert { .. } => "inserting document",
            Command::Update(_) => "updating documents",
            Command::Delete { .. } => "deleting documents",
            Command::Stats { .. } => "getting collection stats",
        }
    }

    /// Whether the command can only run against a live session.
    pub fn requires_session(&self) -> bool {
        !matches!(
            self,
            Command::Connect(_) | Command::Disconnect | Command::ListCollections
        )
    }
}
