//! Uniform response envelope.
//!
//! Every gateway operation answers with an [`Envelope`]: `status` and
//! `message` plus a command-specific payload flattened into the same object.
//! An envelope is an error exactly when it carries no payload: success is only
//! built through [`Envelope::success`], and error constructors take a message
//! alone.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::McpError;

/// Outcome of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The operation completed.
    Success,
    /// The operation failed; see `message`.
    Error,
}

/// Command-specific success payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    /// Result of a connect.
    Connected {
        /// Selected database.
        database: String,
        /// Version reported by the server.
        server_version: String,
        /// Collections present at connect time.
        collections: Vec<String>,
    },
    /// Result of a list-collections.
    Collections {
        /// Number of collections.
        count: usize,
        /// Collection names in store order.
        collections: Vec<String>,
    },
    /// Result of a find.
    Documents {
        /// Number of documents returned.
        count: usize,
        /// Documents as relaxed extended JSON.
        documents: Vec<JsonValue>,
    },
    /// Result of an insert.
    Inserted {
        /// Identifier assigned by the store.
        inserted_id: String,
    },
    /// Result of an update.
    Updated {
        /// Documents matched by the query.
        matched_count: u64,
        /// Documents actually changed.
        modified_count: u64,
        /// Identifier of the upserted document, if one was created.
        #[serde(skip_serializing_if = "Option::is_none")]
        upserted_id: Option<String>,
    },
    /// Result of a disconnect.
    Disconnected {
        /// Whether a session was dropped.
        was_connected: bool,
        /// Database of the dropped session.
        #[serde(skip_serializing_if = "Option::is_none")]
        database: Option<String>,
    },
    /// Result of a delete.
    Deleted {
        /// Documents removed.
        deleted_count: u64,
    },
    /// Result of a stats query.
    Stats {
        /// Collection the stats describe.
        collection_name: String,
        /// Number of documents.
        count: u64,
        /// Uncompressed data size in bytes.
        size: u64,
        /// Average document size in bytes.
        avg_obj_size: u64,
        /// Allocated storage in bytes.
        storage_size: u64,
        /// Number of indexes.
        indexes: u64,
    },
}

/// Uniform success/error response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    payload: Option<Payload>,
}

impl Envelope {
    /// A success envelope with a payload.
    pub fn success(payload: Payload) -> Self {
        Self {
            status: Status::Success,
            message: None,
            payload: Some(payload),
        }
    }

    /// An error envelope.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: Some(message.into()),
            payload: None,
        }
    }

    /// An error envelope carrying the error's own message.
    pub fn from_error(err: &McpError) -> Self {
        Self::error(err.to_string())
    }

    /// Attach a message to a success envelope.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// The status.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Whether the status is success.
    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    /// The message, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The payload, if any.
    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    /// Serialize to a JSON object.
    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or_else(|e| {
            serde_json::json!({ "status": "error", "message": format!("serialization failed: {}", e) })
        })
    }
}
