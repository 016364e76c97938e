//! Document store abstraction.
//!
//! The gateway talks to the database through these two traits. [`Connector`]
//! opens a connection and proves it is alive; [`DocumentStore`] runs the CRUD
//! calls against the selected database. The MongoDB driver implementation
//! lives in [`crate::mongo`].

use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::{Bson, Document};

use crate::error::Result;
use crate::session::ConnectConfig;

/// Query shape handed to [`DocumentStore::find`].
#[derive(Debug, Clone)]
pub struct FindOptions {
    /// Filter document.
    pub filter: Document,
    /// Sort document, applied before the limit.
    pub sort: Option<Document>,
    /// Maximum number of documents.
    pub limit: u64,
}

/// Outcome of a multi-document update.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    /// Documents matched by the query.
    pub matched_count: u64,
    /// Documents actually changed.
    pub modified_count: u64,
    /// Id of the document created by an upsert.
    pub upserted_id: Option<Bson>,
}

/// Storage statistics of a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionStats {
    /// Number of documents.
    pub count: u64,
    /// Uncompressed data size in bytes.
    pub size: u64,
    /// Average document size in bytes.
    pub avg_obj_size: u64,
    /// Allocated storage in bytes.
    pub storage_size: u64,
    /// Number of indexes.
    pub indexes: u64,
}

/// An opened, verified connection.
pub struct Connection {
    /// Store bound to the configured database.
    pub store: Arc<dyn DocumentStore>,
    /// Version reported by the server.
    pub server_version: String,
}

/// Opens connections.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a connection, check liveness and select `config.database_name`.
    ///
    /// Errors should be `ConnectionFailure` for reachability or
    /// authentication problems and `Unexpected` otherwise.
    async fn connect(&self, config: &ConnectConfig) -> Result<Connection>;
}

/// CRUD operations against one database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Names of the collections in the database.
    async fn list_collection_names(&self) -> Result<Vec<String>>;

    /// Documents matching `options.filter`, sorted then limited.
    async fn find(&self, collection: &str, options: FindOptions) -> Result<Vec<Document>>;

    /// Insert one document and return its id.
    async fn insert_one(&self, collection: &str, document: Document) -> Result<Bson>;

    /// Apply `update` to every document matching `query`.
    async fn update_many(
        &self,
        collection: &str,
        query: Document,
        update: Document,
        upsert: bool,
    ) -> Result<UpdateOutcome>;

    /// Delete every document matching `query`, returning how many went.
    async fn delete_many(&self, collection: &str, query: Document) -> Result<u64>;

    /// Storage statistics for `collection`.
    async fn collection_stats(&self, collection: &str) -> Result<CollectionStats>;
}
