//! MongoDB driver backend.
//!
//! Implements [`Connector`] and [`DocumentStore`] on top of the official
//! `mongodb` crate. Payloads are forwarded untouched; the driver owns pooling,
//! retries and timeouts.

use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{ClientOptions, Tls, TlsOptions, WriteConcern};
use mongodb::{Client, Collection, Database};

use crate::error::{McpError, Result};
use crate::session::{ConnectConfig, MAX_POOL_SIZE};
use crate::store::{
    CollectionStats, Connection, Connector, DocumentStore, FindOptions, UpdateOutcome,
};

/// Application name reported to the server.
const APP_NAME: &str = "mongo-mcp";

/// Opens connections with the MongoDB driver.
#[derive(Debug, Clone, Default)]
pub struct MongoConnector;

impl MongoConnector {
    /// Create a connector.
    pub fn new() -> Self {
        Self
    }

    /// Translate a connect config into driver options.
    async fn client_options(config: &ConnectConfig) -> Result<ClientOptions> {
        let mut options = ClientOptions::parse(&config.connection_string)
            .await
            .map_err(McpError::from_connect)?;

        options.app_name = Some(APP_NAME.to_string());
        options.server_selection_timeout = Some(config.timeout);
        options.connect_timeout = Some(config.timeout);
        options.max_pool_size = Some(MAX_POOL_SIZE);
        options.retry_writes = Some(config.retry_writes);
        options.write_concern = Some(WriteConcern::majority());
        if config.tls {
            options.tls = Some(Tls::Enabled(TlsOptions::default()));
        }

        Ok(options)
    }
}

#[async_trait]
impl Connector for MongoConnector {
    async fn connect(&self, config: &ConnectConfig) -> Result<Connection> {
        let options = Self::client_options(config).await?;
        let client = Client::with_options(options).map_err(McpError::from_connect)?;

        // Server selection is lazy; the ping is what actually reaches the server.
        let admin = client.database("admin");
        admin
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(McpError::from_connect)?;

        let build_info = admin
            .run_command(doc! { "buildInfo": 1 })
            .await
            .map_err(McpError::from_connect)?;
        let server_version = build_info
            .get_str("version")
            .unwrap_or("unknown")
            .to_string();

        tracing::debug!(
            database = %config.database_name,
            %server_version,
            "MongoDB ping succeeded"
        );

        Ok(Connection {
            store: Arc::new(MongoStore {
                db: client.database(&config.database_name),
            }),
            server_version,
        })
    }
}

/// A database handle backed by a driver client.
#[derive(Debug, Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection(name)
    }
}

/// Read a numeric field of a server reply regardless of its BSON width.
fn number(reply: &Document, key: &str) -> u64 {
    match reply.get(key) {
        Some(Bson::Int32(n)) => u64::try_from(*n).unwrap_or(0),
        Some(Bson::Int64(n)) => u64::try_from(*n).unwrap_or(0),
        Some(Bson::Double(n)) if *n > 0.0 => *n as u64,
        _ => 0,
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn list_collection_names(&self) -> Result<Vec<String>> {
        Ok(self.db.list_collection_names().await?)
    }

    async fn find(&self, collection: &str, options: FindOptions) -> Result<Vec<Document>> {
        let limit = i64::try_from(options.limit).unwrap_or(i64::MAX);
        let coll = self.collection(collection);
        let mut find = coll.find(options.filter).limit(limit);
        if let Some(sort) = options.sort {
            find = find.sort(sort);
        }

        let documents: Vec<Document> = find.await?.try_collect().await?;
        Ok(documents)
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<Bson> {
        let result = self.collection(collection).insert_one(document).await?;
        Ok(result.inserted_id)
    }

    async fn update_many(
        &self,
        collection: &str,
        query: Document,
        update: Document,
        upsert: bool,
    ) -> Result<UpdateOutcome> {
        let result = self
            .collection(collection)
            .update_many(query, update)
            .upsert(upsert)
            .await?;

        Ok(UpdateOutcome {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_id: result.upserted_id,
        })
    }

    async fn delete_many(&self, collection: &str, query: Document) -> Result<u64> {
        let result = self.collection(collection).delete_many(query).await?;
        Ok(result.deleted_count)
    }

    async fn collection_stats(&self, collection: &str) -> Result<CollectionStats> {
        let reply = self.db.run_command(doc! { "collStats": collection }).await?;

        Ok(CollectionStats {
            count: number(&reply, "count"),
            size: number(&reply, "size"),
            avg_obj_size: number(&reply, "avgObjSize"),
            storage_size: number(&reply, "storageSize"),
            indexes: number(&reply, "nindexes"),
        })
    }
}
