//! Command gateway.
//!
//! Single entry point between tool calls and the database session. Every
//! command goes through [`Gateway::execute`], which enforces the session
//! precondition once, runs the command and folds any failure into an error
//! [`Envelope`].

use std::sync::Arc;

use parking_lot::RwLock;

use crate::command::{Command, FindCommand, UpdateCommand};
use crate::convert::{document_to_json, id_to_string};
use crate::envelope::{Envelope, Payload};
use crate::error::{McpError, Result};
use crate::mongo::MongoConnector;
use crate::session::{ConnectConfig, Session};
use crate::store::{Connector, FindOptions};

/// Mediates between callers and one database session.
///
/// The session slot is only locked long enough to clone or swap the
/// `Arc<Session>`, so commands never wait on each other's I/O and always see
/// either a complete session or none.
pub struct Gateway {
    connector: Arc<dyn Connector>,
    session: RwLock<Option<Arc<Session>>>,
}

impl Gateway {
    /// Create a disconnected gateway that opens sessions with `connector`.
    pub fn new(connector: impl Connector + 'static) -> Self {
        Self {
            connector: Arc::new(connector),
            session: RwLock::new(None),
        }
    }

    /// Create a disconnected gateway backed by the MongoDB driver.
    pub fn mongo() -> Self {
        Self::new(MongoConnector::new())
    }

    /// The current session, if connected.
    pub fn session(&self) -> Option<Arc<Session>> {
        self.session.read().clone()
    }

    /// Whether a session is held.
    pub fn is_connected(&self) -> bool {
        self.session.read().is_some()
    }

    /// Run a command and report the outcome as an envelope.
    pub async fn execute(&self, command: Command) -> Envelope {
        tracing::debug!(command = command.name(), "executing command");

        if let Err(err) = command.validate() {
            tracing::debug!(command = command.name(), error = %err, "rejected command");
            return Envelope::from_error(&err);
        }

        let command = match command {
            Command::Connect(config) => return self.connect(config).await,
            Command::Disconnect => return self.disconnect(),
            Command::ListCollections => return self.list_collections().await,
            other => other,
        };

        let Some(session) = self.session() else {
            tracing::debug!(command = command.name(), "rejected, not connected");
            return Envelope::from_error(&McpError::NotConnected);
        };

        let action = command.action();
        match Self::run(&session, command).await {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(error = %err, "error {}", action);
                Envelope::error(format!("Error {}: {}", action, err))
            }
        }
    }

    async fn connect(&self, config: ConnectConfig) -> Envelope {
        tracing::info!(database = %config.database_name, "connecting to MongoDB");

        let connection = match self.connector.connect(&config).await {
            Ok(connection) => connection,
            Err(err) => {
                tracing::warn!(error = %err, "connection failed");
                return Envelope::error(match err {
                    McpError::ConnectionFailure(msg) => format!(
                        "Failed to connect to MongoDB: {}. Check your connection string and network access.",
                        msg
                    ),
                    other => format!("Unexpected error connecting to MongoDB: {}", other),
                });
            }
        };

        // A fresh session that cannot list its collections is not usable.
        let collections = match connection.store.list_collection_names().await {
            Ok(names) => names,
            Err(err) => {
                tracing::warn!(error = %err, "listing collections after connect failed");
                return Envelope::error(format!("Unexpected error connecting to MongoDB: {}", err));
            }
        };

        let session = Arc::new(Session::new(
            connection.store,
            connection.server_version,
            config,
        ));
        let database = session.database().to_string();
        let server_version = session.server_version().to_string();

        let previous = self.session.write().replace(session);
        if previous.is_some() {
            tracing::info!("replaced previous session");
        }
        tracing::info!(%database, %server_version, "connected");

        Envelope::success(Payload::Connected {
            database: database.clone(),
            server_version,
            collections,
        })
        .with_message(format!(
            "Successfully connected to MongoDB database: {}",
            database
        ))
    }

    fn disconnect(&self) -> Envelope {
        match self.session.write().take() {
            Some(session) => {
                tracing::info!(database = %session.database(), "disconnected");
                Envelope::success(Payload::Disconnected {
                    was_connected: true,
                    database: Some(session.database().to_string()),
                })
                .with_message(format!("Disconnected from database: {}", session.database()))
            }
            None => Envelope::success(Payload::Disconnected {
                was_connected: false,
                database: None,
            })
            .with_message("Not connected; nothing to disconnect"),
        }
    }

    async fn list_collections(&self) -> Envelope {
        let Some(session) = self.session() else {
            return Envelope::success(Payload::Collections {
                count: 0,
                collections: Vec::new(),
            });
        };

        match session.store().list_collection_names().await {
            Ok(collections) => Envelope::success(Payload::Collections {
                count: collections.len(),
                collections,
            }),
            Err(err) => {
                tracing::warn!(error = %err, "error listing collections");
                Envelope::error(format!("Error listing collections: {}", err))
            }
        }
    }

    async fn run(session: &Session, command: Command) -> Result<Envelope> {
        let store = session.store();

        match command {
            Command::Find(FindCommand {
                collection,
                filter,
                limit,
                sort,
            }) => {
                let options = FindOptions {
                    filter,
                    sort: sort.filter(|s| !s.is_empty()).map(|s| s.to_document()),
                    limit,
                };
                let documents: Vec<_> = store
                    .find(collection.as_str(), options)
                    .await?
                    .into_iter()
                    .map(document_to_json)
                    .collect();

                Ok(Envelope::success(Payload::Documents {
                    count: documents.len(),
                    documents,
                }))
            }

            Command::Insert {
                collection,
                document,
            } => {
                let id = store.insert_one(collection.as_str(), document).await?;
                Ok(Envelope::success(Payload::Inserted {
                    inserted_id: id_to_string(&id),
                })
                .with_message(format!(
                    "Document inserted successfully into {}",
                    collection
                )))
            }

            Command::Update(UpdateCommand {
                collection,
                query,
                update,
                upsert,
            }) => {
                let outcome = store
                    .update_many(collection.as_str(), query, update, upsert)
                    .await?;
                Ok(Envelope::success(Payload::Updated {
                    matched_count: outcome.matched_count,
                    modified_count: outcome.modified_count,
                    upserted_id: outcome.upserted_id.as_ref().map(id_to_string),
                })
                .with_message(format!(
                    "Updated {} documents in {}",
                    outcome.modified_count, collection
                )))
            }

            Command::Delete { collection, query } => {
                let deleted_count = store.delete_many(collection.as_str(), query).await?;
                Ok(Envelope::success(Payload::Deleted { deleted_count }).with_message(
                    format!("Deleted {} documents from {}", deleted_count, collection),
                ))
            }

            Command::Stats { collection } => {
                let stats = store.collection_stats(collection.as_str()).await?;
                Ok(Envelope::success(Payload::Stats {
                    collection_name: collection.to_string(),
                    count: stats.count,
                    size: stats.size,
                    avg_obj_size: stats.avg_obj_size,
                    storage_size: stats.storage_size,
                    indexes: stats.indexes,
                }))
            }

            other => Err(McpError::Unexpected(format!(
                "{} is not a session command",
                other.name()
            ))),
        }
    }
}
