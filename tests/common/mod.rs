//! In-memory document store used by the integration tests.
//!
//! Understands just enough of MongoDB's filter and update syntax to exercise
//! the gateway: equality, `$eq/$ne/$gt/$gte/$lt/$lte/$in` and
//! `$set/$inc/$unset`. Unknown operators fail the way a server would.

#![allow(dead_code)]

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;

use async_trait::async_trait;
use mongo_mcp::bson::oid::ObjectId;
use mongo_mcp::bson::{Bson, Document};
use mongo_mcp::{
    CollectionStats, ConnectConfig, Connection, Connector, DocumentStore, FindOptions, McpError,
    Result, UpdateOutcome,
};
use parking_lot::Mutex;

/// Connection strings accepted by [`MemoryConnector`] start with this.
pub const MEMORY_URI: &str = "memory://localhost";

type Databases = BTreeMap<String, BTreeMap<String, Vec<Document>>>;

/// Opens [`MemoryStore`]s that share one set of databases.
#[derive(Clone, Default)]
pub struct MemoryConnector {
    databases: Arc<Mutex<Databases>>,
    connects: Arc<AtomicUsize>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful connects so far.
    pub fn connects(&self) -> usize {
        self.connects.load(AtomicOrdering::SeqCst)
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, config: &ConnectConfig) -> Result<Connection> {
        if !config.connection_string.starts_with("memory://") {
            return Err(McpError::ConnectionFailure(format!(
                "No servers available for {}",
                config.connection_string.rsplit('@').next().unwrap_or_default()
            )));
        }

        self.connects.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(Connection {
            store: Arc::new(MemoryStore {
                databases: self.databases.clone(),
                database: config.database_name.clone(),
            }),
            server_version: "7.0.0-memory".to_string(),
        })
    }
}

/// One database inside a [`MemoryConnector`].
pub struct MemoryStore {
    databases: Arc<Mutex<Databases>>,
    database: String,
}

fn failure(message: impl Into<String>) -> McpError {
    McpError::OperationFailure {
        code: None,
        message: message.into(),
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}

fn compare(a: &Bson, b: &Bson) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (as_f64(a), as_f64(b)) {
        return x.partial_cmp(&y);
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        _ if a == b => Some(Ordering::Equal),
        _ => None,
    }
}

fn is_operator_doc(value: &Bson) -> bool {
    matches!(value, Bson::Document(d) if d.keys().next().is_some_and(|k| k.starts_with('$')))
}

fn op_matches(value: Option<&Bson>, op: &str, arg: &Bson) -> Result<bool> {
    let ord = value.and_then(|v| compare(v, arg));
    Ok(match op {
        "$eq" => ord == Some(Ordering::Equal),
        "$ne" => ord != Some(Ordering::Equal),
        "$gt" => ord == Some(Ordering::Greater),
        "$gte" => matches!(ord, Some(Ordering::Greater | Ordering::Equal)),
        "$lt" => ord == Some(Ordering::Less),
        "$lte" => matches!(ord, Some(Ordering::Less | Ordering::Equal)),
        "$in" => match arg {
            Bson::Array(options) => options
                .iter()
                .any(|o| value.and_then(|v| compare(v, o)) == Some(Ordering::Equal)),
            _ => return Err(failure("$in needs an array")),
        },
        other => return Err(failure(format!("unknown operator: {}", other))),
    })
}

fn matches(doc: &Document, filter: &Document) -> Result<bool> {
    for (key, cond) in filter {
        if key.starts_with('$') {
            return Err(failure(format!("unknown top level operator: {}", key)));
        }
        let value = doc.get(key);
        let ok = match cond {
            Bson::Document(ops) if is_operator_doc(cond) => {
                let mut all = true;
                for (op, arg) in ops {
                    all &= op_matches(value, op, arg)?;
                }
                all
            }
            _ => value.and_then(|v| compare(v, cond)) == Some(Ordering::Equal),
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

fn apply_update(doc: &mut Document, update: &Document) -> Result<bool> {
    if update.is_empty() || update.keys().any(|k| !k.starts_with('$')) {
        return Err(failure("update document requires atomic operators"));
    }

    let before = doc.clone();
    for (op, fields) in update {
        let Bson::Document(fields) = fields else {
            return Err(failure(format!("{} needs a document", op)));
        };
        for (field, arg) in fields {
            match op.as_str() {
                "$set" => {
                    doc.insert(field.clone(), arg.clone());
                }
                "$unset" => {
                    doc.remove(field);
                }
                "$inc" => {
                    let current = doc.get(field).and_then(as_f64).unwrap_or(0.0);
                    let delta = as_f64(arg).ok_or_else(|| failure("$inc needs a number"))?;
                    let sum = current + delta;
                    let both_ints = doc.get(field).map_or(true, |v| !matches!(v, Bson::Double(_)))
                        && !matches!(arg, Bson::Double(_));
                    let value = if both_ints {
                        Bson::Int64(sum as i64)
                    } else {
                        Bson::Double(sum)
                    };
                    doc.insert(field.clone(), value);
                }
                other => return Err(failure(format!("unknown update operator: {}", other))),
            }
        }
    }
    Ok(*doc != before)
}

fn sort_documents(docs: &mut [Document], sort: &Document) {
    docs.sort_by(|a, b| {
        for (field, dir) in sort {
            let ord = match (a.get(field), b.get(field)) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(x), Some(y)) => compare(x, y).unwrap_or(Ordering::Equal),
            };
            let ord = if as_f64(dir).is_some_and(|d| d < 0.0) {
                ord.reverse()
            } else {
                ord
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

impl MemoryStore {
    fn with_collection<T>(
        &self,
        collection: &str,
        f: impl FnOnce(&mut Vec<Document>) -> Result<T>,
    ) -> Result<T> {
        let mut databases = self.databases.lock();
        let db = databases.entry(self.database.clone()).or_default();
        let docs = db.entry(collection.to_string()).or_default();
        f(docs)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_collection_names(&self) -> Result<Vec<String>> {
        let databases = self.databases.lock();
        Ok(databases
            .get(&self.database)
            .map(|db| db.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn find(&self, collection: &str, options: FindOptions) -> Result<Vec<Document>> {
        let databases = self.databases.lock();
        let Some(docs) = databases.get(&self.database).and_then(|db| db.get(collection)) else {
            return Ok(Vec::new());
        };

        let mut found = Vec::new();
        for doc in docs {
            if matches(doc, &options.filter)? {
                found.push(doc.clone());
            }
        }
        if let Some(sort) = &options.sort {
            sort_documents(&mut found, sort);
        }
        found.truncate(options.limit as usize);
        Ok(found)
    }

    async fn insert_one(&self, collection: &str, mut document: Document) -> Result<Bson> {
        let id = match document.get("_id") {
            Some(id) => id.clone(),
            None => {
                let id = Bson::ObjectId(ObjectId::new());
                let mut with_id = Document::new();
                with_id.insert("_id", id.clone());
                for (key, value) in document {
                    with_id.insert(key, value);
                }
                document = with_id;
                id
            }
        };

        self.with_collection(collection, |docs| {
            if docs.iter().any(|d| d.get("_id") == Some(&id)) {
                return Err(failure(format!(
                    "E11000 duplicate key error collection: {} index: _id_",
                    collection
                )));
            }
            docs.push(document);
            Ok(id)
        })
    }

    async fn update_many(
        &self,
        collection: &str,
        query: Document,
        update: Document,
        upsert: bool,
    ) -> Result<UpdateOutcome> {
        self.with_collection(collection, |docs| {
            let mut matched_count = 0;
            let mut modified_count = 0;
            for doc in docs.iter_mut() {
                if matches(doc, &query)? {
                    matched_count += 1;
                    if apply_update(doc, &update)? {
                        modified_count += 1;
                    }
                }
            }

            let mut upserted_id = None;
            if matched_count == 0 && upsert {
                let id = Bson::ObjectId(ObjectId::new());
                let mut doc = Document::new();
                doc.insert("_id", id.clone());
                for (key, value) in &query {
                    if !key.starts_with('$') && !is_operator_doc(value) {
                        doc.insert(key.clone(), value.clone());
                    }
                }
                apply_update(&mut doc, &update)?;
                docs.push(doc);
                upserted_id = Some(id);
            }

            Ok(UpdateOutcome {
                matched_count,
                modified_count,
                upserted_id,
            })
        })
    }

    async fn delete_many(&self, collection: &str, query: Document) -> Result<u64> {
        let mut databases = self.databases.lock();
        let Some(docs) = databases
            .get_mut(&self.database)
            .and_then(|db| db.get_mut(collection))
        else {
            return Ok(0);
        };

        // Evaluate every filter first so a bad operator deletes nothing
        let mut doomed = Vec::with_capacity(docs.len());
        for doc in docs.iter() {
            doomed.push(matches(doc, &query)?);
        }
        let before = docs.len();
        let mut flags = doomed.into_iter();
        docs.retain(|_| !flags.next().unwrap_or(false));
        Ok((before - docs.len()) as u64)
    }

    async fn collection_stats(&self, collection: &str) -> Result<CollectionStats> {
        let databases = self.databases.lock();
        let docs = databases
            .get(&self.database)
            .and_then(|db| db.get(collection))
            .ok_or_else(|| failure(format!("Collection [{}.{}] not found.", self.database, collection)))?;

        let size: u64 = docs
            .iter()
            .map(|d| mongo_mcp::bson::to_vec(d).map(|b| b.len() as u64).unwrap_or(0))
            .sum();
        let count = docs.len() as u64;
        Ok(CollectionStats {
            count,
            size,
            avg_obj_size: if count == 0 { 0 } else { size / count },
            storage_size: size.next_multiple_of(4096).max(4096),
            indexes: 1,
        })
    }
}
