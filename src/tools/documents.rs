//! Document CRUD tools.
//!
//! Tools: find_documents, insert_document, update_documents, delete_documents
//!
//! Filters and update documents are forwarded in MongoDB's own operator
//! syntax; only their shape (an object) is checked here.

use serde_json::{Map, Value as JsonValue};

use crate::command::{
    CollectionName, Command, FindCommand, SortDirection, SortSpec, UpdateCommand,
    DEFAULT_FIND_LIMIT,
};
use crate::convert::{
    get_document_arg, get_optional_bool, get_optional_document, get_optional_positive,
    get_optional_string, get_string_arg,
};
use crate::error::{McpError, Result};
use crate::schema;
use crate::tools::ToolDef;

/// Query documents.
pub const FIND: &str = "find_documents";
/// Insert one document.
pub const INSERT: &str = "insert_document";
/// Update every matching document.
pub const UPDATE: &str = "update_documents";
/// Delete every matching document.
pub const DELETE: &str = "delete_documents";

/// Get all document tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            FIND,
            "Find documents in a collection. `query` is a MongoDB filter such as \
             {\"age\": {\"$gte\": 25}} (default {} matches all). Results are sorted before \
             `limit` (default 100) is applied. Sort with `sort` as [[field, 1 | -1], ...] \
             or the `sort_field`/`sort_direction` shorthand.",
            schema!(object {
                required: { "collection_name": string },
                optional: {
                    "query": object,
                    "limit": positive_integer,
                    "sort": sort_keys,
                    "sort_field": string,
                    "sort_direction": sort_direction
                }
            }),
        ),
        ToolDef::new(
            INSERT,
            "Insert a single document into a collection. Returns the inserted id.",
            schema!(object {
                required: { "collection_name": string, "document": object }
            }),
        ),
        ToolDef::new(
            UPDATE,
            "Update ALL documents matching `query` using MongoDB update operators \
             (e.g. {\"$set\": {...}}). With `upsert` a document is created when nothing \
             matches. Returns matched, modified and upserted counts.",
            schema!(object {
                required: { "collection_name": string, "query": object, "update": object },
                optional: { "upsert": boolean }
            }),
        ),
        ToolDef::new(
            DELETE,
            "Delete ALL documents matching `query`. An empty query deletes every document \
             in the collection. Returns the deleted count.",
            schema!(object {
                required: { "collection_name": string, "query": object }
            }),
        ),
    ]
}

/// Read and validate the `collection_name` argument.
pub(crate) fn get_collection_arg(args: &Map<String, JsonValue>) -> Result<CollectionName> {
    CollectionName::new(get_string_arg(args, "collection_name")?)
}

fn sort_direction(value: &JsonValue) -> Result<SortDirection> {
    value
        .as_i64()
        .ok_or_else(|| McpError::invalid_arg("sort", "direction must be 1 or -1"))
        .and_then(SortDirection::try_from)
}

fn sort_key(item: &JsonValue) -> Result<(String, SortDirection)> {
    match item {
        JsonValue::Array(pair) if pair.len() == 2 => {
            let field = pair[0]
                .as_str()
                .ok_or_else(|| McpError::invalid_arg("sort", "field name must be a string"))?;
            Ok((field.to_string(), sort_direction(&pair[1])?))
        }
        JsonValue::Object(obj) => {
            let field = obj
                .get("field")
                .and_then(|v| v.as_str())
                .ok_or_else(|| McpError::invalid_arg("sort", "each key needs a 'field' string"))?;
            let direction = match obj.get("direction") {
                Some(v) => sort_direction(v)?,
                None => SortDirection::Ascending,
            };
            Ok((field.to_string(), direction))
        }
        _ => Err(McpError::invalid_arg(
            "sort",
            "each key must be [field, direction] or {field, direction}",
        )),
    }
}

/// Read the sort, from either `sort` or the `sort_field` shorthand.
fn get_sort_arg(args: &Map<String, JsonValue>) -> Result<Option<SortSpec>> {
    match args.get("sort") {
        Some(JsonValue::Null) | None => {}
        Some(JsonValue::Array(items)) => {
            let keys = items.iter().map(sort_key).collect::<Result<Vec<_>>>()?;
            return SortSpec::new(keys).map(Some);
        }
        Some(_) => return Err(McpError::invalid_arg("sort", "expected an array of sort keys")),
    }

    let Some(field) = get_optional_string(args, "sort_field")? else {
        return Ok(None);
    };
    let direction = match args.get("sort_direction") {
        Some(JsonValue::Null) | None => SortDirection::Ascending,
        Some(v) => sort_direction(v)?,
    };
    SortSpec::new(vec![(field, direction)]).map(Some)
}

/// Validate a document tool call.
pub fn parse(name: &str, args: &Map<String, JsonValue>) -> Result<Command> {
    match name {
        FIND => {
            let collection = get_collection_arg(args)?;
            let filter = get_optional_document(args, "query")?;
            let limit = get_optional_positive(args, "limit")?.unwrap_or(DEFAULT_FIND_LIMIT);
            let sort = get_sort_arg(args)?;

            Ok(Command::Find(FindCommand {
                collection,
                filter,
                limit,
                sort,
            }))
        }

        INSERT => {
            let collection = get_collection_arg(args)?;
            let document = get_document_arg(args, "document")?;
            Command::insert(collection, document)
        }

        UPDATE => {
            let collection = get_collection_arg(args)?;
            let query = get_document_arg(args, "query")?;
            let update = get_document_arg(args, "update")?;
            let upsert = get_optional_bool(args, "upsert")?.unwrap_or(false);

            Ok(Command::Update(UpdateCommand {
                collection,
                query,
                update,
                upsert,
            }))
        }

        DELETE => {
            let collection = get_collection_arg(args)?;
            let query = get_document_arg(args, "query")?;
            Ok(Command::Delete { collection, query })
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}
