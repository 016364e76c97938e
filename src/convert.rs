//! Conversion utilities between JSON and BSON.
//!
//! Tool arguments arrive as `serde_json` values and are turned into BSON
//! documents using MongoDB extended JSON rules, so `{"$oid": "..."}` or
//! `{"$date": ...}` become the matching BSON types. Documents coming back from
//! the store are rendered as relaxed extended JSON.

use mongodb::bson::{Bson, Document};
use serde_json::{Map, Value as JsonValue};

use crate::error::{McpError, Result};

/// Convert a JSON object into a BSON document.
///
/// `name` is the argument the value came from and is only used for errors.
pub fn json_to_document(name: &str, json: JsonValue) -> Result<Document> {
    if !json.is_object() {
        return Err(McpError::invalid_arg(
            name,
            format!("expected an object, got {}", json_kind(&json)),
        ));
    }

    match Bson::try_from(json) {
        Ok(Bson::Document(doc)) => Ok(doc),
        Ok(other) => Err(McpError::invalid_arg(
            name,
            format!(
                "expected a document, got extended JSON {:?}",
                other.element_type()
            ),
        )),
        Err(e) => Err(McpError::invalid_arg(name, e.to_string())),
    }
}

/// Convert a BSON document to relaxed extended JSON.
pub fn document_to_json(doc: Document) -> JsonValue {
    Bson::Document(doc).into_relaxed_extjson()
}

/// Render an identifier assigned by the store as a plain string.
///
/// ObjectIds become their hex form; strings are returned unquoted.
pub fn id_to_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.clone().into_relaxed_extjson().to_string(),
    }
}

fn json_kind(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

/// Helper to get a required string argument from JSON arguments.
pub fn get_string_arg(args: &Map<String, JsonValue>, name: &str) -> Result<String> {
    match args.get(name) {
        Some(JsonValue::String(s)) => Ok(s.clone()),
        Some(JsonValue::Null) | None => Err(McpError::MissingArg(name.to_string())),
        Some(other) => Err(McpError::invalid_arg(
            name,
            format!("expected a string, got {}", json_kind(other)),
        )),
    }
}

/// Helper to get an optional string argument from JSON arguments.
pub fn get_optional_string(args: &Map<String, JsonValue>, name: &str) -> Result<Option<String>> {
    match args.get(name) {
        Some(JsonValue::Null) | None => Ok(None),
        Some(_) => get_string_arg(args, name).map(Some),
    }
}

/// Helper to get an optional positive integer argument.
pub fn get_optional_positive(args: &Map<String, JsonValue>, name: &str) -> Result<Option<u64>> {
    match args.get(name) {
        Some(JsonValue::Null) | None => Ok(None),
        Some(v) => match v.as_u64() {
            Some(n) if n > 0 => Ok(Some(n)),
            _ => Err(McpError::invalid_arg(name, "must be a positive integer")),
        },
    }
}

/// Helper to get an optional boolean argument.
pub fn get_optional_bool(args: &Map<String, JsonValue>, name: &str) -> Result<Option<bool>> {
    match args.get(name) {
        Some(JsonValue::Null) | None => Ok(None),
        Some(JsonValue::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(McpError::invalid_arg(
            name,
            format!("expected a boolean, got {}", json_kind(other)),
        )),
    }
}

/// Helper to get a required document argument.
pub fn get_document_arg(args: &Map<String, JsonValue>, name: &str) -> Result<Document> {
    match args.get(name) {
        Some(JsonValue::Null) | None => Err(McpError::MissingArg(name.to_string())),
        Some(v) => json_to_document(name, v.clone()),
    }
}

/// Helper to get an optional document argument, defaulting to `{}`.
pub fn get_optional_document(args: &Map<String, JsonValue>, name: &str) -> Result<Document> {
    match args.get(name) {
        Some(JsonValue::Null) | None => Ok(Document::new()),
        Some(v) => json_to_document(name, v.clone()),
    }
}
