//! Collection statistics tool.
//!
//! Tools: get_collection_stats

use serde_json::{Map, Value as JsonValue};

use crate::command::Command;
use crate::error::{McpError, Result};
use crate::schema;
use crate::tools::documents::get_collection_arg;
use crate::tools::ToolDef;

/// Storage statistics of a collection.
pub const STATS: &str = "get_collection_stats";

/// Get all stats tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![ToolDef::new(
        STATS,
        "Get storage statistics for a collection: document count, data size, average \
         document size, storage size and index count (all sizes in bytes).",
        schema!(object {
            required: { "collection_name": string }
        }),
    )]
}

/// Validate a stats tool call.
pub fn parse(name: &str, args: &Map<String, JsonValue>) -> Result<Command> {
    match name {
        STATS => Ok(Command::Stats {
            collection: get_collection_arg(args)?,
        }),
        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}
