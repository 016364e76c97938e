//! Connection lifecycle tools.
//!
//! Tools: connect_to_mongodb (alias connect_to_mongodb_atlas),
//! disconnect_from_mongodb, list_collections

use std::time::Duration;

use serde_json::{Map, Value as JsonValue};

use crate::command::Command;
use crate::convert::{get_optional_bool, get_optional_positive, get_string_arg};
use crate::error::{McpError, Result};
use crate::schema;
use crate::session::{ConnectConfig, DEFAULT_TIMEOUT};
use crate::tools::ToolDef;

/// Open a session.
pub const CONNECT: &str = "connect_to_mongodb";
/// Older name of [`CONNECT`], kept for existing callers.
pub const CONNECT_ATLAS: &str = "connect_to_mongodb_atlas";
/// Drop the session.
pub const DISCONNECT: &str = "disconnect_from_mongodb";
/// List collections of the connected database.
pub const LIST_COLLECTIONS: &str = "list_collections";

fn connect_schema() -> JsonValue {
    schema!(object {
        required: { "connection_string": string, "database_name": string },
        optional: {
            "timeout_ms": positive_integer,
            "use_tls": boolean,
            "retry_writes": boolean
        }
    })
}

/// Get all connection tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            CONNECT,
            "Connect to a MongoDB deployment (mongodb:// or mongodb+srv:// connection string) \
             and select a database. Replaces any existing connection. Returns the server \
             version and the collections of the database.",
            connect_schema(),
        ),
        ToolDef::new(
            CONNECT_ATLAS,
            "Same as connect_to_mongodb.",
            connect_schema(),
        ),
        ToolDef::new(
            DISCONNECT,
            "Close the current MongoDB connection. Other tools report 'Not connected' \
             until connect_to_mongodb is called again.",
            schema!(object {}),
        ),
        ToolDef::new(
            LIST_COLLECTIONS,
            "List all collections in the connected database. Returns an empty list \
             when not connected.",
            schema!(object {}),
        ),
    ]
}

/// Validate a connection tool call.
pub fn parse(name: &str, args: &Map<String, JsonValue>) -> Result<Command> {
    match name {
        CONNECT | CONNECT_ATLAS => {
            let connection_string = get_string_arg(args, "connection_string")?;
            if connection_string.trim().is_empty() {
                return Err(McpError::invalid_arg("connection_string", "must not be empty"));
            }
            let database_name = get_string_arg(args, "database_name")?;
            if database_name.trim().is_empty() {
                return Err(McpError::invalid_arg("database_name", "must be a non-empty name"));
            }

            let timeout = get_optional_positive(args, "timeout_ms")?
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_TIMEOUT);
            // `use_ssl` is accepted for callers written against older clients
            let tls = match get_optional_bool(args, "use_tls")? {
                Some(tls) => tls,
                None => get_optional_bool(args, "use_ssl")?.unwrap_or(true),
            };
            let retry_writes = get_optional_bool(args, "retry_writes")?.unwrap_or(true);

            Ok(Command::Connect(
                ConnectConfig::new(connection_string, database_name)
                    .timeout(timeout)
                    .tls(tls)
                    .retry_writes(retry_writes),
            ))
        }

        DISCONNECT => Ok(Command::Disconnect),

        LIST_COLLECTIONS => Ok(Command::ListCollections),

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}
