//! Tool registry and category definitions.
//!
//! Provides the infrastructure for registering MCP tools, validating their
//! arguments into [`Command`]s and dispatching them to the [`Gateway`].

pub mod connection;
pub mod documents;
pub mod stats;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::command::Command;
use crate::envelope::Envelope;
use crate::error::{McpError, Result};
use crate::gateway::Gateway;

/// A tool definition for the MCP tools/list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    /// Tool name (e.g., "find_documents")
    pub name: String,
    /// Tool description
    pub description: String,
    /// JSON Schema for the input parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: JsonValue,
}

impl ToolDef {
    /// Create a new tool definition.
    pub fn new(name: &str, description: &str, input_schema: JsonValue) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

/// Registry of all available tools.
pub struct ToolRegistry {
    tools: Vec<ToolDef>,
}

impl ToolRegistry {
    /// Create a new registry with all tools registered.
    pub fn new() -> Self {
        let mut tools = Vec::new();

        tools.extend(connection::tools());
        tools.extend(documents::tools());
        tools.extend(stats::tools());

        Self { tools }
    }

    /// Get all tool definitions.
    pub fn tools(&self) -> &[ToolDef] {
        &self.tools
    }

    /// Validate a tool call into a command.
    pub fn parse(&self, name: &str, args: &Map<String, JsonValue>) -> Result<Command> {
        match name {
            connection::CONNECT
            | connection::CONNECT_ATLAS
            | connection::DISCONNECT
            | connection::LIST_COLLECTIONS => {
                connection::parse(name, args)
            }
            documents::FIND | documents::INSERT | documents::UPDATE | documents::DELETE => {
                documents::parse(name, args)
            }
            stats::STATS => stats::parse(name, args),
            _ => Err(McpError::UnknownTool(name.to_string())),
        }
    }

    /// Dispatch a tool call to the gateway.
    ///
    /// Argument validation failures and every gateway failure come back as an
    /// error envelope; anything else from parsing (an unknown tool) is `Err`.
    pub async fn dispatch(
        &self,
        gateway: &Gateway,
        name: &str,
        args: Map<String, JsonValue>,
    ) -> Result<Envelope> {
        match self.parse(name, &args) {
            Ok(command) => Ok(gateway.execute(command).await),
            Err(err) if err.is_validation() => {
                tracing::debug!(tool = name, error = %err, "rejected tool arguments");
                Ok(Envelope::error(format!(
                    "Invalid arguments for {}: {}",
                    name, err
                )))
            }
            Err(err) => Err(err),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper macro for creating JSON Schema for tool input parameters.
#[macro_export]
macro_rules! schema {
    // Object with required and optional properties
    (object {
        required: { $($req_name:literal : $req_type:tt),* $(,)? },
        optional: { $($opt_name:literal : $opt_type:tt),* $(,)? }
    }) => {{
        let mut required: Vec<&str> = Vec::new();
        $(required.push($req_name);)*

        let mut props = serde_json::Map::new();
        $(props.insert($req_name.to_string(), $crate::schema!(@type $req_type));)*
        $(props.insert($opt_name.to_string(), $crate::schema!(@type $opt_type));)*

        serde_json::json!({
            "type": "object",
            "properties": props,
            "required": required
        })
    }};

    // Object with only required properties
    (object {
        required: { $($req_name:literal : $req_type:tt),* $(,)? }
    }) => {{
        let mut required: Vec<&str> = Vec::new();
        $(required.push($req_name);)*

        let mut props = serde_json::Map::new();
        $(props.insert($req_name.to_string(), $crate::schema!(@type $req_type));)*

        serde_json::json!({
            "type": "object",
            "properties": props,
            "required": required
        })
    }};

    // Empty object (no parameters)
    (object {}) => {{
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }};

    // Type mappings
    (@type string) => { serde_json::json!({"type": "string"}) };
    (@type integer) => { serde_json::json!({"type": "integer"}) };
    (@type positive_integer) => { serde_json::json!({"type": "integer", "minimum": 1}) };
    (@type boolean) => { serde_json::json!({"type": "boolean"}) };
    (@type object) => { serde_json::json!({"type": "object"}) };
    (@type sort_direction) => { serde_json::json!({"type": "integer", "enum": [1, -1]}) };
    (@type sort_keys) => {
        serde_json::json!({
            "type": "array",
            "items": {
                "oneOf": [
                    {
                        "type": "array",
                        "prefixItems": [{"type": "string"}, {"type": "integer", "enum": [1, -1]}],
                        "minItems": 2,
                        "maxItems": 2
                    },
                    {
                        "type": "object",
                        "properties": {
                            "field": {"type": "string"},
                            "direction": {"type": "integer", "enum": [1, -1]}
                        },
                        "required": ["field"]
                    }
                ]
            }
        })
    };
}
