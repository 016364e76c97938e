//! Error types for the MCP server.
//!
//! Maps MongoDB driver errors onto the gateway's error taxonomy and onto
//! JSON-RPC error codes.

use mongodb::error::{Error as DriverError, ErrorKind, WriteFailure};
use serde::{Deserialize, Serialize};

/// MCP server errors.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize)]
pub enum McpError {
    /// A command that needs a session was issued before a successful connect.
    #[error("Not connected to database")]
    NotConnected,

    /// The database could not be reached or authenticated against.
    #[error("{0}")]
    ConnectionFailure(String),

    /// The driver rejected or failed an operation.
    #[error("{message}")]
    OperationFailure {
        /// Server error code, when the server reported one
        code: Option<i32>,
        /// Human-readable error message
        message: String,
    },

    /// Anything that fits none of the other categories.
    #[error("{0}")]
    Unexpected(String),

    /// Unknown tool requested.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Missing required argument.
    #[error("missing required argument: {0}")]
    MissingArg(String),

    /// Invalid argument value.
    #[error("invalid argument '{name}': {reason}")]
    InvalidArg {
        /// Argument name
        name: String,
        /// Reason why it's invalid
        reason: String,
    },

    /// JSON-RPC protocol error.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl McpError {
    /// Build an `InvalidArg` error.
    pub fn invalid_arg(name: &str, reason: impl Into<String>) -> Self {
        McpError::InvalidArg {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// Classify a driver error raised while establishing a connection.
    ///
    /// Network, DNS, server selection and authentication problems are
    /// connection-level; everything else (bad URI options, ...) is unexpected.
    pub fn from_connect(err: DriverError) -> Self {
        match err.kind.as_ref() {
            ErrorKind::Authentication { .. }
            | ErrorKind::ServerSelection { .. }
            | ErrorKind::DnsResolve { .. }
            | ErrorKind::Io(_)
            | ErrorKind::ConnectionPoolCleared { .. } => {
                McpError::ConnectionFailure(err.to_string())
            }
            _ => McpError::Unexpected(err.to_string()),
        }
    }

    /// Whether the error came from argument validation.
    pub fn is_validation(&self) -> bool {
        matches!(self, McpError::MissingArg(_) | McpError::InvalidArg { .. })
    }
}

impl From<DriverError> for McpError {
    fn from(err: DriverError) -> Self {
        let code = match err.kind.as_ref() {
            ErrorKind::Command(cmd) => Some(cmd.code),
            ErrorKind::Write(WriteFailure::WriteError(we)) => Some(we.code),
            ErrorKind::Write(WriteFailure::WriteConcernError(wce)) => Some(wce.code),
            _ => None,
        };

        McpError::OperationFailure {
            code,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for McpError {
    fn from(err: std::io::Error) -> Self {
        McpError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for McpError {
    fn from(err: serde_json::Error) -> Self {
        McpError::Protocol(format!("JSON error: {}", err))
    }
}

/// JSON-RPC error codes.
pub mod rpc_codes {
    /// Parse error - Invalid JSON was received.
    pub const PARSE_ERROR: i32 = -32700;
    /// Invalid Request - The JSON sent is not a valid Request object.
    pub const INVALID_REQUEST: i32 = -32600;
    /// Method not found - The method does not exist / is not available.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid params - Invalid method parameter(s).
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error - Internal JSON-RPC error.
    pub const INTERNAL_ERROR: i32 = -32603;
}

impl McpError {
    /// Convert to JSON-RPC error code.
    pub fn rpc_code(&self) -> i32 {
        match self {
            McpError::UnknownTool(_) => rpc_codes::METHOD_NOT_FOUND,
            McpError::MissingArg(_) | McpError::InvalidArg { .. } => rpc_codes::INVALID_PARAMS,
            McpError::Protocol(_) => rpc_codes::INVALID_REQUEST,
            _ => rpc_codes::INTERNAL_ERROR,
        }
    }
}

/// Result type for MCP operations.
pub type Result<T> = std::result::Result<T, McpError>;
