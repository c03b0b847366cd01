//! Protocol-level failures and their JSON-RPC error objects
//!
//! Tool failures are not listed here; they travel back as `isError`
//! payloads inside a successful `tools/call` result.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::state::SessionError;

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;
/// MCP: request arrived before the handshake completed
pub const SERVER_NOT_INITIALIZED: i32 = -32002;

#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Unknown tool: {0}")]
    ToolNotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl McpError {
    pub fn code(&self) -> i32 {
        match self {
            McpError::Parse(_) => PARSE_ERROR,
            McpError::MethodNotFound(_) => METHOD_NOT_FOUND,
            McpError::InvalidParams(_) | McpError::ToolNotFound(_) => INVALID_PARAMS,
            McpError::Session(SessionError::NotReady(_)) => SERVER_NOT_INITIALIZED,
            McpError::Session(SessionError::OutOfOrder { .. }) => INVALID_REQUEST,
            McpError::Internal(_) | McpError::Serialization(_) => INTERNAL_ERROR,
        }
    }
}

/// The `error` member of a JSON-RPC response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<McpError> for JsonRpcError {
    fn from(e: McpError) -> Self {
        let data = match &e {
            McpError::ToolNotFound(name) => Some(serde_json::json!({ "tool": name })),
            _ => None,
        };
        JsonRpcError {
            code: e.code(),
            message: e.to_string(),
            data,
        }
    }
}
