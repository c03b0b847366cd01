//! MCP (Model Context Protocol) Interface
//!
//! Exposes the tool registry as MCP tools over a stdio JSON-RPC transport.

pub mod error;
pub mod interface;
pub mod schema;
pub mod server;
pub mod state;
pub mod types;

pub use error::{JsonRpcError, McpError};
pub use interface::McpInterface;
pub use server::{handle_message, serve};
pub use state::{Session, SessionError, SessionState};
pub use types::{JsonRpcRequest, JsonRpcResponse, SUPPORTED_VERSIONS};
