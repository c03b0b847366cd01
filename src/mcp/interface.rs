//! MCP method routing
//!
//! Answers the lifecycle methods itself and forwards `tools/*` to the
//! registry once the handshake is complete.

use std::sync::Arc;

use serde_json::{json, Value};

use super::{
    error::McpError,
    schema::methods_to_mcp_tools,
    state::{Session, SessionState},
    types::{
        Implementation, InitializeParams, InitializeResult, ServerCapabilities, ToolsCallParams,
        ToolsCallResult, ToolsCapability, ToolsListResult, LATEST_VERSION, SUPPORTED_VERSIONS,
    },
};
use crate::error::ErrorPayload;
use crate::registry::{RegistryError, ToolRegistry};

/// One MCP server session over a shared tool registry
pub struct McpInterface {
    registry: Arc<ToolRegistry>,
    session: Session,
    server_info: Implementation,
}

impl McpInterface {
    pub fn new(registry: Arc<ToolRegistry>, server_name: impl Into<String>) -> Self {
        Self {
            registry,
            session: Session::new(),
            server_info: Implementation {
                name: server_name.into(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn server_info(&self) -> &Implementation {
        &self.server_info
    }

    /// Dispatch one request or notification by method name
    ///
    /// Notifications return `Value::Null`; the transport does not answer them.
    pub async fn handle(&self, method: &str, params: Value) -> Result<Value, McpError> {
        tracing::debug!(method = %method, "Handling MCP request");

        match method {
            // Lifecycle
            "initialize" => self.handle_initialize(params),
            "notifications/initialized" => self.handle_initialized(),

            // Utility
            "ping" => Ok(json!({})),

            // Tools
            "tools/list" => self.handle_tools_list(),
            "tools/call" => self.handle_tools_call(params).await,

            // Other notifications (cancellation, progress) need no action
            other if other.starts_with("notifications/") => {
                tracing::debug!(method = %other, "Ignoring notification");
                Ok(Value::Null)
            }

            // Unknown method
            _ => Err(McpError::MethodNotFound(method.to_string())),
        }
    }

    /// Mark the session as closing, if it was ever fully established
    pub fn shutdown(&self) {
        if self.session.is_ready() {
            if let Err(e) = self.session.advance(SessionState::ShuttingDown) {
                tracing::warn!(error = %e, "Failed to enter shutdown state");
            }
        }
    }

    // === Lifecycle Handlers ===

    fn handle_initialize(&self, params: Value) -> Result<Value, McpError> {
        let params: InitializeParams =
            serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        let protocol_version = if SUPPORTED_VERSIONS.contains(&params.protocol_version.as_str()) {
            params.protocol_version.clone()
        } else {
            tracing::warn!(
                requested = %params.protocol_version,
                offered = LATEST_VERSION,
                "Unsupported protocol version requested"
            );
            LATEST_VERSION.to_string()
        };

        self.session.advance(SessionState::Initializing)?;

        tracing::info!(
            client = %params.client_info.name,
            client_version = %params.client_info.version,
            protocol = %protocol_version,
            "MCP session initializing"
        );

        let result = InitializeResult {
            protocol_version,
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
            server_info: self.server_info.clone(),
        };
        Ok(serde_json::to_value(result)?)
    }

    fn handle_initialized(&self) -> Result<Value, McpError> {
        self.session.advance(SessionState::Ready)?;
        tracing::info!("MCP session ready");
        Ok(Value::Null)
    }

    // === Tool Handlers ===

    fn handle_tools_list(&self) -> Result<Value, McpError> {
        self.session.require_ready()?;

        let result = ToolsListResult {
            tools: methods_to_mcp_tools(self.registry.list_tools()),
        };
        Ok(serde_json::to_value(result)?)
    }

    async fn handle_tools_call(&self, params: Value) -> Result<Value, McpError> {
        self.session.require_ready()?;

        let params: ToolsCallParams =
            serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        tracing::info!(tool = %params.name, "Calling tool");

        let (payload, is_error) = match self.registry.route(&params.name, params.arguments).await
        {
            Ok(reply) => (reply.payload, reply.is_error),
            Err(RegistryError::ToolNotFound(name)) => return Err(McpError::ToolNotFound(name)),
            Err(RegistryError::InvalidParams(msg)) => {
                let payload = ErrorPayload::new("INVALID_INPUT", format!("Invalid arguments: {msg}"));
                (serde_json::to_value(payload)?, true)
            }
            Err(RegistryError::Serialization(msg)) => return Err(McpError::Internal(msg)),
        };

        if is_error {
            tracing::info!(tool = %params.name, payload = %payload, "Tool returned an error");
        }

        let result = ToolsCallResult::json(&payload, is_error)?;
        Ok(serde_json::to_value(result)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interface() -> McpInterface {
        McpInterface::new(Arc::new(ToolRegistry::new()), "Test Pizza")
    }

    fn initialize_params(version: &str) -> Value {
        json!({
            "protocolVersion": version,
            "capabilities": {},
            "clientInfo": {"name": "test-client", "version": "0.1.0"}
        })
    }

    #[tokio::test]
    async fn test_new_interface() {
        let mcp = interface();

        assert_eq!(mcp.server_info().name, "Test Pizza");
        assert!(!mcp.server_info().version.is_empty());
        assert_eq!(mcp.session().current(), SessionState::Uninitialized);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let mcp = interface();

        let result = mcp.handle("unknown/method", Value::Null).await;
        assert!(matches!(result, Err(McpError::MethodNotFound(_))));
    }

    #[tokio::test]
    async fn test_handshake() {
        let mcp = interface();

        let result = mcp
            .handle("initialize", initialize_params("2024-11-05"))
            .await
            .unwrap();
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["serverInfo"]["name"], "Test Pizza");
        assert!(result["capabilities"]["tools"].is_object());
        assert_eq!(mcp.session().current(), SessionState::Initializing);

        mcp.handle("notifications/initialized", Value::Null)
            .await
            .unwrap();
        assert_eq!(mcp.session().current(), SessionState::Ready);

        mcp.shutdown();
        assert_eq!(mcp.session().current(), SessionState::ShuttingDown);
    }

    #[tokio::test]
    async fn test_unsupported_version_gets_latest() {
        let mcp = interface();

        let result = mcp
            .handle("initialize", initialize_params("1999-01-01"))
            .await
            .unwrap();
        assert_eq!(result["protocolVersion"], LATEST_VERSION);
    }

    #[tokio::test]
    async fn test_double_initialize_rejected() {
        let mcp = interface();

        mcp.handle("initialize", initialize_params("2025-03-26"))
            .await
            .unwrap();
        let result = mcp
            .handle("initialize", initialize_params("2025-03-26"))
            .await;
        assert!(matches!(result, Err(McpError::Session(_))));
    }

    #[tokio::test]
    async fn test_tools_require_ready() {
        let mcp = interface();

        let result = mcp.handle("tools/list", Value::Null).await;
        assert!(matches!(result, Err(McpError::Session(_))));

        let result = mcp
            .handle("tools/call", json!({"name": "get_pizzas"}))
            .await;
        assert!(matches!(result, Err(McpError::Session(_))));
    }

    #[tokio::test]
    async fn test_ping_any_state() {
        let mcp = interface();
        assert_eq!(mcp.handle("ping", Value::Null).await.unwrap(), json!({}));
    }
}
