//! MCP stdio transport
//!
//! Newline-delimited JSON-RPC messages in, one response line per request
//! out. Notifications get no response.

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use super::error::{JsonRpcError, McpError};
use super::interface::McpInterface;
use super::types::{JsonRpcRequest, JsonRpcResponse};

/// Serve requests from `reader` until it reaches end of input
pub async fn serve<R, W>(mcp: &McpInterface, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    tracing::info!("MCP server started, waiting for messages");

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(response) = handle_message(mcp, line).await else {
            continue;
        };

        let out = serde_json::to_string(&response)?;
        writer.write_all(out.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }

    mcp.shutdown();
    tracing::info!("MCP server shutting down");
    Ok(())
}

/// Handle a single JSON-RPC message, returning the response to send if any
pub async fn handle_message(mcp: &McpInterface, message: &str) -> Option<JsonRpcResponse> {
    let request: JsonRpcRequest = match serde_json::from_str(message) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "Unparseable JSON-RPC message");
            let error = JsonRpcError::from(McpError::Parse(e.to_string()));
            return Some(JsonRpcResponse::error(Value::Null, error));
        }
    };

    let is_notification = request.is_notification();
    let result = mcp.handle(&request.method, request.params).await;

    if is_notification {
        if let Err(e) = result {
            tracing::warn!(method = %request.method, error = %e, "Notification failed");
        }
        return None;
    }

    let id = request.id.unwrap_or(Value::Null);
    Some(match result {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => {
            tracing::debug!(method = %request.method, error = %e, "Request failed");
            JsonRpcResponse::error(id, e.into())
        }
    })
}
