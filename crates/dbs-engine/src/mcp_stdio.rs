use crate::error::DbsError;
use crate::mcp::McpServer;
use crate::mcp_types::{
    McpRequest, McpResponse, INVALID_PARAMS, METHOD_NOT_FOUND, PARSE_ERROR,
};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{stdin, stdout};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};
use tracing::{error, info, warn};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Requests longer than this are rejected rather than buffered.
const MAX_LINE_LENGTH: usize = 16 * 1024 * 1024;

/// Serves newline-delimited JSON-RPC over stdin/stdout until stdin closes.
pub async fn run_mcp_stdio(server: Arc<McpServer>) -> anyhow::Result<()> {
    let mut reader = FramedRead::new(stdin(), LinesCodec::new_with_max_length(MAX_LINE_LENGTH));
    let mut writer = FramedWrite::new(stdout(), LinesCodec::new());

    info!("MCP stdio transport ready");
    while let Some(line) = reader.next().await {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Dropping unreadable request line: {}", e);
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        if let Some(response) = handle_line(&server, &line).await {
            writer.send(serde_json::to_string(&response)?).await?;
        }
    }

    info!("stdin closed, shutting down");
    Ok(())
}

/// Handles one request line. Returns `None` for notifications.
pub async fn handle_line(server: &McpServer, line: &str) -> Option<McpResponse> {
    let request: McpRequest = match serde_json::from_str(line) {
        Ok(req) => req,
        Err(e) => {
            warn!("Malformed request: {}", e);
            return Some(McpResponse::failure(None, PARSE_ERROR, format!("Parse error: {}", e)));
        }
    };

    let id = request.id.clone()?;
    Some(handle_request(server, id, request).await)
}

async fn handle_request(server: &McpServer, id: Value, request: McpRequest) -> McpResponse {
    let id = Some(id);
    match request.method.as_str() {
        "initialize" => McpResponse::success(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": "dbs-mcp",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        ),
        "ping" => McpResponse::success(id, json!({})),
        "tools/list" => McpResponse::success(id, json!({ "tools": server.list_tools() })),
        "tools/call" => {
            let params = request.params.unwrap_or_default();
            let Some(name) = params.get("name").and_then(Value::as_str) else {
                return McpResponse::failure(id, INVALID_PARAMS, "Missing tool name");
            };
            let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

            match server.call_tool(name, arguments).await {
                Ok(result) => McpResponse::success(id, tool_content(&result, false)),
                Err(DbsError::ToolNotFound(name)) => {
                    McpResponse::failure(id, METHOD_NOT_FOUND, format!("Tool not found: {}", name))
                }
                Err(DbsError::InvalidArguments(msg)) => {
                    McpResponse::failure(id, INVALID_PARAMS, format!("Invalid arguments: {}", msg))
                }
                Err(e) => {
                    error!("Tool {} failed: {}", name, e);
                    McpResponse::success(id, tool_content(&Value::String(e.to_string()), true))
                }
            }
        }
        other => McpResponse::failure(id, METHOD_NOT_FOUND, format!("Method not found: {}", other)),
    }
}

fn tool_content(result: &Value, is_error: bool) -> Value {
    let text = match result {
        Value::String(s) => s.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|e| {
            error!("Failed to encode tool result: {}", e);
            String::new()
        }),
    };
    json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error
    })
}
