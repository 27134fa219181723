//! MCP server: JSON-RPC message processing plus the stdio and HTTP transports

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use obsidian_bridge_gateway::VaultGateway;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    error::{McpError, McpResult},
    jsonrpc::{
        error_response, success_response, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
        RequestId, JSONRPC_VERSION,
    },
    protocol::{
        negotiate_version, CallToolParams, Implementation, InitializeParams, InitializeResult,
        ListToolsResult, ServerCapabilities, Tool, ToolsCapability, HEADER_PROTOCOL_VERSION,
        HEADER_SESSION_ID, LATEST_PROTOCOL_VERSION, METHOD_INITIALIZE, METHOD_PING,
        METHOD_TOOLS_CALL, METHOD_TOOLS_LIST, SUPPORTED_PROTOCOL_VERSIONS,
    },
    tools::{call_result, list_tools},
};

pub const SERVER_NAME: &str = "obsidian-bridge";

const INSTRUCTIONS: &str = "Read, search and edit notes in an Obsidian vault through the Local REST API plugin.";

/// MCP server. Stateless apart from the gateway, so one instance is shared by
/// every connection of either transport.
pub struct McpServer {
    gateway: Arc<VaultGateway>,
    tools: Vec<Tool>,
}

impl McpServer {
    pub fn new(gateway: Arc<VaultGateway>) -> Self {
        let tools = list_tools(gateway.catalogue());
        Self { gateway, tools }
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    /// Process one raw message. Returns `None` for notifications.
    pub async fn process_message(&self, body: &[u8]) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to parse JSON-RPC message: {}", e);
                return Some(error_response(
                    None,
                    JsonRpcError::parse_error().with_data(json!({"message": e.to_string()})),
                ));
            }
        };

        let request = match parse_request(value) {
            Ok(request) => request,
            Err((id, e)) => {
                warn!("Rejected JSON-RPC message: {}", e);
                return Some(error_response(id, e.to_jsonrpc_error()));
            }
        };

        if request.is_notification() {
            debug!(method = %request.method, "Received notification, ignoring");
            return None;
        }

        debug!(method = %request.method, "Processing request");
        let id = request.id.clone();
        match self.handle_request(&request).await {
            Ok(result) => Some(success_response(id, result)),
            Err(e) => {
                warn!(method = %request.method, "Request failed: {}", e);
                Some(error_response(id, e.to_jsonrpc_error()))
            }
        }
    }

    async fn handle_request(&self, request: &JsonRpcRequest) -> McpResult<Value> {
        match request.method.as_str() {
            METHOD_INITIALIZE => self.handle_initialize(request.params.as_ref()),
            METHOD_PING => Ok(json!({})),
            METHOD_TOOLS_LIST => self.handle_tools_list(),
            METHOD_TOOLS_CALL => self.handle_tools_call(request.params.as_ref()).await,
            other => Err(McpError::MethodNotFound(other.to_string())),
        }
    }

    fn handle_initialize(&self, params: Option<&Value>) -> McpResult<Value> {
        let params: InitializeParams = match params {
            Some(params) => serde_json::from_value(params.clone())?,
            None => InitializeParams::default(),
        };

        if let Some(client) = &params.client_info {
            info!(client = %client.name, version = %client.version, "MCP client connected");
        }

        let result = InitializeResult {
            protocol_version: negotiate_version(params.protocol_version.as_deref()).to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                title: Some("Obsidian Vault Bridge".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        };

        Ok(serde_json::to_value(result)?)
    }

    fn handle_tools_list(&self) -> McpResult<Value> {
        let result = ListToolsResult {
            tools: self.tools.clone(),
            next_cursor: None,
        };
        Ok(serde_json::to_value(result)?)
    }

    async fn handle_tools_call(&self, params: Option<&Value>) -> McpResult<Value> {
        let params = params
            .ok_or_else(|| McpError::InvalidParams("Missing params for tools/call".to_string()))?;
        let call: CallToolParams = serde_json::from_value(params.clone())?;

        if self.gateway.catalogue().lookup(&call.name).is_err() {
            return Err(McpError::ToolNotFound(call.name));
        }

        debug!(tool = %call.name, "Calling tool");
        let arguments = call.arguments.unwrap_or_else(|| json!({}));
        let result = self.gateway.invoke(&call.name, &arguments).await;

        Ok(serde_json::to_value(call_result(result))?)
    }

    /// Serve newline-delimited JSON-RPC from `reader`, answering on `writer`
    pub async fn serve_lines<R, W>(&self, reader: R, mut writer: W) -> McpResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(response) = self.process_message(line.as_bytes()).await {
                let mut out = serde_json::to_vec(&response)?;
                out.push(b'\n');
                writer.write_all(&out).await?;
                writer.flush().await?;
            }
        }
        Ok(())
    }
}

/// Shape check for a single JSON-RPC message. The request id is returned with
/// the error when it could be read.
fn parse_request(value: Value) -> Result<JsonRpcRequest, (Option<RequestId>, McpError)> {
    if value.is_array() {
        return Err((
            None,
            McpError::InvalidRequest("Batch requests are not supported".to_string()),
        ));
    }

    let request: JsonRpcRequest = serde_json::from_value(value)
        .map_err(|e| (None, McpError::InvalidRequest(e.to_string())))?;

    if request.jsonrpc != JSONRPC_VERSION {
        return Err((
            request.id,
            McpError::InvalidRequest("Invalid JSON-RPC version".to_string()),
        ));
    }

    Ok(request)
}

/// Serve MCP over stdin/stdout until stdin closes
pub async fn serve_stdio(server: McpServer) -> McpResult<()> {
    info!(tools = server.tools().len(), "Starting MCP server (stdio mode)");

    server
        .serve_lines(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
        .inspect_err(|e| error!("stdio transport failed: {}", e))?;

    info!("MCP server stopped");
    Ok(())
}

/// HTTP routes: `POST /mcp` for JSON-RPC and `GET /health`
pub fn router(server: Arc<McpServer>) -> Router {
    let cors = CorsLayer::permissive().expose_headers([
        HeaderName::from_static(HEADER_SESSION_ID),
        HeaderName::from_static(HEADER_PROTOCOL_VERSION),
    ]);

    Router::new()
        .route("/mcp", post(handle_mcp_request))
        .route("/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

/// Serve MCP over HTTP on `addr` until ctrl-c
pub async fn serve_http(server: Arc<McpServer>, addr: &str) -> McpResult<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| McpError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    info!(tools = server.tools().len(), "HTTP MCP server listening on {}", addr);

    axum::serve(listener, router(server))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| McpError::Internal(format!("HTTP server error: {}", e)))?;

    info!("MCP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}

async fn handle_mcp_request(
    State(server): State<Arc<McpServer>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let version = match headers.get(HEADER_PROTOCOL_VERSION) {
        Some(value) => {
            let requested = value.to_str().unwrap_or_default();
            if !SUPPORTED_PROTOCOL_VERSIONS.contains(&requested) {
                warn!("Unsupported MCP protocol version: {}", requested);
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "Unsupported MCP protocol version",
                        "supported_versions": SUPPORTED_PROTOCOL_VERSIONS
                    })),
                )
                    .into_response();
            }
            negotiate_version(Some(requested))
        }
        None => LATEST_PROTOCOL_VERSION,
    };

    let response_headers = mcp_headers(headers.get(HEADER_SESSION_ID), version);

    match server.process_message(&body).await {
        Some(response) => (StatusCode::OK, response_headers, Json(response)).into_response(),
        None => (StatusCode::ACCEPTED, response_headers).into_response(),
    }
}

/// Echo the client's session id or mint one, and state the protocol version in use
fn mcp_headers(session: Option<&HeaderValue>, version: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static(HEADER_PROTOCOL_VERSION),
        HeaderValue::from_static(version),
    );
    let session = session
        .cloned()
        .or_else(|| HeaderValue::from_str(&Uuid::new_v4().to_string()).ok());
    if let Some(session) = session {
        headers.insert(HeaderName::from_static(HEADER_SESSION_ID), session);
    }
    headers
}

async fn health(State(server): State<Arc<McpServer>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "server": SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "tools": server.tools().len(),
    }))
}
