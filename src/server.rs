//! MCP server implementation.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::RwLock;

use crate::browser::SessionController;
use crate::error::{codes, Result};
use crate::notion::DocumentStore;
use crate::protocol::{
    InitializeParams, InitializeResult, JsonRpcId, JsonRpcRequest, JsonRpcResponse,
    ListToolsResult, McpMessage, ServerCapabilities, ServerInfo, ToolCallParams, ToolsCapability,
};
use crate::tools::{self, browser::BrowserContext, notion::NotionContext, ToolRegistry};

/// MCP protocol version.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Name the Notion server announces.
pub const NOTION_SERVER_NAME: &str = "notion-mcp-server";

/// Name the browser server announces.
pub const BROWSER_SERVER_NAME: &str = "browser-mcp-server";

/// Server version.
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP server state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Waiting for initialization.
    Uninitialized,
    /// Server is initialized and ready.
    Ready,
    /// Server is shutting down.
    ShuttingDown,
}

/// MCP server dispatching tool calls to a [`ToolRegistry`].
pub struct McpServer<C> {
    name: String,
    state: Arc<RwLock<ServerState>>,
    tools: Arc<ToolRegistry<C>>,
}

impl<C: Send + Sync + 'static> McpServer<C> {
    /// Create a server announcing itself as `name`.
    pub fn new(name: impl Into<String>, tools: ToolRegistry<C>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(RwLock::new(ServerState::Uninitialized)),
            tools: Arc::new(tools),
        }
    }

    /// Current state.
    pub async fn state(&self) -> ServerState {
        *self.state.read().await
    }

    /// Run the server on stdio.
    pub async fn run_stdio(&self) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        tracing::info!(server = %self.name, "MCP server starting on stdio");
        self.run(stdin, stdout).await
    }

    /// Serve line-delimited JSON-RPC from `reader`, answering on `writer`.
    ///
    /// Returns at end of input or once the client asks to shut down.
    pub async fn run<R, W>(&self, reader: R, mut writer: W) -> Result<()>
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

            tracing::debug!(message = %line, "received");

            if let Some(response) = self.handle_message(line).await {
                let mut json = serde_json::to_string(&response)?;
                tracing::debug!(message = %json, "sending");
                json.push('\n');
                writer.write_all(json.as_bytes()).await?;
                writer.flush().await?;
            }

            if *self.state.read().await == ServerState::ShuttingDown {
                break;
            }
        }

        tracing::info!(server = %self.name, "MCP server shutting down");
        Ok(())
    }

    /// Handle an incoming message.
    pub async fn handle_message(&self, json: &str) -> Option<JsonRpcResponse> {
        match McpMessage::parse(json) {
            Ok(McpMessage::Request(request)) => Some(self.handle_request(request).await),
            Ok(McpMessage::Notification(notification)) => {
                self.handle_notification(notification).await;
                None
            }
            // We don't expect responses in this direction
            Ok(McpMessage::Response(_)) => None,
            Err(e) => Some(JsonRpcResponse::error(None, e.code(), e.to_string())),
        }
    }

    /// Handle a JSON-RPC request.
    async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params).await,
            "tools/list" => self.handle_tools_list(id).await,
            "tools/call" => self.handle_tools_call(id, request.params).await,
            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),
            "shutdown" => {
                *self.state.write().await = ServerState::ShuttingDown;
                JsonRpcResponse::success(id, serde_json::json!({}))
            }
            _ => JsonRpcResponse::error(
                id,
                codes::METHOD_NOT_FOUND,
                format!("method not found: {}", request.method),
            ),
        }
    }

    /// Handle a notification (no response expected).
    async fn handle_notification(&self, notification: JsonRpcRequest) {
        match notification.method.as_str() {
            "notifications/initialized" => tracing::info!("client initialized"),
            "notifications/cancelled" => tracing::debug!("request cancelled by client"),
            "exit" => *self.state.write().await = ServerState::ShuttingDown,
            other => tracing::debug!(method = other, "unknown notification"),
        }
    }

    async fn handle_initialize(
        &self,
        id: Option<JsonRpcId>,
        params: Option<serde_json::Value>,
    ) -> JsonRpcResponse {
        let Some(params) = params else {
            return JsonRpcResponse::error(id, codes::INVALID_PARAMS, "initialize params required");
        };
        let params: InitializeParams = match serde_json::from_value(params) {
            Ok(params) => params,
            Err(e) => {
                return JsonRpcResponse::error(
                    id,
                    codes::INVALID_PARAMS,
                    format!("invalid initialize params: {e}"),
                );
            }
        };

        tracing::info!(
            client = %params.client_info.name,
            client_version = %params.client_info.version,
            protocol = %params.protocol_version,
            "initializing"
        );
        *self.state.write().await = ServerState::Ready;

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.into(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: self.name.clone(),
                version: SERVER_VERSION.into(),
            },
        };

        JsonRpcResponse::success(id, result)
    }

    async fn handle_tools_list(&self, id: Option<JsonRpcId>) -> JsonRpcResponse {
        if *self.state.read().await != ServerState::Ready {
            return JsonRpcResponse::error(id, codes::INTERNAL_ERROR, "server not initialized");
        }

        let result = ListToolsResult {
            tools: self.tools.list_tools(),
        };
        JsonRpcResponse::success(id, result)
    }

    async fn handle_tools_call(
        &self,
        id: Option<JsonRpcId>,
        params: Option<serde_json::Value>,
    ) -> JsonRpcResponse {
        if *self.state.read().await != ServerState::Ready {
            return JsonRpcResponse::error(id, codes::INTERNAL_ERROR, "server not initialized");
        }

        let Some(params) = params else {
            return JsonRpcResponse::error(id, codes::INVALID_PARAMS, "tool call params required");
        };
        let params: ToolCallParams = match serde_json::from_value(params) {
            Ok(params) => params,
            Err(e) => {
                return JsonRpcResponse::error(
                    id,
                    codes::INVALID_PARAMS,
                    format!("invalid tool call params: {e}"),
                );
            }
        };

        tracing::debug!(tool = %params.name, "calling tool");
        let result = self.tools.call(&params.name, params.arguments).await;
        JsonRpcResponse::success(id, result)
    }
}

impl McpServer<NotionContext> {
    /// Notion server with `read_page` and `create_page`.
    pub fn notion(store: Arc<dyn DocumentStore>) -> Self {
        Self::new(
            NOTION_SERVER_NAME,
            tools::notion::registry(NotionContext::new(store)),
        )
    }
}

impl McpServer<BrowserContext> {
    /// Browser server with the seven page tools.
    pub fn browser(session: Arc<SessionController>, default_timeout: Duration) -> Self {
        Self::new(
            BROWSER_SERVER_NAME,
            tools::browser::registry(BrowserContext::new(session, default_timeout)),
        )
    }

    /// Session shared by the browser tools.
    pub fn session(&self) -> &Arc<SessionController> {
        &self.tools.context().session
    }
}
