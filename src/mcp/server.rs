//! MCP server implementation using pmcp (Pragmatic AI's rust-mcp-sdk).
//!
//! Provides the MCP server over stdio (for Claude Desktop and other MCP
//! clients) and over streamable HTTP/SSE.

use async_trait::async_trait;
use pmcp::{
    server::streamable_http_server::StreamableHttpServer, Error, RequestHandlerExtra, Server,
    ServerCapabilities, ToolHandler, ToolInfo,
};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::mcp::tools::ToolRegistry;

/// The MCP server for the clinical-trials tools
#[derive(Debug, Clone)]
pub struct McpServer {
    tools: ToolRegistry,
}

impl McpServer {
    /// Create a new MCP server around a tool registry
    pub fn new(tools: ToolRegistry) -> Self {
        Self { tools }
    }

    /// Build a pmcp Server with every registered tool attached
    fn build_server(&self) -> Result<Server, pmcp::Error> {
        let mut builder = Server::builder()
            .name("clinical-trials-mcp")
            .version(env!("CARGO_PKG_VERSION"))
            .capabilities(ServerCapabilities::default());

        for tool in self.tools.all() {
            let wrapper = ToolWrapper {
                name: tool.name.clone(),
                description: Some(tool.description.clone()),
                input_schema: tool.input_schema.clone(),
                handler: tool.handler.clone(),
            };
            builder = builder.tool(wrapper.name.clone(), wrapper);
        }

        builder.build()
    }

    /// Run the server in stdio mode (for Claude Desktop and other MCP clients)
    pub async fn run(&self) -> Result<(), pmcp::Error> {
        tracing::info!("Starting MCP server in stdio mode");
        let server = self.build_server()?;
        server.run_stdio().await
    }

    /// Run the server in HTTP/SSE mode
    pub async fn run_http(&self, addr: &str) -> Result<(SocketAddr, JoinHandle<()>), pmcp::Error> {
        tracing::info!("Starting MCP server in HTTP/SSE mode on {}", addr);

        let socket_addr: SocketAddr = addr
            .parse()
            .map_err(|e| Error::invalid_params(format!("Invalid address: {e}")))?;

        let server = Arc::new(Mutex::new(self.build_server()?));
        let http_server = StreamableHttpServer::new(socket_addr, server);
        http_server.start().await
    }
}

/// Wrapper for adapting our Tool to pmcp's ToolHandler
#[derive(Clone)]
struct ToolWrapper {
    name: String,
    description: Option<String>,
    input_schema: Value,
    handler: Arc<dyn crate::mcp::tools::ToolHandler>,
}

#[async_trait]
impl ToolHandler for ToolWrapper {
    async fn handle(&self, args: Value, _extra: RequestHandlerExtra) -> Result<Value, Error> {
        self.handler
            .execute(args)
            .await
            .map_err(|e| Error::internal(&e))
    }

    fn metadata(&self) -> Option<ToolInfo> {
        Some(ToolInfo::new(
            self.name.clone(),
            self.description.clone(),
            self.input_schema.clone(),
        ))
    }
}
