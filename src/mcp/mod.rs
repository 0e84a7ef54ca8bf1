//! MCP protocol implementation and server.

pub mod server;
pub mod tools;
pub mod trial_tools;

pub use server::McpServer;
pub use tools::{Tool, ToolHandler, ToolRegistry};
