//! MCP (Model Context Protocol) Server Implementation
//!
//! A complete MCP server over stdio following the JSON-RPC 2.0 specification
//! and MCP protocol version 2025-06-18, exposing the weather lookups as
//! tools and a templated resource.

#[cfg(test)]
mod tests;

pub mod errors;
pub mod protocol;
pub mod resources;
pub mod server;
pub mod tools;
pub mod validation;

pub use errors::{McpError, McpResult};
pub use protocol::{
    CallToolParams, CallToolResult, ReadResourceResult, Resource, Tool, ToolContent,
};
pub use server::{HandlerOutput, McpServer, MessageHandler, ResourceHandler, ToolHandler};
