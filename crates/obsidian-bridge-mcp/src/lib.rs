//! MCP (Model Context Protocol) server for obsidian-bridge
//!
//! Exposes every vault operation as an MCP tool over two transports: newline
//! delimited JSON-RPC on stdio and `POST /mcp` over HTTP.

pub mod error;
pub mod jsonrpc;
pub mod protocol;
pub mod server;
pub mod tools;

pub use error::{McpError, McpResult};
pub use server::{router, serve_http, serve_stdio, McpServer};
