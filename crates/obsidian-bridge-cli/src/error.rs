//! Error types for the CLI

use obsidian_bridge_core::InvocationError;
use obsidian_bridge_gateway::{config::ENV_API_KEY, GatewayError};
use obsidian_bridge_mcp::McpError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("MCP server error: {0}")]
    Mcp(#[from] McpError),

    #[error("{0}")]
    Invocation(#[from] InvocationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{} is not set; pass --api-key or set the environment variable", ENV_API_KEY)]
    MissingApiKey,

    #[error("General error: {0}")]
    General(String),
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        Self::General(format!("{:#}", err))
    }
}

pub type CliResult<T> = Result<T, CliError>;
