//! MCP server command

use anyhow::{Context, Result};
use clap::Args;
use obsidian_bridge_mcp::{serve_http, serve_stdio, McpServer};
use std::sync::Arc;
use tracing::info;

use crate::cli::{ConnectionArgs, DEFAULT_HTTP_HOST, DEFAULT_HTTP_PORT};
use crate::utils::build_gateway;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Serve over stdio (default)
    #[arg(long, conflicts_with = "http")]
    pub stdio: bool,

    /// Serve over HTTP; without an address binds 0.0.0.0 on --http-port
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    pub http: Option<String>,

    /// Port for the HTTP transport when no address is given
    #[arg(long = "http-port", env = "PORT", default_value_t = DEFAULT_HTTP_PORT)]
    pub http_port: u16,

    /// Refuse to start without an API key
    #[arg(long)]
    pub require_api_key: bool,
}

impl ServeArgs {
    /// Bind address for the HTTP transport, if selected
    pub fn http_addr(&self) -> Option<String> {
        self.http.as_ref().map(|addr| {
            if addr.trim().is_empty() {
                format!("{}:{}", DEFAULT_HTTP_HOST, self.http_port)
            } else {
                addr.trim().to_string()
            }
        })
    }
}

pub async fn execute(args: ServeArgs, connection: &ConnectionArgs) -> Result<()> {
    info!("Starting obsidian-bridge MCP server");

    let gateway = build_gateway(connection.to_config(), args.require_api_key)
        .context("Failed to configure vault gateway")?;
    let server = McpServer::new(gateway);

    match args.http_addr() {
        Some(addr) => {
            info!("Starting HTTP MCP server on {}", addr);
            serve_http(Arc::new(server), &addr)
                .await
                .with_context(|| format!("HTTP transport on {} failed", addr))?;
        }
        None => {
            if !args.stdio {
                info!("No transport specified, defaulting to stdio");
            }
            serve_stdio(server).await.context("stdio transport failed")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn serve_args(argv: &[&str]) -> ServeArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Commands::Serve { args } => args,
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_stdio_is_default() {
        let args = serve_args(&["obsidian-bridge", "serve"]);
        assert!(args.http_addr().is_none());
        assert!(!args.require_api_key);
    }

    #[test]
    fn test_http_without_address_uses_port() {
        let args = serve_args(&["obsidian-bridge", "serve", "--http", "--http-port", "9000"]);
        assert_eq!(args.http_addr().as_deref(), Some("0.0.0.0:9000"));
    }

    #[test]
    fn test_http_with_address() {
        let args = serve_args(&["obsidian-bridge", "serve", "--http", "127.0.0.1:7000"]);
        assert_eq!(args.http_addr().as_deref(), Some("127.0.0.1:7000"));
    }

    #[test]
    fn test_stdio_conflicts_with_http() {
        assert!(Cli::try_parse_from(["obsidian-bridge", "serve", "--stdio", "--http"]).is_err());
    }
}
