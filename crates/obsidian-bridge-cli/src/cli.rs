//! CLI argument definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use obsidian_bridge_gateway::config::{
    parse_flag, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_READ_TIMEOUT_MS,
    ENV_API_KEY, ENV_CONNECT_TIMEOUT_MS, ENV_HOST, ENV_PORT, ENV_PROTOCOL, ENV_READ_TIMEOUT_MS,
    ENV_VERIFY_SSL,
};
use obsidian_bridge_gateway::{ConnectionConfig, Protocol};

use crate::error::{CliError, CliResult};

pub const DEFAULT_HTTP_PORT: u16 = 8081;
pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";

#[derive(Parser)]
#[command(
    name = "obsidian-bridge",
    about = "MCP bridge to an Obsidian vault through the Local REST API",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Enable verbose logging
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,
}

/// How to reach the vault service
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    #[arg(long, env = ENV_API_KEY, hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    #[arg(long, env = ENV_PROTOCOL, default_value = "https", global = true)]
    pub protocol: Protocol,

    #[arg(long, env = ENV_HOST, default_value = DEFAULT_HOST, global = true)]
    pub host: String,

    #[arg(long, env = ENV_PORT, default_value_t = DEFAULT_PORT, global = true)]
    pub port: u16,

    /// Verify the vault service's TLS certificate (it is self-signed by default)
    #[arg(
        long,
        env = ENV_VERIFY_SSL,
        default_value = "false",
        value_parser = parse_bool_flag,
        action = clap::ArgAction::Set,
        global = true
    )]
    pub verify_ssl: bool,

    #[arg(long, env = ENV_CONNECT_TIMEOUT_MS, default_value_t = DEFAULT_CONNECT_TIMEOUT_MS, global = true)]
    pub connect_timeout_ms: u64,

    #[arg(long, env = ENV_READ_TIMEOUT_MS, default_value_t = DEFAULT_READ_TIMEOUT_MS, global = true)]
    pub read_timeout_ms: u64,
}

impl ConnectionArgs {
    pub fn to_config(&self) -> ConnectionConfig {
        ConnectionConfig::new(self.api_key.clone().unwrap_or_default())
            .with_protocol(self.protocol)
            .with_host(&self.host)
            .with_port(self.port)
            .with_verify_ssl(self.verify_ssl)
            .with_timeouts(self.connect_timeout_ms, self.read_timeout_ms)
    }
}

fn parse_bool_flag(value: &str) -> Result<bool, String> {
    Ok(parse_flag(value))
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the MCP server (stdio by default)
    Serve {
        #[command(flatten)]
        args: crate::commands::ServeArgs,
    },

    /// List the tools exposed to MCP clients
    Tools {
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Invoke a single operation against the vault
    Call {
        /// Operation name, e.g. get_file_contents
        operation: String,

        /// Arguments as a JSON object
        #[arg(long, short = 'a')]
        args: Option<String>,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Text,
    Json,
}

impl OutputFormat {
    pub fn format_json(&self, value: &serde_json::Value) -> CliResult<String> {
        serde_json::to_string_pretty(value).map_err(CliError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_args_to_config() {
        let cli = Cli::try_parse_from([
            "obsidian-bridge",
            "--api-key",
            "secret",
            "--protocol",
            "http",
            "--host",
            "http://vault.local/",
            "--port",
            "27123",
            "--verify-ssl",
            "true",
            "--read-timeout-ms",
            "9000",
            "tools",
        ])
        .unwrap();

        let config = cli.connection.to_config();
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.protocol, Protocol::Http);
        assert_eq!(config.host, "vault.local");
        assert_eq!(config.port, 27123);
        assert!(config.verify_ssl);
        assert_eq!(config.timeouts.read_ms, 9000);
        assert_eq!(config.base_url(), "http://vault.local:27123");
    }

    #[test]
    fn test_unrecognized_protocol_means_https() {
        let cli = Cli::try_parse_from(["obsidian-bridge", "--protocol", "ftp", "tools"]).unwrap();
        assert_eq!(cli.connection.protocol, Protocol::Https);
    }

    #[test]
    fn test_parse_bool_flag() {
        assert_eq!(parse_bool_flag("yes"), Ok(true));
        assert_eq!(parse_bool_flag("0"), Ok(false));
    }
}
