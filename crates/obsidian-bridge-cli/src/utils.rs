//! Utility functions for the CLI

use colored::{ColoredString, Colorize};
use obsidian_bridge_gateway::{ConnectionConfig, VaultGateway};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::error::{CliError, CliResult};

/// Initialize tracing. Logs go to stderr; stdout belongs to the stdio transport.
pub fn init_tracing(verbose: bool) -> CliResult<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| CliError::General(format!("Failed to set tracing subscriber: {}", e)))?;

    Ok(())
}

/// Build the shared gateway, enforcing the API key policy
pub fn build_gateway(config: ConnectionConfig, require_api_key: bool) -> CliResult<Arc<VaultGateway>> {
    check_api_key(&config, require_api_key)?;
    info!(base_url = %config.base_url(), verify_ssl = config.verify_ssl, "Vault service");
    Ok(Arc::new(VaultGateway::new(Arc::new(config))?))
}

/// A missing key is only a warning unless the caller asked for it to be fatal
pub fn check_api_key(config: &ConnectionConfig, require_api_key: bool) -> CliResult<()> {
    if config.has_api_key() {
        return Ok(());
    }
    if require_api_key {
        return Err(CliError::MissingApiKey);
    }
    warn!("No API key configured; the vault service will reject authenticated requests");
    Ok(())
}

/// Utility for colored console output
pub struct ColoredOutput;

impl ColoredOutput {
    pub fn success(msg: &str) -> ColoredString {
        msg.green().bold()
    }

    pub fn error(msg: &str) -> ColoredString {
        msg.red().bold()
    }

    pub fn warning(msg: &str) -> ColoredString {
        msg.yellow().bold()
    }

    pub fn dim(msg: &str) -> ColoredString {
        msg.dimmed()
    }

    pub fn highlight(msg: &str) -> ColoredString {
        msg.cyan().bold()
    }
}

/// Truncate text to a maximum number of characters with ellipsis
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
