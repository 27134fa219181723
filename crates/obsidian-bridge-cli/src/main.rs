//! obsidian-bridge CLI main entry point

use clap::Parser;
use obsidian_bridge_cli::{
    cli::{Cli, Commands},
    commands::{CallCommand, ToolsCommand},
    error::CliResult,
    utils::{init_tracing, ColoredOutput},
};
use tracing::debug;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{} {}", ColoredOutput::error("Error:"), e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose)?;

    if cli.no_color {
        colored::control::set_override(false);
    }

    debug!("obsidian-bridge v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Serve { args } => {
            obsidian_bridge_cli::commands::serve::execute(args, &cli.connection)
                .await
                .map_err(|e| e.into())
        }

        Commands::Tools { format } => ToolsCommand::run(format),

        Commands::Call {
            operation,
            args,
            format,
        } => CallCommand::run(&cli.connection, &operation, args, format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use obsidian_bridge_cli::cli::OutputFormat;

    #[test]
    fn test_call_command_parsing() {
        let cli = Cli::try_parse_from([
            "obsidian-bridge",
            "call",
            "get_file_contents",
            "--args",
            r#"{"filepath": "Inbox.md"}"#,
            "--format",
            "json",
        ])
        .unwrap();

        if let Commands::Call {
            operation,
            args,
            format,
        } = cli.command
        {
            assert_eq!(operation, "get_file_contents");
            assert_eq!(args, Some(r#"{"filepath": "Inbox.md"}"#.to_string()));
            assert_eq!(format, OutputFormat::Json);
        } else {
            panic!("Expected Call command");
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["obsidian-bridge", "tools", "--no-color", "--port", "1234"])
            .unwrap();
        assert!(cli.no_color);
        assert_eq!(cli.connection.port, 1234);
    }
}
