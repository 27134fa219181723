//! List the tools the MCP server exposes

use obsidian_bridge_core::{OperationCatalogue, OperationSpec, Presence};
use obsidian_bridge_mcp::tools::list_tools;
use serde_json::json;

use crate::{
    cli::OutputFormat,
    error::CliResult,
    utils::{truncate_text, ColoredOutput},
};

pub struct ToolsCommand;

impl ToolsCommand {
    pub fn run(format: OutputFormat) -> CliResult<()> {
        let catalogue = OperationCatalogue::new();

        match format {
            OutputFormat::Json => {
                let tools = json!({ "tools": list_tools(&catalogue) });
                println!("{}", format.format_json(&tools)?);
            }
            OutputFormat::Table | OutputFormat::Text => {
                for op in catalogue.operations() {
                    println!("{}", Self::format_row(op));
                }
                println!(
                    "\n{}",
                    ColoredOutput::dim(&format!("{} tools", catalogue.operations().len()))
                );
            }
        }
        Ok(())
    }

    fn format_row(op: &OperationSpec) -> String {
        let marker = if op.destructive {
            ColoredOutput::warning("destructive")
        } else if op.read_only {
            ColoredOutput::success("read-only")
        } else {
            ColoredOutput::dim("write")
        };

        format!(
            "{:<28} {:<12} {}\n{:<28} {}",
            ColoredOutput::highlight(op.name()),
            marker,
            truncate_text(op.description, 72),
            "",
            ColoredOutput::dim(&Self::signature(op))
        )
    }

    /// `name*, other=default` style parameter summary
    fn signature(op: &OperationSpec) -> String {
        if op.params.is_empty() {
            return "(no parameters)".to_string();
        }
        op.params
            .iter()
            .map(|p| match p.presence {
                Presence::Required => format!("{}*", p.name),
                Presence::Default(default) => {
                    format!("{}={}", p.name, default)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}
