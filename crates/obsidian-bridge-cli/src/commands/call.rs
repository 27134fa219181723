//! Invoke one vault operation from the command line

use obsidian_bridge_core::Payload;
use serde_json::{json, Value as JsonValue};
use tracing::debug;

use crate::{
    cli::{ConnectionArgs, OutputFormat},
    error::{CliError, CliResult},
    utils::{build_gateway, ColoredOutput},
};

pub struct CallCommand;

impl CallCommand {
    pub async fn run(
        connection: &ConnectionArgs,
        operation: &str,
        args: Option<String>,
        format: OutputFormat,
    ) -> CliResult<()> {
        let arguments = Self::parse_arguments(args.as_deref())?;
        let gateway = build_gateway(connection.to_config(), false)?;

        debug!(operation, "Invoking from command line");
        let payload = gateway.invoke(operation, &arguments).await?;

        match format {
            OutputFormat::Json => {
                println!("{}", format.format_json(&Self::payload_json(payload))?);
            }
            OutputFormat::Text | OutputFormat::Table => {
                if payload.is_empty() {
                    eprintln!("{} {}", ColoredOutput::success("✓"), operation);
                } else {
                    println!("{}", payload.to_text());
                }
            }
        }
        Ok(())
    }

    fn parse_arguments(raw: Option<&str>) -> CliResult<JsonValue> {
        let Some(raw) = raw else {
            return Ok(json!({}));
        };
        let value: JsonValue = serde_json::from_str(raw)
            .map_err(|e| CliError::InvalidArgument(format!("Invalid JSON arguments: {}", e)))?;
        if !value.is_object() {
            return Err(CliError::InvalidArgument(
                "Arguments must be a JSON object".to_string(),
            ));
        }
        Ok(value)
    }

    fn payload_json(payload: Payload) -> JsonValue {
        match payload {
            Payload::Json(value) => value,
            Payload::Text(text) => JsonValue::String(text),
            Payload::Empty => JsonValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arguments() {
        assert_eq!(CallCommand::parse_arguments(None).unwrap(), json!({}));
        assert_eq!(
            CallCommand::parse_arguments(Some(r#"{"filepath": "a.md"}"#)).unwrap(),
            json!({"filepath": "a.md"})
        );
        assert!(matches!(
            CallCommand::parse_arguments(Some("[1, 2]")),
            Err(CliError::InvalidArgument(_))
        ));
        assert!(matches!(
            CallCommand::parse_arguments(Some("{oops")),
            Err(CliError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_payload_json() {
        assert_eq!(
            CallCommand::payload_json(Payload::Text("# a".into())),
            json!("# a")
        );
        assert_eq!(CallCommand::payload_json(Payload::Empty), JsonValue::Null);
    }
}
