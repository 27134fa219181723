//! Mapping between catalogue operations and MCP tools

use obsidian_bridge_core::{InvocationError, InvocationResult, OperationCatalogue, OperationSpec, Payload};
use serde_json::{json, Value};

use crate::protocol::{CallToolResult, ContentBlock, Tool, ToolAnnotations};

/// Describe one catalogue operation as an MCP tool
pub fn tool_for(spec: &OperationSpec) -> Tool {
    Tool {
        name: spec.name().to_string(),
        title: Some(spec.title.to_string()),
        description: spec.description.to_string(),
        input_schema: spec.input_schema(),
        annotations: Some(ToolAnnotations {
            title: Some(spec.title.to_string()),
            read_only_hint: spec.read_only,
            destructive_hint: spec.destructive,
            idempotent_hint: spec.read_only,
            open_world_hint: false,
        }),
    }
}

pub fn list_tools(catalogue: &OperationCatalogue) -> Vec<Tool> {
    catalogue.operations().iter().map(tool_for).collect()
}

/// Wrap a gateway outcome for `tools/call`. Errors become an `isError` result so the
/// calling model can read them.
pub fn call_result(result: InvocationResult) -> CallToolResult {
    match result {
        Ok(payload) => success_result(payload),
        Err(err) => error_result(&err),
    }
}

fn success_result(payload: Payload) -> CallToolResult {
    match payload {
        Payload::Empty => CallToolResult {
            content: Vec::new(),
            structured_content: None,
            is_error: false,
        },
        Payload::Text(text) => CallToolResult {
            content: vec![ContentBlock::text(text)],
            structured_content: None,
            is_error: false,
        },
        Payload::Json(value) => {
            let text = Payload::Json(value.clone()).to_text();
            CallToolResult {
                content: vec![ContentBlock::text(text)],
                structured_content: Some(structured(value)),
                is_error: false,
            }
        }
    }
}

/// Structured content must be an object
fn structured(value: Value) -> Value {
    match value {
        Value::Object(_) => value,
        other => json!({ "result": other }),
    }
}

pub fn error_result(err: &InvocationError) -> CallToolResult {
    CallToolResult {
        content: vec![ContentBlock::text(format!(
            "Error {}: {}",
            err.code(),
            err.message()
        ))],
        structured_content: Some(err.to_json()),
        is_error: true,
    }
}
