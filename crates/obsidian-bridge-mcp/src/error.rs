//! Error handling for the MCP server

use crate::jsonrpc::JsonRpcError;
use thiserror::Error;

pub type McpResult<T> = Result<T, McpError>;

/// Protocol-level failures. Gateway failures never surface here; they travel
/// inside a `CallToolResult` with `isError` set.
#[derive(Debug, Error)]
pub enum McpError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl McpError {
    pub fn to_jsonrpc_error(&self) -> JsonRpcError {
        match self {
            McpError::Serialization(e) => {
                JsonRpcError::invalid_params().with_data(serde_json::json!({
                    "message": e.to_string()
                }))
            }
            McpError::InvalidRequest(msg) => {
                JsonRpcError::invalid_request().with_data(serde_json::json!({
                    "message": msg
                }))
            }
            McpError::InvalidParams(msg) => {
                JsonRpcError::invalid_params().with_data(serde_json::json!({
                    "message": msg
                }))
            }
            McpError::MethodNotFound(method) => {
                JsonRpcError::method_not_found().with_data(serde_json::json!({
                    "method": method
                }))
            }
            McpError::ToolNotFound(name) => {
                JsonRpcError::method_not_found().with_data(serde_json::json!({
                    "message": format!("Unknown tool: {}", name)
                }))
            }
            _ => JsonRpcError::internal_error().with_data(serde_json::json!({
                "message": self.to_string()
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jsonrpc::{INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND};

    #[test]
    fn test_tool_not_found_maps_to_method_not_found() {
        let err = McpError::ToolNotFound("greet".into()).to_jsonrpc_error();
        assert_eq!(err.code, METHOD_NOT_FOUND);
        assert_eq!(err.data.unwrap()["message"], "Unknown tool: greet");
    }

    #[test]
    fn test_bad_params_map_to_invalid_params() {
        let serde_err = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        assert_eq!(
            McpError::Serialization(serde_err).to_jsonrpc_error().code,
            INVALID_PARAMS
        );
        assert_eq!(
            McpError::InvalidParams("missing".into()).to_jsonrpc_error().code,
            INVALID_PARAMS
        );
    }

    #[test]
    fn test_internal_fallback() {
        let err = McpError::Internal("boom".into()).to_jsonrpc_error();
        assert_eq!(err.code, INTERNAL_ERROR);
        assert_eq!(err.data.unwrap()["message"], "Internal error: boom");
    }
}
