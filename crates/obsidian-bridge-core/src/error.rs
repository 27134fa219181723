use serde::Serialize;
use thiserror::Error;

use crate::types::Payload;

/// Outcome of a single gateway invocation
pub type InvocationResult = Result<Payload, InvocationError>;

/// Fallback code when the vault service omits `errorCode`
pub const UNKNOWN_REMOTE_CODE: i64 = -1;
/// Fallback message when the vault service omits `message`
pub const UNKNOWN_REMOTE_MESSAGE: &str = "<unknown>";

const VALIDATION_CODE: i64 = -32602;
const UNKNOWN_OPERATION_CODE: i64 = -32601;

/// Normalized failure of an invocation.
///
/// Every failure the gateway can observe is folded into one of these variants before
/// it reaches a transport, so callers never see raw HTTP client errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvocationError {
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Invalid parameters: {0}")]
    Validation(String),

    #[error("Error {code}: {message}")]
    Remote {
        status: u16,
        code: i64,
        message: String,
    },

    #[error("Request failed: {0}")]
    Network(String),

    #[error("Invalid response from vault service: {0}")]
    InvalidResponse(String),
}

/// Coarse classification surfaced to MCP clients next to the code and message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    UnknownOperation,
    Validation,
    RemoteApplication,
    Network,
    InvalidResponse,
}

impl InvocationError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Build a remote error, applying the vault-service defaults for missing fields
    pub fn remote(status: u16, code: Option<i64>, message: Option<String>) -> Self {
        Self::Remote {
            status,
            code: code.unwrap_or(UNKNOWN_REMOTE_CODE),
            message: message.unwrap_or_else(|| UNKNOWN_REMOTE_MESSAGE.to_string()),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            InvocationError::UnknownOperation(_) => ErrorCategory::UnknownOperation,
            InvocationError::Validation(_) => ErrorCategory::Validation,
            InvocationError::Remote { .. } => ErrorCategory::RemoteApplication,
            InvocationError::Network(_) => ErrorCategory::Network,
            InvocationError::InvalidResponse(_) => ErrorCategory::InvalidResponse,
        }
    }

    /// Numeric code: the vault's `errorCode` for remote failures, JSON-RPC style codes
    /// for local ones, `-1` otherwise.
    pub fn code(&self) -> i64 {
        match self {
            InvocationError::Remote { code, .. } => *code,
            InvocationError::Validation(_) => VALIDATION_CODE,
            InvocationError::UnknownOperation(_) => UNKNOWN_OPERATION_CODE,
            InvocationError::Network(_) | InvocationError::InvalidResponse(_) => {
                UNKNOWN_REMOTE_CODE
            }
        }
    }

    /// Message without the code prefix
    pub fn message(&self) -> String {
        match self {
            InvocationError::Remote { message, .. } => message.clone(),
            InvocationError::UnknownOperation(name) => format!("Unknown operation: {}", name),
            InvocationError::Validation(msg)
            | InvocationError::Network(msg)
            | InvocationError::InvalidResponse(msg) => msg.clone(),
        }
    }

    /// Structured `{code, message, category}` form; `code` is a string on the wire
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "code": self.code().to_string(),
            "message": self.message(),
            "category": self.category(),
        })
    }
}
