//! Response normalization

use obsidian_bridge_core::InvocationError;
use reqwest::StatusCode;
use serde_json::Value as JsonValue;

/// Status and fully-read body of a vault service response
#[derive(Debug, Clone)]
pub struct VaultResponse {
    pub status: StatusCode,
    pub body: String,
}

impl VaultResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Pass 2xx through; turn anything else into a remote application error
    pub fn error_for_status(self) -> Result<Self, InvocationError> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(remote_error(self.status, &self.body))
        }
    }

    pub fn has_body(&self) -> bool {
        !self.body.trim().is_empty()
    }

    /// Parse the body as JSON; an empty body yields `None`
    pub fn json(&self) -> Result<Option<JsonValue>, InvocationError> {
        if !self.has_body() {
            return Ok(None);
        }
        serde_json::from_str(&self.body).map(Some).map_err(|e| {
            InvocationError::InvalidResponse(format!(
                "expected JSON body (status {}): {}",
                self.status.as_u16(),
                e
            ))
        })
    }

    pub fn into_text(self) -> String {
        self.body
    }
}

/// Extract `errorCode`/`message` from an error body, defaulting to `-1`/`<unknown>`
pub fn remote_error(status: StatusCode, body: &str) -> InvocationError {
    let parsed = if body.trim().is_empty() {
        None
    } else {
        serde_json::from_str::<JsonValue>(body).ok()
    };

    let code = parsed
        .as_ref()
        .and_then(|v| v.get("errorCode"))
        .and_then(JsonValue::as_i64);
    let message = parsed
        .as_ref()
        .and_then(|v| v.get("message"))
        .and_then(JsonValue::as_str)
        .map(str::to_string);

    InvocationError::remote(status.as_u16(), code, message)
}

/// Pull the `files` array out of a directory listing
pub fn extract_files(listing: Option<JsonValue>) -> JsonValue {
    listing
        .and_then(|mut v| v.get_mut("files").map(JsonValue::take))
        .filter(JsonValue::is_array)
        .unwrap_or_else(|| JsonValue::Array(Vec::new()))
}
