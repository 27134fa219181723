//! Per-operation header composition
//!
//! Each builder returns a complete header set: the shared bearer authorization plus
//! whatever the operation needs on top. Nothing is merged implicitly.

use obsidian_bridge_core::InvocationError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use std::str::FromStr;

use crate::error::{GatewayError, GatewayResult};

pub const MARKDOWN: &str = "text/markdown";
pub const JSONLOGIC: &str = "application/vnd.olrapi.jsonlogic+json";
pub const DATAVIEW_DQL: &str = "application/vnd.olrapi.dataview.dql+txt";
pub const NOTE_JSON: &str = "application/vnd.olrapi.note+json";

pub const OPERATION: HeaderName = HeaderName::from_static("operation");
pub const TARGET_TYPE: HeaderName = HeaderName::from_static("target-type");
pub const TARGET: HeaderName = HeaderName::from_static("target");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOperation {
    Append,
    Prepend,
    Replace,
}

impl PatchOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatchOperation::Append => "append",
            PatchOperation::Prepend => "prepend",
            PatchOperation::Replace => "replace",
        }
    }
}

impl FromStr for PatchOperation {
    type Err = InvocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "append" => Ok(PatchOperation::Append),
            "prepend" => Ok(PatchOperation::Prepend),
            "replace" => Ok(PatchOperation::Replace),
            other => Err(InvocationError::validation(format!(
                "Unsupported patch operation '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetType {
    Heading,
    Block,
    Frontmatter,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Heading => "heading",
            TargetType::Block => "block",
            TargetType::Frontmatter => "frontmatter",
        }
    }
}

impl FromStr for TargetType {
    type Err = InvocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "heading" => Ok(TargetType::Heading),
            "block" => Ok(TargetType::Block),
            "frontmatter" => Ok(TargetType::Frontmatter),
            other => Err(InvocationError::validation(format!(
                "Unsupported target type '{}'",
                other
            ))),
        }
    }
}

/// Where in a note a patch applies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchTarget {
    pub operation: PatchOperation,
    pub target_type: TargetType,
    pub target: String,
}

/// Which representation of a periodic note to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteView {
    #[default]
    Content,
    Metadata,
}

impl FromStr for NoteView {
    type Err = InvocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "content" => Ok(NoteView::Content),
            "metadata" => Ok(NoteView::Metadata),
            other => Err(InvocationError::validation(format!(
                "Unsupported note type '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HeaderBuilder {
    auth: HeaderValue,
}

impl HeaderBuilder {
    pub fn new(api_key: &str) -> GatewayResult<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|_| {
            GatewayError::InvalidConfig("API key is not a valid header value".to_string())
        })?;
        auth.set_sensitive(true);
        Ok(Self { auth })
    }

    /// Authorization only
    pub fn base(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, self.auth.clone());
        headers
    }

    /// Append, put: markdown body
    pub fn markdown_write(&self) -> HeaderMap {
        let mut headers = self.base();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(MARKDOWN));
        headers
    }

    /// Patch: markdown body plus the locator headers read by the vault service
    pub fn patch(&self, target: &PatchTarget) -> Result<HeaderMap, InvocationError> {
        let mut headers = self.markdown_write();
        headers.insert(OPERATION, HeaderValue::from_static(target.operation.as_str()));
        headers.insert(
            TARGET_TYPE,
            HeaderValue::from_static(target.target_type.as_str()),
        );
        let encoded = urlencoding::encode(&target.target);
        let value = HeaderValue::from_str(&encoded).map_err(|e| {
            InvocationError::validation(format!("Invalid patch target '{}': {}", target.target, e))
        })?;
        headers.insert(TARGET, value);
        Ok(headers)
    }

    pub fn jsonlogic(&self) -> HeaderMap {
        let mut headers = self.base();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSONLOGIC));
        headers
    }

    pub fn dataview(&self) -> HeaderMap {
        let mut headers = self.base();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(DATAVIEW_DQL));
        headers
    }

    pub fn periodic(&self, view: NoteView) -> HeaderMap {
        let mut headers = self.base();
        if view == NoteView::Metadata {
            headers.insert(ACCEPT, HeaderValue::from_static(NOTE_JSON));
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> HeaderBuilder {
        HeaderBuilder::new("test-key").unwrap()
    }

    #[test]
    fn test_base_carries_bearer_token() {
        let headers = builder().base();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[AUTHORIZATION], "Bearer test-key");
        assert!(headers[AUTHORIZATION].is_sensitive());
    }

    #[test]
    fn test_write_headers() {
        let headers = builder().markdown_write();
        assert_eq!(headers[CONTENT_TYPE], MARKDOWN);
        assert_eq!(headers[AUTHORIZATION], "Bearer test-key");
    }

    #[test]
    fn test_patch_headers() {
        let target = PatchTarget {
            operation: PatchOperation::Append,
            target_type: TargetType::Heading,
            target: "Projects::Next Steps".to_string(),
        };
        let headers = builder().patch(&target).unwrap();
        assert_eq!(headers["operation"], "append");
        assert_eq!(headers["target-type"], "heading");
        assert_eq!(headers["target"], "Projects%3A%3ANext%20Steps");
        assert_eq!(headers[CONTENT_TYPE], MARKDOWN);
        assert_eq!(headers.len(), 5);
    }

    #[test]
    fn test_query_content_types() {
        assert_eq!(builder().jsonlogic()[CONTENT_TYPE], JSONLOGIC);
        assert_eq!(builder().dataview()[CONTENT_TYPE], DATAVIEW_DQL);
    }

    #[test]
    fn test_periodic_accept() {
        assert!(builder().periodic(NoteView::Content).get(ACCEPT).is_none());
        assert_eq!(builder().periodic(NoteView::Metadata)[ACCEPT], NOTE_JSON);
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("prepend".parse::<PatchOperation>().unwrap(), PatchOperation::Prepend);
        assert_eq!("frontmatter".parse::<TargetType>().unwrap(), TargetType::Frontmatter);
        assert_eq!("metadata".parse::<NoteView>().unwrap(), NoteView::Metadata);
        assert!("insert".parse::<PatchOperation>().is_err());
    }
}
