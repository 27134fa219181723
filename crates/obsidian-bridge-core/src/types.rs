use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

use crate::error::InvocationError;

/// Identity of every operation the bridge can perform against the vault service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    ListFilesInVault,
    ListFilesInDir,
    GetFileContents,
    BatchGetFileContents,
    Search,
    ComplexSearch,
    AppendContent,
    PatchContent,
    PutContent,
    DeleteFile,
    PeriodicNotes,
    RecentPeriodicNotes,
    RecentChanges,
}

impl OperationKind {
    pub const ALL: [OperationKind; 13] = [
        OperationKind::ListFilesInVault,
        OperationKind::ListFilesInDir,
        OperationKind::GetFileContents,
        OperationKind::BatchGetFileContents,
        OperationKind::Search,
        OperationKind::ComplexSearch,
        OperationKind::AppendContent,
        OperationKind::PatchContent,
        OperationKind::PutContent,
        OperationKind::DeleteFile,
        OperationKind::PeriodicNotes,
        OperationKind::RecentPeriodicNotes,
        OperationKind::RecentChanges,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::ListFilesInVault => "list_files_in_vault",
            OperationKind::ListFilesInDir => "list_files_in_dir",
            OperationKind::GetFileContents => "get_file_contents",
            OperationKind::BatchGetFileContents => "batch_get_file_contents",
            OperationKind::Search => "search",
            OperationKind::ComplexSearch => "complex_search",
            OperationKind::AppendContent => "append_content",
            OperationKind::PatchContent => "patch_content",
            OperationKind::PutContent => "put_content",
            OperationKind::DeleteFile => "delete_file",
            OperationKind::PeriodicNotes => "periodic_notes",
            OperationKind::RecentPeriodicNotes => "recent_periodic_notes",
            OperationKind::RecentChanges => "recent_changes",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = InvocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperationKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| InvocationError::UnknownOperation(s.to_string()))
    }
}

/// Success payload of an invocation
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Raw note text or an aggregated text document
    Text(String),
    /// Structured JSON returned by the vault service
    Json(JsonValue),
    /// Write operations that return nothing meaningful
    Empty,
}

impl Payload {
    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }

    /// Text rendering used by transports that only carry strings
    pub fn to_text(&self) -> String {
        match self {
            Payload::Text(text) => text.clone(),
            Payload::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            Payload::Empty => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_names_round_trip() {
        for kind in OperationKind::ALL {
            assert_eq!(kind.as_str().parse::<OperationKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_operation() {
        let err = "greet".parse::<OperationKind>().unwrap_err();
        assert_eq!(err, InvocationError::UnknownOperation("greet".into()));
    }

    #[test]
    fn test_payload_text_rendering() {
        assert_eq!(Payload::Text("# note".into()).to_text(), "# note");
        assert_eq!(Payload::Empty.to_text(), "");
        let rendered = Payload::Json(serde_json::json!(["a.md"])).to_text();
        assert!(rendered.contains("\"a.md\""));
    }
}
