//! Operation catalogue
//!
//! A static, declarative table of every operation the bridge exposes. Each entry
//! lists its parameters with type, required/default split and optional value
//! constraints. One generic validator checks an incoming argument map against the
//! table before the gateway builds any HTTP request.

use serde_json::{json, Map, Value as JsonValue};
use std::fmt;

use crate::error::InvocationError;
use crate::params::{ParamValue, Params};
use crate::types::OperationKind;

/// Declared type of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
    Boolean,
    StringList,
    Object,
}

impl ParamType {
    pub fn json_type(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Boolean => "boolean",
            ParamType::StringList => "array",
            ParamType::Object => "object",
        }
    }
}

/// Default applied when an optional parameter is omitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Str(&'static str),
    Int(i64),
    Bool(bool),
}

impl DefaultValue {
    pub fn to_param_value(self) -> ParamValue {
        match self {
            DefaultValue::Str(s) => ParamValue::String(s.to_string()),
            DefaultValue::Int(n) => ParamValue::Integer(n),
            DefaultValue::Bool(b) => ParamValue::Boolean(b),
        }
    }

    fn to_json(self) -> JsonValue {
        match self {
            DefaultValue::Str(s) => json!(s),
            DefaultValue::Int(n) => json!(n),
            DefaultValue::Bool(b) => json!(b),
        }
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Str(s) => f.write_str(s),
            DefaultValue::Int(n) => write!(f, "{}", n),
            DefaultValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Required parameters carry no default; optional ones always do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Default(DefaultValue),
}

#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub ty: ParamType,
    pub presence: Presence,
    pub description: &'static str,
    /// Closed set of accepted string values; empty means unrestricted
    pub allowed: &'static [&'static str],
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl ParamSpec {
    pub const fn required(name: &'static str, ty: ParamType, description: &'static str) -> Self {
        Self {
            name,
            ty,
            presence: Presence::Required,
            description,
            allowed: &[],
            min: None,
            max: None,
        }
    }

    pub const fn optional(
        name: &'static str,
        ty: ParamType,
        default: DefaultValue,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            ty,
            presence: Presence::Default(default),
            description,
            allowed: &[],
            min: None,
            max: None,
        }
    }

    pub const fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = allowed;
        self
    }

    pub const fn range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn is_required(&self) -> bool {
        matches!(self.presence, Presence::Required)
    }

    fn schema(&self) -> JsonValue {
        let mut schema = Map::new();
        schema.insert("type".into(), json!(self.ty.json_type()));
        schema.insert("description".into(), json!(self.description));
        if self.ty == ParamType::StringList {
            schema.insert("items".into(), json!({"type": "string"}));
        }
        if !self.allowed.is_empty() {
            schema.insert("enum".into(), json!(self.allowed));
        }
        if let Some(min) = self.min {
            schema.insert("minimum".into(), json!(min));
        }
        if let Some(max) = self.max {
            schema.insert("maximum".into(), json!(max));
        }
        if let Presence::Default(default) = self.presence {
            schema.insert("default".into(), default.to_json());
        }
        JsonValue::Object(schema)
    }

    /// Check a supplied JSON value against this parameter's type and constraints
    fn bind(&self, value: &JsonValue) -> Result<ParamValue, InvocationError> {
        let bound = match (self.ty, value) {
            (ParamType::String, JsonValue::String(s)) => ParamValue::String(s.clone()),
            (ParamType::Integer, JsonValue::Number(n)) => match n.as_i64() {
                Some(i) => ParamValue::Integer(i),
                // Integral floats such as 5.0 are accepted
                None => match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                        ParamValue::Integer(f as i64)
                    }
                    _ => return Err(self.type_error(value)),
                },
            },
            (ParamType::Boolean, JsonValue::Bool(b)) => ParamValue::Boolean(*b),
            (ParamType::StringList, JsonValue::Array(items)) => {
                let mut list = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        JsonValue::String(s) => list.push(s.clone()),
                        _ => {
                            return Err(InvocationError::validation(format!(
                                "Parameter '{}' must be an array of strings",
                                self.name
                            )))
                        }
                    }
                }
                ParamValue::StringList(list)
            }
            (ParamType::Object, JsonValue::Object(map)) => ParamValue::Object(map.clone()),
            _ => return Err(self.type_error(value)),
        };

        self.check_constraints(&bound)?;
        Ok(bound)
    }

    fn check_constraints(&self, value: &ParamValue) -> Result<(), InvocationError> {
        match value {
            ParamValue::String(s) if !self.allowed.is_empty() => {
                if !self.allowed.contains(&s.as_str()) {
                    return Err(InvocationError::validation(format!(
                        "Parameter '{}' must be one of {:?}, got '{}'",
                        self.name, self.allowed, s
                    )));
                }
            }
            ParamValue::Integer(n) => {
                if let Some(min) = self.min {
                    if *n < min {
                        return Err(InvocationError::validation(format!(
                            "Parameter '{}' must be >= {}, got {}",
                            self.name, min, n
                        )));
                    }
                }
                if let Some(max) = self.max {
                    if *n > max {
                        return Err(InvocationError::validation(format!(
                            "Parameter '{}' must be <= {}, got {}",
                            self.name, max, n
                        )));
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn type_error(&self, value: &JsonValue) -> InvocationError {
        InvocationError::validation(format!(
            "Parameter '{}' must be {}, got {}",
            self.name,
            self.ty.json_type(),
            json_kind(value)
        ))
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(n) if n.is_i64() || n.is_u64() => "integer",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// One catalogue entry
#[derive(Debug, Clone, Copy)]
pub struct OperationSpec {
    pub kind: OperationKind,
    pub title: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
    pub read_only: bool,
    pub destructive: bool,
}

impl OperationSpec {
    pub fn name(&self) -> &'static str {
        self.kind.as_str()
    }

    pub fn required_params(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params.iter().filter(|p| p.is_required())
    }

    /// JSON Schema for the operation's argument object
    pub fn input_schema(&self) -> JsonValue {
        let properties: Map<String, JsonValue> = self
            .params
            .iter()
            .map(|p| (p.name.to_string(), p.schema()))
            .collect();
        let required: Vec<&str> = self.required_params().map(|p| p.name).collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Validate an argument map and bind it into typed parameters.
    ///
    /// `null` and absent values are treated alike. Parameters the operation does not
    /// declare are ignored.
    pub fn validate(&self, args: &JsonValue) -> Result<Params, InvocationError> {
        let empty = Map::new();
        let args = match args {
            JsonValue::Object(map) => map,
            JsonValue::Null => &empty,
            other => {
                return Err(InvocationError::validation(format!(
                    "Arguments for '{}' must be an object, got {}",
                    self.name(),
                    json_kind(other)
                )))
            }
        };

        let mut params = Params::new();
        for spec in self.params {
            match args.get(spec.name).filter(|v| !v.is_null()) {
                Some(value) => params.insert(spec.name, spec.bind(value)?),
                None => match spec.presence {
                    Presence::Required => {
                        return Err(InvocationError::validation(format!(
                            "Missing required parameter '{}' for '{}'",
                            spec.name,
                            self.name()
                        )))
                    }
                    Presence::Default(default) => {
                        params.insert(spec.name, default.to_param_value())
                    }
                },
            }
        }
        Ok(params)
    }
}

const PERIODS: &[&str] = &["daily", "weekly", "monthly", "quarterly", "yearly"];
const NOTE_VIEWS: &[&str] = &["content", "metadata"];
const PATCH_OPERATIONS: &[&str] = &["append", "prepend", "replace"];
const PATCH_TARGET_TYPES: &[&str] = &["heading", "block", "frontmatter"];

const FILEPATH: ParamSpec = ParamSpec::required(
    "filepath",
    ParamType::String,
    "Path to the file, relative to the vault root",
);

static OPERATIONS: &[OperationSpec] = &[
    OperationSpec {
        kind: OperationKind::ListFilesInVault,
        title: "List vault files",
        description: "Lists all files and directories in the root directory of the vault.",
        params: &[],
        read_only: true,
        destructive: false,
    },
    OperationSpec {
        kind: OperationKind::ListFilesInDir,
        title: "List directory files",
        description: "Lists all files and directories in a specific vault directory.",
        params: &[ParamSpec::required(
            "dirpath",
            ParamType::String,
            "Path to list files from, relative to the vault root. Empty directories are not returned.",
        )],
        read_only: true,
        destructive: false,
    },
    OperationSpec {
        kind: OperationKind::GetFileContents,
        title: "Get file contents",
        description: "Returns the content of a single file in the vault.",
        params: &[FILEPATH],
        read_only: true,
        destructive: false,
    },
    OperationSpec {
        kind: OperationKind::BatchGetFileContents,
        title: "Get multiple file contents",
        description: "Returns the contents of multiple files concatenated, each section headed by its path. Files that cannot be read are reported inline.",
        params: &[ParamSpec::required(
            "filepaths",
            ParamType::StringList,
            "List of file paths to read, relative to the vault root",
        )],
        read_only: true,
        destructive: false,
    },
    OperationSpec {
        kind: OperationKind::Search,
        title: "Simple search",
        description: "Simple full-text search for documents matching a text query across the vault.",
        params: &[
            ParamSpec::required("query", ParamType::String, "Text to search for in the vault"),
            ParamSpec::optional(
                "context_length",
                ParamType::Integer,
                DefaultValue::Int(100),
                "How much context to return around each match",
            )
            .range(Some(0), None),
        ],
        read_only: true,
        destructive: false,
    },
    OperationSpec {
        kind: OperationKind::ComplexSearch,
        title: "Complex search",
        description: "Complex search using a JsonLogic query, e.g. {\"glob\": [\"*.md\", {\"var\": \"path\"}]}.",
        params: &[ParamSpec::required(
            "query",
            ParamType::Object,
            "JsonLogic query object",
        )],
        read_only: true,
        destructive: false,
    },
    OperationSpec {
        kind: OperationKind::AppendContent,
        title: "Append content",
        description: "Append content to a new or existing file in the vault.",
        params: &[
            FILEPATH,
            ParamSpec::required("content", ParamType::String, "Content to append"),
        ],
        read_only: false,
        destructive: false,
    },
    OperationSpec {
        kind: OperationKind::PatchContent,
        title: "Patch content",
        description: "Insert content relative to a heading, block reference, or frontmatter field in an existing note.",
        params: &[
            FILEPATH,
            ParamSpec::required("operation", ParamType::String, "Operation to perform")
                .one_of(PATCH_OPERATIONS),
            ParamSpec::required("target_type", ParamType::String, "Type of target to patch")
                .one_of(PATCH_TARGET_TYPES),
            ParamSpec::required(
                "target",
                ParamType::String,
                "Target identifier: heading path, block reference, or frontmatter field",
            ),
            ParamSpec::required("content", ParamType::String, "Content to insert"),
        ],
        read_only: false,
        destructive: true,
    },
    OperationSpec {
        kind: OperationKind::PutContent,
        title: "Put content",
        description: "Create a new file or overwrite an existing file in the vault.",
        params: &[
            FILEPATH,
            ParamSpec::required("content", ParamType::String, "Full content of the file"),
        ],
        read_only: false,
        destructive: true,
    },
    OperationSpec {
        kind: OperationKind::DeleteFile,
        title: "Delete file",
        description: "Delete a file or directory from the vault.",
        params: &[FILEPATH],
        read_only: false,
        destructive: true,
    },
    OperationSpec {
        kind: OperationKind::PeriodicNotes,
        title: "Get periodic note",
        description: "Get the current periodic note for the specified period.",
        params: &[
            ParamSpec::required("period", ParamType::String, "The period type")
                .one_of(PERIODS),
            ParamSpec::optional(
                "type",
                ParamType::String,
                DefaultValue::Str("content"),
                "Return the note content or its metadata",
            )
            .one_of(NOTE_VIEWS),
        ],
        read_only: true,
        destructive: false,
    },
    OperationSpec {
        kind: OperationKind::RecentPeriodicNotes,
        title: "Recent periodic notes",
        description: "Get the most recent periodic notes for the specified period type.",
        params: &[
            ParamSpec::required("period", ParamType::String, "The period type")
                .one_of(PERIODS),
            ParamSpec::optional(
                "limit",
                ParamType::Integer,
                DefaultValue::Int(5),
                "Maximum number of notes to return",
            )
            .range(Some(1), Some(50)),
            ParamSpec::optional(
                "include_content",
                ParamType::Boolean,
                DefaultValue::Bool(false),
                "Whether to include note content",
            ),
        ],
        read_only: true,
        destructive: false,
    },
    OperationSpec {
        kind: OperationKind::RecentChanges,
        title: "Recent changes",
        description: "Get recently modified files in the vault, most recent first.",
        params: &[
            ParamSpec::optional(
                "limit",
                ParamType::Integer,
                DefaultValue::Int(10),
                "Maximum number of files to return",
            )
            .range(Some(1), Some(100)),
            ParamSpec::optional(
                "days",
                ParamType::Integer,
                DefaultValue::Int(90),
                "Only include files modified within this many days",
            )
            .range(Some(1), None),
        ],
        read_only: true,
        destructive: false,
    },
];

/// The fixed operation surface of the bridge
#[derive(Debug, Clone, Copy)]
pub struct OperationCatalogue {
    operations: &'static [OperationSpec],
}

impl Default for OperationCatalogue {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationCatalogue {
    pub fn new() -> Self {
        Self {
            operations: OPERATIONS,
        }
    }

    pub fn operations(&self) -> &'static [OperationSpec] {
        self.operations
    }

    pub fn get(&self, kind: OperationKind) -> Option<&'static OperationSpec> {
        self.operations.iter().find(|op| op.kind == kind)
    }

    pub fn lookup(&self, name: &str) -> Result<&'static OperationSpec, InvocationError> {
        let kind: OperationKind = name.parse()?;
        self.get(kind)
            .ok_or_else(|| InvocationError::UnknownOperation(name.to_string()))
    }

    /// Resolve an operation by name and validate its arguments
    pub fn validate(
        &self,
        name: &str,
        args: &JsonValue,
    ) -> Result<(OperationKind, Params), InvocationError> {
        let spec = self.lookup(name)?;
        let params = spec.validate(args)?;
        Ok((spec.kind, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalogue_covers_every_operation_once() {
        let catalogue = OperationCatalogue::new();
        let names: HashSet<&str> = catalogue.operations().iter().map(|op| op.name()).collect();
        assert_eq!(names.len(), catalogue.operations().len());
        assert_eq!(names.len(), OperationKind::ALL.len());
        for kind in OperationKind::ALL {
            assert!(catalogue.get(kind).is_some(), "missing {}", kind);
        }
    }

    #[test]
    fn test_defaults_satisfy_their_own_schema() {
        for op in OperationCatalogue::new().operations() {
            let mut seen = HashSet::new();
            for p in op.params {
                assert!(seen.insert(p.name), "duplicate param {}.{}", op.name(), p.name);
                if let Presence::Default(default) = p.presence {
                    let value = default.to_json();
                    assert!(p.bind(&value).is_ok(), "bad default for {}.{}", op.name(), p.name);
                }
            }
        }
    }

    #[test]
    fn test_missing_required_parameter() {
        let catalogue = OperationCatalogue::new();
        for op in catalogue.operations() {
            for required in op.required_params() {
                let mut args = Map::new();
                for p in op.required_params().filter(|p| p.name != required.name) {
                    let sample = match p.ty {
                        ParamType::String => json!(p.allowed.first().copied().unwrap_or("x")),
                        ParamType::Integer => json!(1),
                        ParamType::Boolean => json!(true),
                        ParamType::StringList => json!(["a.md"]),
                        ParamType::Object => json!({}),
                    };
                    args.insert(p.name.to_string(), sample);
                }
                let err = op.validate(&JsonValue::Object(args)).unwrap_err();
                assert!(
                    err.to_string().contains(required.name),
                    "{} without {} gave {}",
                    op.name(),
                    required.name,
                    err
                );
            }
        }
    }

    #[test]
    fn test_defaults_are_applied() {
        let catalogue = OperationCatalogue::new();
        let (kind, params) = catalogue
            .validate("recent_changes", &JsonValue::Null)
            .unwrap();
        assert_eq!(kind, OperationKind::RecentChanges);
        assert_eq!(params.int("limit").unwrap(), 10);
        assert_eq!(params.int("days").unwrap(), 90);

        let (_, params) = catalogue
            .validate("recent_periodic_notes", &json!({"period": "daily"}))
            .unwrap();
        assert_eq!(params.int("limit").unwrap(), 5);
        assert!(!params.bool("include_content").unwrap());

        let (_, params) = catalogue
            .validate("search", &json!({"query": "rust"}))
            .unwrap();
        assert_eq!(params.int("context_length").unwrap(), 100);

        let (_, params) = catalogue
            .validate("periodic_notes", &json!({"period": "weekly", "type": null}))
            .unwrap();
        assert_eq!(params.str("type").unwrap(), "content");
    }

    #[test]
    fn test_type_mismatch() {
        let catalogue = OperationCatalogue::new();

        let err = catalogue
            .validate("get_file_contents", &json!({"filepath": 3}))
            .unwrap_err();
        assert_eq!(
            err,
            InvocationError::Validation(
                "Parameter 'filepath' must be string, got integer".into()
            )
        );

        assert!(catalogue
            .validate("recent_changes", &json!({"limit": "5"}))
            .is_err());
        assert!(catalogue
            .validate("recent_periodic_notes", &json!({"period": "daily", "include_content": "yes"}))
            .is_err());
        assert!(catalogue
            .validate("batch_get_file_contents", &json!({"filepaths": ["a.md", 1]}))
            .is_err());
        assert!(catalogue
            .validate("complex_search", &json!({"query": "not an object"}))
            .is_err());
        assert!(catalogue
            .validate("list_files_in_vault", &json!(["positional"]))
            .is_err());
    }

    #[test]
    fn test_integral_float_accepted() {
        let (_, params) = OperationCatalogue::new()
            .validate("recent_changes", &json!({"limit": 5.0}))
            .unwrap();
        assert_eq!(params.int("limit").unwrap(), 5);
        assert!(OperationCatalogue::new()
            .validate("recent_changes", &json!({"limit": 5.5}))
            .is_err());
    }

    #[test]
    fn test_constraints() {
        let catalogue = OperationCatalogue::new();
        assert!(catalogue
            .validate("periodic_notes", &json!({"period": "hourly"}))
            .is_err());
        assert!(catalogue
            .validate("recent_changes", &json!({"limit": 0}))
            .is_err());
        assert!(catalogue
            .validate("recent_changes", &json!({"limit": 101}))
            .is_err());
        assert!(catalogue
            .validate("recent_periodic_notes", &json!({"period": "daily", "limit": 51}))
            .is_err());
        assert!(catalogue
            .validate(
                "patch_content",
                &json!({
                    "filepath": "a.md",
                    "operation": "insert",
                    "target_type": "heading",
                    "target": "Todo",
                    "content": "x"
                })
            )
            .is_err());
    }

    #[test]
    fn test_unknown_parameters_ignored() {
        let (_, params) = OperationCatalogue::new()
            .validate("delete_file", &json!({"filepath": "a.md", "force": true}))
            .unwrap();
        assert_eq!(params.len(), 1);
        assert!(params.get("force").is_none());
    }

    #[test]
    fn test_unknown_operation() {
        let err = OperationCatalogue::new()
            .validate("greet", &json!({}))
            .unwrap_err();
        assert_eq!(err, InvocationError::UnknownOperation("greet".into()));
    }

    #[test]
    fn test_input_schema() {
        let catalogue = OperationCatalogue::new();
        let schema = catalogue
            .get(OperationKind::RecentPeriodicNotes)
            .unwrap()
            .input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["period"]));
        assert_eq!(schema["properties"]["limit"]["default"], 5);
        assert_eq!(schema["properties"]["limit"]["maximum"], 50);
        assert_eq!(schema["properties"]["period"]["enum"][0], "daily");

        let schema = catalogue
            .get(OperationKind::BatchGetFileContents)
            .unwrap()
            .input_schema();
        assert_eq!(schema["properties"]["filepaths"]["items"]["type"], "string");

        let schema = catalogue
            .get(OperationKind::ListFilesInVault)
            .unwrap()
            .input_schema();
        assert_eq!(schema["required"], json!([]));
    }
}
