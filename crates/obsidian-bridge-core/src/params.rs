//! Validated parameter values
//!
//! The catalogue turns an untyped JSON argument map into a [`Params`] bag of tagged
//! values. Every declared parameter is present afterwards (either supplied or filled
//! from its default), so the typed getters only fail when an operation asks for a
//! name or type its own schema does not declare.

use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;

use crate::error::InvocationError;

/// A single parameter value after type checking
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    StringList(Vec<String>),
    Object(Map<String, JsonValue>),
}

impl ParamValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::String(_) => "string",
            ParamValue::Integer(_) => "integer",
            ParamValue::Boolean(_) => "boolean",
            ParamValue::StringList(_) => "array",
            ParamValue::Object(_) => "object",
        }
    }
}

/// Parameters bound for one invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: HashMap<&'static str, ParamValue>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &'static str, value: ParamValue) {
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn str(&self, name: &str) -> Result<&str, InvocationError> {
        match self.lookup(name)? {
            ParamValue::String(s) => Ok(s),
            other => Err(mismatch(name, "string", other)),
        }
    }

    pub fn int(&self, name: &str) -> Result<i64, InvocationError> {
        match self.lookup(name)? {
            ParamValue::Integer(n) => Ok(*n),
            other => Err(mismatch(name, "integer", other)),
        }
    }

    pub fn bool(&self, name: &str) -> Result<bool, InvocationError> {
        match self.lookup(name)? {
            ParamValue::Boolean(b) => Ok(*b),
            other => Err(mismatch(name, "boolean", other)),
        }
    }

    pub fn list(&self, name: &str) -> Result<&[String], InvocationError> {
        match self.lookup(name)? {
            ParamValue::StringList(items) => Ok(items),
            other => Err(mismatch(name, "array", other)),
        }
    }

    pub fn object(&self, name: &str) -> Result<&Map<String, JsonValue>, InvocationError> {
        match self.lookup(name)? {
            ParamValue::Object(map) => Ok(map),
            other => Err(mismatch(name, "object", other)),
        }
    }

    fn lookup(&self, name: &str) -> Result<&ParamValue, InvocationError> {
        self.values
            .get(name)
            .ok_or_else(|| InvocationError::validation(format!("Missing parameter '{}'", name)))
    }
}

fn mismatch(name: &str, expected: &str, found: &ParamValue) -> InvocationError {
    InvocationError::validation(format!(
        "Parameter '{}' must be {}, got {}",
        name,
        expected,
        found.type_name()
    ))
}
