//! Core types for obsidian-bridge
//!
//! Holds the fixed operation catalogue exposed to MCP clients, the tagged parameter
//! values produced by catalogue validation, and the normalized invocation result.

pub mod catalog;
pub mod error;
pub mod params;
pub mod types;

// Re-export commonly used types
pub use catalog::{DefaultValue, OperationCatalogue, OperationSpec, ParamSpec, ParamType, Presence};
pub use error::{ErrorCategory, InvocationError, InvocationResult};
pub use params::{ParamValue, Params};
pub use types::{OperationKind, Payload};
