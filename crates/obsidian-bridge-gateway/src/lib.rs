//! HTTP gateway to the Obsidian Local REST API.
//!
//! [`VaultGateway`] turns a named operation plus JSON arguments into authenticated
//! requests against the vault service and hands back a normalized [`Payload`] or a
//! categorized [`InvocationError`].
//!
//! [`Payload`]: obsidian_bridge_core::Payload
//! [`InvocationError`]: obsidian_bridge_core::InvocationError

pub mod config;
pub mod error;
pub mod gateway;
pub mod headers;
pub mod queries;
pub mod response;
pub mod timeout;
pub mod url_builder;

pub use config::{ConnectionConfig, Protocol, TimeoutConfig};
pub use error::{GatewayError, GatewayResult};
pub use gateway::VaultGateway;
pub use headers::{NoteView, PatchOperation, PatchTarget, TargetType};
