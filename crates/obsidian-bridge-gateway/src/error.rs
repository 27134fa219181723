use thiserror::Error;

/// Errors raised while building the gateway, before any invocation runs
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type GatewayResult<T> = Result<T, GatewayError>;
