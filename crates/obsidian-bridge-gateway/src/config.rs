//! Connection configuration for the vault service
//!
//! Built once at startup and shared read-only by every invocation.

use reqwest::header::HeaderValue;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{GatewayError, GatewayResult};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 27124;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 3_000;
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 6_000;

pub const ENV_API_KEY: &str = "OBSIDIAN_API_KEY";
pub const ENV_PROTOCOL: &str = "OBSIDIAN_PROTOCOL";
pub const ENV_HOST: &str = "OBSIDIAN_HOST";
pub const ENV_PORT: &str = "OBSIDIAN_PORT";
pub const ENV_VERIFY_SSL: &str = "OBSIDIAN_VERIFY_SSL";
pub const ENV_CONNECT_TIMEOUT_MS: &str = "OBSIDIAN_CONNECT_TIMEOUT_MS";
pub const ENV_READ_TIMEOUT_MS: &str = "OBSIDIAN_READ_TIMEOUT_MS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    Http,
    #[default]
    Https,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

/// Anything other than `http` selects https
impl FromStr for Protocol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("http") {
            Ok(Protocol::Http)
        } else {
            Ok(Protocol::Https)
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connect and read timeouts in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    pub connect_ms: u64,
    pub read_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            read_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

impl TimeoutConfig {
    pub fn connect(&self) -> Duration {
        Duration::from_millis(self.connect_ms)
    }

    pub fn read(&self) -> Duration {
        Duration::from_millis(self.read_ms)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub protocol: Protocol,
    pub host: String,
    pub port: u16,
    pub api_key: String,
    pub verify_ssl: bool,
    pub timeouts: TimeoutConfig,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("protocol", &self.protocol)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "***" })
            .field("verify_ssl", &self.verify_ssl)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            protocol: Protocol::Https,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            api_key: String::new(),
            verify_ssl: false,
            timeouts: TimeoutConfig::default(),
        }
    }
}

impl ConnectionConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Read configuration from `OBSIDIAN_*` environment variables, falling back to defaults
    pub fn from_env() -> GatewayResult<Self> {
        let mut config = Self::new(std::env::var(ENV_API_KEY).unwrap_or_default());

        if let Ok(protocol) = std::env::var(ENV_PROTOCOL) {
            config = config.with_protocol(protocol.parse().unwrap_or_default());
        }
        if let Ok(host) = std::env::var(ENV_HOST) {
            config = config.with_host(host);
        }
        if let Ok(port) = std::env::var(ENV_PORT) {
            let port = port.trim().parse::<u16>().map_err(|_| {
                GatewayError::InvalidConfig(format!("{} must be a port number, got '{}'", ENV_PORT, port))
            })?;
            config = config.with_port(port);
        }
        if let Ok(verify) = std::env::var(ENV_VERIFY_SSL) {
            config = config.with_verify_ssl(parse_flag(&verify));
        }
        if let Ok(ms) = std::env::var(ENV_CONNECT_TIMEOUT_MS) {
            config.timeouts.connect_ms = parse_millis(ENV_CONNECT_TIMEOUT_MS, &ms)?;
        }
        if let Ok(ms) = std::env::var(ENV_READ_TIMEOUT_MS) {
            config.timeouts.read_ms = parse_millis(ENV_READ_TIMEOUT_MS, &ms)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Set the host, stripping an accidental scheme prefix and trailing slashes
    pub fn with_host(mut self, host: impl AsRef<str>) -> Self {
        self.host = normalize_host(host.as_ref());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_verify_ssl(mut self, verify_ssl: bool) -> Self {
        self.verify_ssl = verify_ssl;
        self
    }

    pub fn with_timeouts(mut self, connect_ms: u64, read_ms: u64) -> Self {
        self.timeouts = TimeoutConfig {
            connect_ms,
            read_ms,
        };
        self
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }

    pub fn validate(&self) -> GatewayResult<()> {
        if self.host.is_empty() {
            return Err(GatewayError::InvalidConfig("Host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(GatewayError::InvalidConfig("Port must be greater than 0".to_string()));
        }
        if self.timeouts.connect_ms == 0 {
            return Err(GatewayError::InvalidConfig(
                "Connect timeout must be greater than 0".to_string(),
            ));
        }
        if self.timeouts.read_ms == 0 {
            return Err(GatewayError::InvalidConfig(
                "Read timeout must be greater than 0".to_string(),
            ));
        }
        if HeaderValue::from_str(&format!("Bearer {}", self.api_key)).is_err() {
            return Err(GatewayError::InvalidConfig(
                "API key contains characters not allowed in an HTTP header".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let host = host
        .strip_prefix("http://")
        .or_else(|| host.strip_prefix("https://"))
        .unwrap_or(host);
    host.trim_end_matches('/').to_string()
}

pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_millis(var: &str, value: &str) -> GatewayResult<u64> {
    value.trim().parse::<u64>().map_err(|_| {
        GatewayError::InvalidConfig(format!("{} must be milliseconds, got '{}'", var, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_parsing() {
        assert_eq!("http".parse::<Protocol>().unwrap(), Protocol::Http);
        assert_eq!("HTTP".parse::<Protocol>().unwrap(), Protocol::Http);
        assert_eq!("https".parse::<Protocol>().unwrap(), Protocol::Https);
        assert_eq!("ftp".parse::<Protocol>().unwrap(), Protocol::Https);
    }

    #[test]
    fn test_host_normalization() {
        assert_eq!(normalize_host("http://localhost"), "localhost");
        assert_eq!(normalize_host("https://vault.local/"), "vault.local");
        assert_eq!(normalize_host("127.0.0.1"), "127.0.0.1");
    }

    #[test]
    fn test_base_url() {
        let config = ConnectionConfig::new("key")
            .with_protocol(Protocol::Http)
            .with_host("https://127.0.0.1")
            .with_port(27123);
        assert_eq!(config.base_url(), "http://127.0.0.1:27123");

        assert_eq!(
            ConnectionConfig::default().base_url(),
            "https://127.0.0.1:27124"
        );
    }

    #[test]
    fn test_defaults() {
        let config = ConnectionConfig::default();
        assert!(!config.verify_ssl);
        assert!(!config.has_api_key());
        assert_eq!(config.timeouts.connect(), Duration::from_secs(3));
        assert_eq!(config.timeouts.read(), Duration::from_secs(6));
    }

    #[test]
    fn test_validation() {
        assert!(ConnectionConfig::new("key").validate().is_ok());
        assert!(ConnectionConfig::new("key").with_port(0).validate().is_err());
        assert!(ConnectionConfig::new("key").with_host("").validate().is_err());
        assert!(ConnectionConfig::new("key\nbad").validate().is_err());
        assert!(ConnectionConfig::new("key")
            .with_timeouts(0, 10)
            .validate()
            .is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let rendered = format!("{:?}", ConnectionConfig::new("secret-token"));
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("***"));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }

    // The only test in this crate that touches the process environment
    #[test]
    fn test_from_env() {
        std::env::set_var(ENV_API_KEY, "env-key");
        std::env::set_var(ENV_PROTOCOL, "http");
        std::env::set_var(ENV_HOST, "http://vault.local/");
        std::env::set_var(ENV_PORT, "27123");
        std::env::set_var(ENV_VERIFY_SSL, "true");
        std::env::set_var(ENV_READ_TIMEOUT_MS, "9000");

        let config = ConnectionConfig::from_env().unwrap();
        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.base_url(), "http://vault.local:27123");
        assert!(config.verify_ssl);
        assert_eq!(config.timeouts.read_ms, 9000);
        assert_eq!(config.timeouts.connect_ms, DEFAULT_CONNECT_TIMEOUT_MS);

        std::env::set_var(ENV_READ_TIMEOUT_MS, "soon");
        assert!(ConnectionConfig::from_env().is_err());

        for var in [
            ENV_API_KEY,
            ENV_PROTOCOL,
            ENV_HOST,
            ENV_PORT,
            ENV_VERIFY_SSL,
            ENV_READ_TIMEOUT_MS,
        ] {
            std::env::remove_var(var);
        }
    }
}
