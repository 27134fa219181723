//! Timeout handling for vault requests

use obsidian_bridge_core::InvocationError;
use reqwest::ClientBuilder;
use std::error::Error as StdError;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::TimeoutConfig;

/// Applies the connect timeout to the shared client and the read timeout per request
#[derive(Debug, Clone, Copy)]
pub struct TimeoutManager {
    config: TimeoutConfig,
}

impl TimeoutManager {
    pub fn new(config: TimeoutConfig) -> Self {
        Self { config }
    }

    /// Connection establishment is bounded on the client, which is shared across requests
    pub fn apply_to_client_builder(&self, builder: ClientBuilder) -> ClientBuilder {
        builder.connect_timeout(self.config.connect())
    }

    pub fn read_timeout(&self) -> Duration {
        self.config.read()
    }

    /// Run a request future (send plus body read) under the read timeout.
    ///
    /// Every failure becomes [`InvocationError::Network`].
    pub async fn execute_with_timeout<F, T>(&self, operation: F) -> Result<T, InvocationError>
    where
        F: Future<Output = Result<T, reqwest::Error>>,
    {
        let read_timeout = self.read_timeout();

        match timeout(read_timeout, operation).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(err)) => Err(classify(&err, read_timeout)),
            Err(_) => Err(InvocationError::network(format!(
                "Request timed out after {}ms (read timeout)",
                read_timeout.as_millis()
            ))),
        }
    }
}

fn classify(err: &reqwest::Error, read_timeout: Duration) -> InvocationError {
    if err.is_timeout() {
        InvocationError::network(format!(
            "Request timed out after {}ms: {}",
            read_timeout.as_millis(),
            error_chain(err)
        ))
    } else if err.is_connect() {
        InvocationError::network(format!("Connection failed: {}", error_chain(err)))
    } else {
        InvocationError::network(error_chain(err))
    }
}

/// Flatten an error and its sources into one line
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Outer(Inner);

    #[derive(Debug)]
    struct Inner;

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("error sending request")
        }
    }

    impl fmt::Display for Inner {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("connection refused")
        }
    }

    impl StdError for Outer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    impl StdError for Inner {}

    #[test]
    fn test_error_chain() {
        assert_eq!(
            error_chain(&Outer(Inner)),
            "error sending request: connection refused"
        );
    }

    #[tokio::test]
    async fn test_elapsed_read_timeout_is_network_error() {
        let manager = TimeoutManager::new(TimeoutConfig {
            connect_ms: 50,
            read_ms: 20,
        });
        let slow = async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok::<_, reqwest::Error>(())
        };
        let err = manager.execute_with_timeout(slow).await.unwrap_err();
        assert!(matches!(err, InvocationError::Network(_)));
        assert!(err.to_string().contains("20ms"));
    }

    #[test]
    fn test_fast_operation_passes_through() {
        let manager = TimeoutManager::new(TimeoutConfig::default());
        let value = tokio_test::block_on(
            manager.execute_with_timeout(async { Ok::<_, reqwest::Error>(7) }),
        )
        .unwrap();
        assert_eq!(value, 7);
    }
}
