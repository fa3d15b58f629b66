//! HTTP client used by poll mode.

use std::time::Duration;

use reqwest_middleware::ClientBuilder;
use reqwest_retry::RetryTransientMiddleware;

use super::BackoffPolicy;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Bound on a single request, connection included.
    pub timeout: Duration,
    /// Retries for transient failures. Zero means one attempt per check.
    pub max_retries: u32,
    /// User agent string.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 0,
            user_agent: format!("webhook-watchdog/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP client with retry middleware.
pub type PollingClient = reqwest_middleware::ClientWithMiddleware;

/// Builder for the poll-mode HTTP client.
pub struct PollingClientBuilder {
    config: HttpClientConfig,
}

impl PollingClientBuilder {
    pub fn from_config(config: HttpClientConfig) -> Self {
        Self { config }
    }

    /// Build the configured HTTP client.
    pub fn build(self) -> Result<PollingClient, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .user_agent(self.config.user_agent)
            .build()?;

        let retry_policy = BackoffPolicy::new(self.config.max_retries);
        Ok(ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = HttpClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 0);
        assert!(config.user_agent.starts_with("webhook-watchdog/"));
    }

    #[tokio::test]
    async fn test_build_client() {
        assert!(PollingClientBuilder::from_config(HttpClientConfig::default())
            .build()
            .is_ok());
    }

    #[tokio::test]
    async fn test_build_client_with_retries() {
        let config = HttpClientConfig {
            timeout: Duration::from_secs(5),
            max_retries: 2,
            user_agent: "send-test/1.0".to_string(),
        };
        assert!(PollingClientBuilder::from_config(config).build().is_ok());
    }
}
