//! Configuration for the Mi Notes HTTP client

use std::time::Duration;

use minote_config::RemoteConfig;

/// Retry behavior for transient failures
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts after the first try
    pub max_retries: u32,
    /// Initial backoff duration
    pub initial_backoff: Duration,
    /// Maximum backoff duration
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
        }
    }
}

/// Configuration for the Mi Notes client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Scheme and host, without trailing slash
    pub base_url: String,
    /// Session cookie sent with every request
    pub cookie: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Catalog page size
    pub page_limit: u32,
    /// Retry configuration
    pub retry: RetryPolicy,
    /// Maximum number of idle connections per host
    pub max_idle_per_host: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://i.mi.com".to_string(),
            cookie: None,
            timeout: Duration::from_secs(30),
            page_limit: 200,
            retry: RetryPolicy::default(),
            max_idle_per_host: 10,
        }
    }
}

impl ClientConfig {
    /// Create a new builder for client configuration
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

impl From<&RemoteConfig> for ClientConfig {
    fn from(remote: &RemoteConfig) -> Self {
        Self {
            base_url: remote.base_url(),
            cookie: remote.cookie.clone(),
            timeout: remote.timeout(),
            page_limit: remote.page_limit,
            retry: RetryPolicy {
                max_retries: remote.retry.max_retries,
                initial_backoff: remote.retry.initial_backoff(),
                max_backoff: remote.retry.max_backoff(),
            },
            ..Default::default()
        }
    }
}

/// Builder for ClientConfig
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    cookie: Option<String>,
    timeout: Option<Duration>,
    page_limit: Option<u32>,
    retry: Option<RetryPolicy>,
}

impl ClientConfigBuilder {
    /// Set the base URL (scheme and host)
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the session cookie
    pub fn cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the catalog page size
    pub fn page_limit(mut self, limit: u32) -> Self {
        self.page_limit = Some(limit);
        self
    }

    /// Set the retry configuration
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Build the client configuration
    pub fn build(self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            base_url: self
                .base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            cookie: self.cookie.or(defaults.cookie),
            timeout: self.timeout.unwrap_or(defaults.timeout),
            page_limit: self.page_limit.unwrap_or(defaults.page_limit),
            retry: self.retry.unwrap_or(defaults.retry),
            max_idle_per_host: defaults.max_idle_per_host,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_trims_trailing_slash() {
        let config = ClientConfig::builder()
            .base_url("http://127.0.0.1:9000/")
            .page_limit(5)
            .build();
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.page_limit, 5);
        assert_eq!(config.retry.max_retries, 3);
    }

    #[test]
    fn test_from_remote_config() {
        let mut remote = RemoteConfig::default();
        remote.cookie = Some("serviceToken=abc".to_string());
        remote.retry.max_retries = 1;

        let config = ClientConfig::from(&remote);
        assert_eq!(config.cookie.as_deref(), Some("serviceToken=abc"));
        assert_eq!(config.retry.max_retries, 1);
        assert_eq!(config.base_url, remote.base_url());
    }
}
