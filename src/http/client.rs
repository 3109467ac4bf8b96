//! HTTP client with rate limiting and error classification
//!
//! Every call makes a single attempt:
//! - failures before a response exists become transport errors
//! - non-success statuses become [`Error::HttpStatus`]
//! - the body is returned raw so callers can validate its shape; a body that
//!   breaks off mid-read is a payload failure

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::error::{Error, Result};
use reqwest::{Client, Response};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            rate_limit: None,
            default_headers: HashMap::new(),
            user_agent: format!("shelfscroll/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Configuration for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters, sent in insertion order
    pub query: Vec<(String, String)>,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// HTTP client making one classified attempt per call
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Make a GET request with config
    ///
    /// Returns the response only for a success status.
    pub async fn get_with_config(&self, url: &str, config: RequestConfig) -> Result<Response> {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }

        let mut req = self.client.get(url);

        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }

        if !config.query.is_empty() {
            req = req.query(&config.query);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    timeout_ms: self.config.timeout.as_millis() as u64,
                }
            } else {
                Error::transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body));
        }

        debug!("Request succeeded: GET {} ({})", url, status.as_u16());
        Ok(response)
    }

    /// Make a GET request and return the raw body
    ///
    /// A response was obtained, so a body that cannot be read to the end is a
    /// payload failure and is not retried.
    pub async fn get_bytes_with_config(&self, url: &str, config: RequestConfig) -> Result<Vec<u8>> {
        let response = self.get_with_config(url, config).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::parse(format!("Failed to read response body: {e}")))?;
        Ok(bytes.to_vec())
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}
