//! Application configuration
//!
//! Loaded from YAML (or JSON, which YAML accepts). Every field has a default,
//! so an empty document is a valid configuration.

use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClient, HttpClientConfig, RateLimiterConfig};
use crate::retry::RetryPolicy;
use crate::search::{RetryingFetcher, SearchClient};
use crate::types::BackoffType;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default search endpoint
pub const DEFAULT_ENDPOINT: &str = "https://openlibrary.org/search.json";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Search endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Quiescence window before typed input becomes the active query
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Remaining scroll distance that counts as near the bottom
    #[serde(default = "default_scroll_threshold")]
    pub scroll_threshold_px: f64,

    /// Retry policy for transport failures
    #[serde(default)]
    pub retry: RetryConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_scroll_threshold() -> f64 {
    100.0
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            debounce_ms: default_debounce_ms(),
            scroll_threshold_px: default_scroll_threshold(),
            retry: RetryConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parse and validate a config document
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: Self = if contents.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(contents)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::from_yaml_str(&contents)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.endpoint)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::invalid_value(
                "endpoint",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(Error::invalid_value(
                "retry.max_attempts",
                "must be at least 1",
            ));
        }

        if self.http.timeout_seconds == 0 {
            return Err(Error::invalid_value(
                "http.timeout_seconds",
                "must be at least 1",
            ));
        }

        if !self.scroll_threshold_px.is_finite() || self.scroll_threshold_px < 0.0 {
            return Err(Error::invalid_value(
                "scroll_threshold_px",
                "must be a non-negative number",
            ));
        }

        Ok(())
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Debounce window as a duration
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Retry policy described by this config
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(
            self.retry.max_attempts,
            Duration::from_millis(self.retry.delay_ms),
        )
        .with_backoff(
            self.retry.backoff,
            Duration::from_millis(self.retry.max_delay_ms),
        )
    }

    /// HTTP client config described by this config
    pub fn http_client_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .timeout(Duration::from_secs(self.http.timeout_seconds))
            .header("Accept", "application/json");

        if let Some(ref agent) = self.http.user_agent {
            builder = builder.user_agent(agent.clone());
        }

        if self.http.rate_limit.enabled {
            builder = builder.rate_limit(RateLimiterConfig::new(
                self.http.rate_limit.requests_per_second,
                self.http.rate_limit.burst_size,
            ));
        }

        builder.build()
    }

    /// Build the retrying fetcher for the configured endpoint
    pub fn build_fetcher(&self) -> Result<RetryingFetcher<SearchClient>> {
        let http = HttpClient::with_config(self.http_client_config())?;
        let client = SearchClient::new(http, self.endpoint.clone());
        Ok(RetryingFetcher::with_policy(client, self.retry_policy()))
    }
}

// ============================================================================
// Retry Config
// ============================================================================

/// Retry settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay between attempts in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Delay growth
    #[serde(default)]
    pub backoff: BackoffType,

    /// Upper bound for a single delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    4
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    60_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
            backoff: BackoffType::Constant,
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// User agent override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// Outbound rate limiting
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

fn default_timeout() -> u64 {
    30
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            user_agent: None,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Rate limit settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Whether to rate limit at all
    #[serde(default)]
    pub enabled: bool,

    /// Requests per second
    #[serde(default = "default_rps")]
    pub requests_per_second: u32,

    /// Burst size
    #[serde(default = "default_burst")]
    pub burst_size: u32,
}

fn default_rps() -> u32 {
    10
}

fn default_burst() -> u32 {
    10
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            requests_per_second: default_rps(),
            burst_size: default_burst(),
        }
    }
}
