//! Error types for shelfscroll
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Fetch failures fall into three classes, see [`FetchErrorKind`]:
//! transport failures are retried, application and parse failures are not.

use thiserror::Error;

/// The main error type for shelfscroll
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse config: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ============================================================================
    // Transport Errors (no response obtained)
    // ============================================================================
    #[error("Network request failed: {message}")]
    Transport { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    // ============================================================================
    // Application Errors (response obtained but unusable)
    // ============================================================================
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Malformed search response: {message}")]
    Parse { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

/// Classification of a failed fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Failure before any response was obtained (connect, DNS, timeout)
    Transport,
    /// A response was obtained but its status was not a success
    Application,
    /// The payload did not match the expected shape
    Parse,
    /// Anything else (configuration, I/O, ...)
    Other,
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Error::Transport { .. } | Error::Timeout { .. } => FetchErrorKind::Transport,
            Error::HttpStatus { .. } => FetchErrorKind::Application,
            Error::Parse { .. } => FetchErrorKind::Parse,
            _ => FetchErrorKind::Other,
        }
    }

    /// Check if this error is retryable
    ///
    /// Only transport failures are; a response that came back wrong will come
    /// back wrong again.
    pub fn is_retryable(&self) -> bool {
        self.kind() == FetchErrorKind::Transport
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Error::parse(err.to_string());
        }
        if let Some(status) = err.status() {
            return Error::http_status(status.as_u16(), err.to_string());
        }
        Error::transport(err.to_string())
    }
}

/// Result type alias for shelfscroll
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
