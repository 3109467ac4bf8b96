//! HTTP client module
//!
//! Provides a thin HTTP client that performs exactly one attempt per call and
//! classifies the outcome into the crate's error taxonomy. Retrying is the
//! caller's business (see [`crate::retry`]).
//!
//! # Features
//!
//! - **Error Classification**: transport, status, and payload failures kept apart
//! - **Rate Limiting**: Optional token bucket rate limiter using governor
//! - **Default Headers**: Applied to every request

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
