//! Retry module
//!
//! Bounded automatic retry for fallible async operations.
//!
//! # Overview
//!
//! A [`RetryPolicy`] is a plain value describing how many attempts to make and
//! how long to wait between them. [`retry`] runs an operation under a policy,
//! re-running it only while the error is retryable (see
//! [`Error::is_retryable`](crate::Error::is_retryable)).

mod policy;

pub use policy::{retry, RetryPolicy};
