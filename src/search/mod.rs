//! Search endpoint module
//!
//! Talks to the remote book search endpoint:
//! `GET <endpoint>?q=<query>&page=<page>` returning
//! `{ docs: [...], num_found, start }`.
//!
//! # Overview
//!
//! - [`PageResponse`] - validated page of results parsed from the payload
//! - [`PageSource`] - anything that can fetch one page for a query
//! - [`SearchClient`] - single-attempt HTTP implementation
//! - [`RetryingFetcher`] - wraps a source with a [`RetryPolicy`](crate::retry::RetryPolicy)

mod fetcher;
mod types;

pub use fetcher::{PageSource, RetryingFetcher, SearchClient};
pub use types::PageResponse;

#[cfg(test)]
pub(crate) mod mock;
