//! Page fetching over HTTP with bounded retry

use super::types::PageResponse;
use crate::error::Result;
use crate::http::{HttpClient, RequestConfig};
use crate::retry::{retry, RetryPolicy};
use crate::types::PageIndex;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Source of result pages for a query
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch one page of results for `query`
    async fn fetch_page(&self, query: &str, page: PageIndex) -> Result<PageResponse>;
}

#[async_trait]
impl<S: PageSource + ?Sized> PageSource for Arc<S> {
    async fn fetch_page(&self, query: &str, page: PageIndex) -> Result<PageResponse> {
        (**self).fetch_page(query, page).await
    }
}

/// Single-attempt client for the search endpoint
#[derive(Debug)]
pub struct SearchClient {
    http: HttpClient,
    endpoint: String,
}

impl SearchClient {
    /// Create a client for the given endpoint URL
    pub fn new(http: HttpClient, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    /// The endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PageSource for SearchClient {
    async fn fetch_page(&self, query: &str, page: PageIndex) -> Result<PageResponse> {
        let request = RequestConfig::new()
            .query("q", query)
            .query("page", page.to_string());

        let body = self.http.get_bytes_with_config(&self.endpoint, request).await?;
        let response = PageResponse::from_slice(&body)?;

        debug!(
            query,
            page,
            records = response.records.len(),
            total = response.total_count,
            "Fetched search page"
        );
        Ok(response)
    }
}

/// A [`PageSource`] decorated with a retry policy
///
/// Transport failures are retried according to the policy; status and payload
/// failures are returned immediately.
#[derive(Debug)]
pub struct RetryingFetcher<S> {
    source: S,
    policy: RetryPolicy,
}

impl<S: PageSource> RetryingFetcher<S> {
    /// Wrap `source` with the default policy
    pub fn new(source: S) -> Self {
        Self::with_policy(source, RetryPolicy::default())
    }

    /// Wrap `source` with a custom policy
    pub fn with_policy(source: S, policy: RetryPolicy) -> Self {
        Self { source, policy }
    }

    /// The retry policy in effect
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetch one page, retrying transport failures
    pub async fn fetch(&self, query: &str, page: PageIndex) -> Result<PageResponse> {
        retry(&self.policy, |_| self.source.fetch_page(query, page)).await
    }
}

#[async_trait]
impl<S: PageSource> PageSource for RetryingFetcher<S> {
    async fn fetch_page(&self, query: &str, page: PageIndex) -> Result<PageResponse> {
        self.fetch(query, page).await
    }
}
