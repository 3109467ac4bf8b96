//! Query store implementation
//!
//! The store is keyed by query. Guards are checked and `Loading` is entered
//! under one write lock; the fetch itself runs in a spawned task tagged with
//! the query and page it was issued for.

use super::types::QueryState;
use crate::error::{Error, Result};
use crate::search::{PageResponse, PageSource};
use crate::types::PageIndex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Identity of an in-flight fetch
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchTag {
    /// Query the fetch was issued for
    pub query: String,
    /// Page requested
    pub page: PageIndex,
}

impl FetchTag {
    fn new(query: &str, page: PageIndex) -> Self {
        Self {
            query: query.to_string(),
            page,
        }
    }
}

/// Handle to a fetch started by a store operation
///
/// Dropping the handle does not cancel the fetch.
#[derive(Debug)]
pub struct PendingFetch {
    tag: FetchTag,
    handle: JoinHandle<()>,
}

impl PendingFetch {
    /// The query and page being fetched
    pub fn tag(&self) -> &FetchTag {
        &self.tag
    }

    /// Wait until the outcome has been applied to the store
    pub async fn wait(self) -> Result<()> {
        self.handle
            .await
            .map_err(|e| Error::Other(format!("Fetch task for '{}' failed: {e}", self.tag.query)))
    }
}

/// Keyed pagination store
///
/// Cloning is cheap and every clone shares the same entries.
#[derive(Clone)]
pub struct QueryStore {
    fetcher: Arc<dyn PageSource>,
    entries: Arc<RwLock<HashMap<String, QueryState>>>,
    revision: Arc<watch::Sender<u64>>,
}

impl QueryStore {
    /// Create an empty store fetching through `fetcher`
    pub fn new(fetcher: impl PageSource + 'static) -> Self {
        Self::with_shared(Arc::new(fetcher))
    }

    /// Create an empty store over a shared fetcher
    pub fn with_shared(fetcher: Arc<dyn PageSource>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            fetcher,
            entries: Arc::new(RwLock::new(HashMap::new())),
            revision: Arc::new(revision),
        }
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Start the initial fetch for `query`
    ///
    /// No-op for an empty query or an entry that already exists, unless that
    /// entry's last fetch failed, in which case the failed page is retried.
    pub async fn ensure_fetched(&self, query: &str) -> Option<PendingFetch> {
        if query.is_empty() {
            return None;
        }

        let page = {
            let mut entries = self.entries.write().await;
            match entries.get_mut(query) {
                Some(state) if state.needs_retry() => {
                    info!(query, "Re-activating failed query");
                    state.begin_fetch()
                }
                Some(_) => return None,
                None => {
                    info!(query, "Activating query");
                    let mut state = QueryState::new();
                    let page = state.begin_fetch();
                    entries.insert(query.to_string(), state);
                    page
                }
            }
        };

        self.notify();
        Some(self.spawn_fetch(FetchTag::new(query, page)))
    }

    /// Fetch the next page of `query`
    ///
    /// No-op unless an entry exists, has more pages, and is not loading.
    pub async fn fetch_next_page(&self, query: &str) -> Option<PendingFetch> {
        let page = {
            let mut entries = self.entries.write().await;
            let state = entries.get_mut(query)?;
            if !state.can_fetch_next() {
                debug!(
                    query,
                    has_more = state.has_more(),
                    is_loading = state.is_loading(),
                    "Skipping next page"
                );
                return None;
            }
            state.begin_fetch()
        };

        self.notify();
        Some(self.spawn_fetch(FetchTag::new(query, page)))
    }

    /// Drop the pages of `query` and fetch again from the first page
    ///
    /// Activates the query if it has no entry; no-op while it is loading.
    pub async fn refresh(&self, query: &str) -> Option<PendingFetch> {
        let page = {
            let mut entries = self.entries.write().await;
            if !entries.contains_key(query) {
                drop(entries);
                return self.ensure_fetched(query).await;
            }

            let state = entries.get_mut(query)?;
            if state.is_loading() {
                return None;
            }
            state.reset();
            state.begin_fetch()
        };

        self.notify();
        Some(self.spawn_fetch(FetchTag::new(query, page)))
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Copy of the state for `query`
    pub async fn snapshot(&self, query: &str) -> Option<QueryState> {
        self.entries.read().await.get(query).cloned()
    }

    /// Run `f` against the state for `query` without copying it
    pub async fn read<R>(&self, query: &str, f: impl FnOnce(&QueryState) -> R) -> Option<R> {
        self.entries.read().await.get(query).map(f)
    }

    /// Whether `query` has an entry
    pub async fn contains(&self, query: &str) -> bool {
        self.entries.read().await.contains_key(query)
    }

    /// Number of queries with an entry
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether no query has been activated yet
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Receiver whose value changes on every state mutation
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Current revision
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Signal subscribers that the rendered view may have changed
    pub(crate) fn notify(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    fn spawn_fetch(&self, tag: FetchTag) -> PendingFetch {
        debug!(query = %tag.query, page = tag.page, "Starting fetch");

        let store = self.clone();
        let task_tag = tag.clone();
        let handle = tokio::spawn(async move {
            let result = store
                .fetcher
                .fetch_page(&task_tag.query, task_tag.page)
                .await;
            store.apply(&task_tag, result).await;
        });

        PendingFetch { tag, handle }
    }

    /// Apply a fetch outcome to the entry named by its tag
    async fn apply(&self, tag: &FetchTag, result: Result<PageResponse>) {
        {
            let mut entries = self.entries.write().await;
            let Some(state) = entries.get_mut(&tag.query) else {
                warn!(query = %tag.query, "Dropping fetch result for unknown query");
                return;
            };

            match result {
                Ok(response) => {
                    debug!(
                        query = %tag.query,
                        page = tag.page,
                        records = response.records.len(),
                        has_more = response.has_more(),
                        "Merged page"
                    );
                    state.apply_page(tag.page, response);
                }
                Err(e) => {
                    warn!(query = %tag.query, page = tag.page, "Fetch failed: {}", e);
                    state.apply_failure(e.to_string());
                }
            }
        }

        self.notify();
    }
}

impl std::fmt::Debug for QueryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryStore")
            .field("revision", &self.revision())
            .finish_non_exhaustive()
    }
}
