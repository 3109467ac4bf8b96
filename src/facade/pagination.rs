//! Pagination facade consumed by the UI

use super::debounce::Debouncer;
use super::view::{ScrollPosition, SearchView, DEFAULT_SCROLL_THRESHOLD_PX};
use crate::config::AppConfig;
use crate::error::Result;
use crate::store::{ListItem, PendingFetch, QueryStore};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::debug;

/// Query input, scroll events, and the render view over a [`QueryStore`]
///
/// Raw input goes through a [`Debouncer`]; a background driver task turns each
/// debounced value into the active query and activates it in the store.
/// Must be created within a tokio runtime.
pub struct PaginationFacade {
    store: QueryStore,
    active: Arc<RwLock<String>>,
    debouncer: Mutex<Debouncer<String>>,
    debounce_window: Duration,
    scroll_threshold: f64,
    driver: JoinHandle<()>,
}

impl PaginationFacade {
    /// Create a facade over `store` debouncing input by `debounce_window`
    pub fn new(store: QueryStore, debounce_window: Duration) -> Self {
        let (debouncer, mut debounced) = Debouncer::new();
        let active = Arc::new(RwLock::new(String::new()));

        let driver = {
            let store = store.clone();
            let active = active.clone();
            tokio::spawn(async move {
                while let Some(query) = debounced.recv().await {
                    // Detached: the fetch runs to completion on its own
                    let _pending = activate(&store, &active, query).await;
                }
            })
        };

        Self {
            store,
            active,
            debouncer: Mutex::new(debouncer),
            debounce_window,
            scroll_threshold: DEFAULT_SCROLL_THRESHOLD_PX,
            driver,
        }
    }

    /// Build the whole stack (HTTP client, retrying fetcher, store) from config
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let store = QueryStore::new(config.build_fetcher()?);
        Ok(Self::new(store, config.debounce_window())
            .with_scroll_threshold(config.scroll_threshold_px))
    }

    /// Set the near-bottom threshold used by [`on_scroll`](Self::on_scroll)
    #[must_use]
    pub fn with_scroll_threshold(mut self, threshold: f64) -> Self {
        self.scroll_threshold = threshold;
        self
    }

    /// The underlying store
    pub fn store(&self) -> &QueryStore {
        &self.store
    }

    /// Debounce window applied by [`set_query`](Self::set_query)
    pub fn debounce_window(&self) -> Duration {
        self.debounce_window
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Feed raw input; it becomes active once stable for the debounce window
    pub fn set_query(&self, text: impl Into<String>) {
        self.debouncer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .emit(text.into(), self.debounce_window);
    }

    /// Make `text` the active query immediately, dropping any pending input
    pub async fn activate_now(&self, text: impl Into<String>) -> Option<PendingFetch> {
        self.debouncer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
        activate(&self.store, &self.active, text.into()).await
    }

    /// Scroll reached the bottom proximity threshold
    pub async fn on_scroll_near_bottom(&self) -> Option<PendingFetch> {
        let query = self.active_query().await;
        self.store.fetch_next_page(&query).await
    }

    /// Report a scroll position; fetches the next page when near the bottom
    pub async fn on_scroll(&self, position: ScrollPosition) -> Option<PendingFetch> {
        if !position.is_near_bottom(self.scroll_threshold) {
            return None;
        }
        self.on_scroll_near_bottom().await
    }

    /// Drop the active query's pages and load them again
    pub async fn refresh(&self) -> Option<PendingFetch> {
        let query = self.active_query().await;
        self.store.refresh(&query).await
    }

    // ========================================================================
    // Output
    // ========================================================================

    /// The query currently driving the view
    pub async fn active_query(&self) -> String {
        self.active.read().await.clone()
    }

    /// Render view of the active query
    pub async fn view(&self) -> SearchView {
        let query = self.active_query().await;
        self.store
            .read(&query, |state| SearchView::from_state(query.as_str(), state))
            .await
            .unwrap_or_else(|| SearchView::empty(query.as_str()))
    }

    /// Flattened list of any query, in page order
    pub async fn flatten(&self, query: &str) -> Vec<ListItem> {
        self.store
            .read(query, |state| state.items().collect())
            .await
            .unwrap_or_default()
    }

    /// Receiver that changes whenever the view may have changed
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.store.subscribe()
    }
}

impl Drop for PaginationFacade {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

impl std::fmt::Debug for PaginationFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginationFacade")
            .field("store", &self.store)
            .field("debounce_window", &self.debounce_window)
            .field("scroll_threshold", &self.scroll_threshold)
            .finish_non_exhaustive()
    }
}

async fn activate(
    store: &QueryStore,
    active: &RwLock<String>,
    query: String,
) -> Option<PendingFetch> {
    let changed = {
        let mut current = active.write().await;
        if *current == query {
            false
        } else {
            debug!(from = %current, to = %query, "Active query changed");
            current.clone_from(&query);
            true
        }
    };

    if changed {
        store.notify();
    }
    store.ensure_fetched(&query).await
}
