//! Per-query pagination state
//!
//! Fields are read through accessors; only the store mutates them.

use crate::search::PageResponse;
use crate::types::{BookRecord, PageIndex, FIRST_PAGE};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Pages of one query keyed by page index; iteration is in page order
pub type PageMap = BTreeMap<PageIndex, Vec<BookRecord>>;

/// Where a query is in its fetch lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStatus {
    /// A fetch for `page` is outstanding
    Loading { page: PageIndex },
    /// Last fetch succeeded (or nothing has been fetched yet)
    Ready { has_more: bool },
    /// Last fetch failed; a later fetch may retry `next_page`
    Failed { error: String },
}

/// An element of the render-ready list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ListItem {
    /// A search hit
    Book(BookRecord),
    /// Trailing spinner row, present while more pages are known to exist
    LoadingPlaceholder,
}

/// State for a single query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryState {
    pages: PageMap,
    next_page: PageIndex,
    has_more: bool,
    is_loading: bool,
    error: Option<String>,
    total_count: Option<u64>,
    last_fetched_at: Option<DateTime<Utc>>,
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryState {
    /// Create an empty state positioned at the first page
    pub fn new() -> Self {
        Self {
            pages: PageMap::new(),
            next_page: FIRST_PAGE,
            has_more: false,
            is_loading: false,
            error: None,
            total_count: None,
            last_fetched_at: None,
        }
    }

    /// Fetched pages
    pub fn pages(&self) -> &PageMap {
        &self.pages
    }

    /// Page the next fetch will request
    pub fn next_page(&self) -> PageIndex {
        self.next_page
    }

    /// Whether the most recent page reported more results
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Whether a fetch is outstanding
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Loading with nothing to show yet
    pub fn is_initial_load(&self) -> bool {
        self.is_loading && self.pages.is_empty()
    }

    /// Message of the last final failure, cleared when a new fetch starts
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Total hits reported by the most recent page
    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    /// When the most recent page was merged
    pub fn last_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.last_fetched_at
    }

    /// Lifecycle status
    pub fn status(&self) -> QueryStatus {
        if self.is_loading {
            QueryStatus::Loading {
                page: self.next_page,
            }
        } else if let Some(ref error) = self.error {
            QueryStatus::Failed {
                error: error.clone(),
            }
        } else {
            QueryStatus::Ready {
                has_more: self.has_more,
            }
        }
    }

    /// Number of records across all pages
    pub fn record_count(&self) -> usize {
        self.pages.values().map(Vec::len).sum()
    }

    /// All records in page order
    pub fn records(&self) -> impl Iterator<Item = &BookRecord> + '_ {
        self.pages.values().flatten()
    }

    /// Render-ready list: records in page order, then a placeholder if more exist
    pub fn items(&self) -> impl Iterator<Item = ListItem> + '_ {
        self.records()
            .cloned()
            .map(ListItem::Book)
            .chain(self.has_more.then_some(ListItem::LoadingPlaceholder))
    }

    // ------------------------------------------------------------------------
    // Transitions (store only)
    // ------------------------------------------------------------------------

    /// Whether a re-activation should retry the last failed fetch
    pub(crate) fn needs_retry(&self) -> bool {
        !self.is_loading && self.error.is_some()
    }

    /// Whether `fetch_next_page` may start a fetch
    pub(crate) fn can_fetch_next(&self) -> bool {
        self.has_more && !self.is_loading
    }

    /// Enter `Loading` and return the page to fetch
    pub(crate) fn begin_fetch(&mut self) -> PageIndex {
        self.is_loading = true;
        self.error = None;
        self.next_page
    }

    /// Drop every fetched page and rewind to the first page
    pub(crate) fn reset(&mut self) {
        self.pages.clear();
        self.next_page = FIRST_PAGE;
        self.has_more = false;
        self.total_count = None;
    }

    /// Merge a successful page; re-fetching a page replaces it
    pub(crate) fn apply_page(&mut self, page: PageIndex, response: PageResponse) {
        self.has_more = response.has_more();
        self.total_count = Some(response.total_count);
        self.pages.insert(page, response.records);
        self.next_page = page + 1;
        self.is_loading = false;
        self.last_fetched_at = Some(Utc::now());
    }

    /// Record a final failure, keeping prior pages
    pub(crate) fn apply_failure(&mut self, message: String) {
        self.error = Some(message);
        self.is_loading = false;
    }
}
