//! Render-ready view types

use crate::store::{ListItem, QueryState};
use crate::types::BookRecord;
use serde::Serialize;

/// Remaining scroll distance below which the list counts as near the bottom
pub const DEFAULT_SCROLL_THRESHOLD_PX: f64 = 100.0;

/// Snapshot of the active query for rendering
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchView {
    /// Query the view was built for
    pub query: String,
    /// Records in page order, ending with a placeholder while more exist
    pub items: Vec<ListItem>,
    /// A fetch is outstanding
    pub is_loading: bool,
    /// Loading with no records yet; render a full-list spinner
    pub is_initial_load: bool,
    /// Last final failure
    pub error: Option<String>,
    /// More pages are known to exist
    pub has_more: bool,
    /// Total hits reported by the endpoint
    pub total_count: Option<u64>,
}

impl SearchView {
    /// View of a query with no entry
    pub fn empty(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// Build the view of `state`
    pub fn from_state(query: impl Into<String>, state: &QueryState) -> Self {
        Self {
            query: query.into(),
            items: state.items().collect(),
            is_loading: state.is_loading(),
            is_initial_load: state.is_initial_load(),
            error: state.error().map(str::to_string),
            has_more: state.has_more(),
            total_count: state.total_count(),
        }
    }

    /// Books only, without the placeholder
    pub fn books(&self) -> impl Iterator<Item = &BookRecord> + '_ {
        self.items.iter().filter_map(|item| match item {
            ListItem::Book(book) => Some(book),
            ListItem::LoadingPlaceholder => None,
        })
    }
}

/// Scroll geometry of a list container, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollPosition {
    /// Distance scrolled from the top
    pub scroll_top: f64,
    /// Visible height
    pub client_height: f64,
    /// Full content height
    pub scroll_height: f64,
}

impl ScrollPosition {
    /// Create a scroll position
    pub fn new(scroll_top: f64, client_height: f64, scroll_height: f64) -> Self {
        Self {
            scroll_top,
            client_height,
            scroll_height,
        }
    }

    /// Whether the visible bottom edge is within `threshold` of the content end
    pub fn is_near_bottom(&self, threshold: f64) -> bool {
        self.scroll_top + self.client_height >= self.scroll_height - threshold
    }
}
