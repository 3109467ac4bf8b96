//! Query store module
//!
//! Per-query pagination state and the only code allowed to change it.
//!
//! # Overview
//!
//! The store module provides:
//! - `QueryState` - pages, cursor, and loading/error/has-more flags for one query
//! - `QueryStore` - the keyed store plus the operations that drive fetches
//! - `PendingFetch` - handle to a fetch started by a store operation
//!
//! Every fetch carries the query it was issued for and its outcome is applied
//! to that query's entry, whatever query the UI has moved on to since.

mod manager;
mod types;

pub use manager::{FetchTag, PendingFetch, QueryStore};
pub use types::{ListItem, PageMap, QueryState, QueryStatus};

#[cfg(test)]
mod manager_tests;
