//! UI-facing facade module
//!
//! The surface a list UI binds to.
//!
//! # Overview
//!
//! - [`Debouncer`] - delivers only values that stayed latest for a full window
//! - [`PaginationFacade`] - `set_query`, scroll notifications, and the render view
//! - [`SearchView`] - flattened records plus loading/error/has-more flags
//! - [`ScrollPosition`] - near-bottom check for scroll containers

mod debounce;
mod pagination;
mod view;

pub use debounce::Debouncer;
pub use pagination::PaginationFacade;
pub use view::{ScrollPosition, SearchView, DEFAULT_SCROLL_THRESHOLD_PX};
