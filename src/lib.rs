// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # shelfscroll
//!
//! Infinite-scroll pagination core for a book search UI.
//!
//! ## Features
//!
//! - **Debounced input**: keystrokes become the active query only after a quiet window
//! - **Per-query cache**: every query keeps its own pages, cursor and error
//! - **Incremental paging**: scrolling near the bottom loads exactly one more page
//! - **Transport retry**: connection failures are retried, bad responses are not
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shelfscroll::{AppConfig, PaginationFacade, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let facade = PaginationFacade::from_config(&AppConfig::default())?;
//!
//!     if let Some(pending) = facade.activate_now("dune").await {
//!         pending.wait().await?;
//!     }
//!     if let Some(pending) = facade.on_scroll_near_bottom().await {
//!         pending.wait().await?;
//!     }
//!
//!     for book in facade.view().await.books() {
//!         println!("{} by {}", book.title, book.author_line());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                    PaginationFacade                       │
//! │  set_query()  on_scroll_near_bottom()  view()  flatten()  │
//! └───────────────────────────────────────────────────────────┘
//!        │ Debouncer                    │
//! ┌──────┴──────────────────────────────┴─────────────────────┐
//! │                      QueryStore                           │
//! │  query → { pages, next_page, has_more, is_loading, error }│
//! └───────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────────┬───────────┴──────┬──────────────────────┐
//! │ RetryingFetcher │   SearchClient   │      HttpClient      │
//! │ 4 x 1000ms      │   ?q=...&page=N  │  timeout, rate limit │
//! └─────────────────┴──────────────────┴──────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Application configuration
pub mod config;

/// Single-attempt HTTP client with optional rate limiting
pub mod http;

/// Retry policy and executor
pub mod retry;

/// Page source contract, search endpoint client and retrying fetcher
pub mod search;

/// Per-query page cache
pub mod store;

/// Debounced input and scroll handling over the store
pub mod facade;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, FetchErrorKind, Result};
pub use types::*;

// Re-export commonly used types
pub use config::AppConfig;
pub use facade::{Debouncer, PaginationFacade, ScrollPosition, SearchView};
pub use retry::RetryPolicy;
pub use search::{PageResponse, PageSource, RetryingFetcher, SearchClient};
pub use store::{ListItem, PendingFetch, QueryState, QueryStatus, QueryStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
