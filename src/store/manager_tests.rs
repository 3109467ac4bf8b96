//! Tests for QueryStore

use super::*;
use crate::retry::RetryPolicy;
use crate::search::mock::{Scripted, ScriptedSource};
use crate::search::RetryingFetcher;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn store_with(source: &Arc<ScriptedSource>) -> QueryStore {
    QueryStore::new(RetryingFetcher::new(source.clone()))
}

// ============================================================================
// Activation Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_first_activation_fetches_page_one_once() {
    let source = Arc::new(ScriptedSource::new(20, 120));
    let store = store_with(&source);

    let pending = store.ensure_fetched("dune").await.unwrap();
    assert_eq!(pending.tag().page, 1);
    assert_eq!(pending.tag().query, "dune");

    // Loading state is visible before the fetch resolves
    let state = store.snapshot("dune").await.unwrap();
    assert!(state.is_loading());
    assert!(state.is_initial_load());

    pending.wait().await.unwrap();
    assert_eq!(source.calls(), vec![("dune".to_string(), 1)]);
}

#[tokio::test(start_paused = true)]
async fn test_activation_is_idempotent() {
    let source = Arc::new(ScriptedSource::new(20, 120));
    let store = store_with(&source);

    let pending = store.ensure_fetched("dune").await.unwrap();
    // While loading
    assert!(store.ensure_fetched("dune").await.is_none());
    pending.wait().await.unwrap();
    // And after success
    assert!(store.ensure_fetched("dune").await.is_none());

    assert_eq!(source.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_empty_query_never_enters_store() {
    let source = Arc::new(ScriptedSource::new(20, 120));
    let store = store_with(&source);

    assert!(store.ensure_fetched("").await.is_none());
    assert!(store.is_empty().await);
    assert!(!store.contains("").await);
    assert_eq!(source.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_query_equality_is_exact() {
    let source = Arc::new(ScriptedSource::new(20, 120));
    let store = store_with(&source);

    store.ensure_fetched("Dune").await.unwrap().wait().await.unwrap();
    store.ensure_fetched("dune").await.unwrap().wait().await.unwrap();
    store.ensure_fetched("dune ").await.unwrap().wait().await.unwrap();

    assert_eq!(store.len().await, 3);
    assert_eq!(source.call_count(), 3);
}

// ============================================================================
// Pagination Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_first_page_sets_cursor_and_has_more() {
    // 20 docs, num_found=120, start=0
    let source = Arc::new(ScriptedSource::new(20, 120));
    let store = store_with(&source);

    store.ensure_fetched("dune").await.unwrap().wait().await.unwrap();

    let state = store.snapshot("dune").await.unwrap();
    assert!(state.has_more());
    assert_eq!(state.next_page(), 2);
    assert!(!state.is_loading());
    assert!(state.error().is_none());
    assert_eq!(state.total_count(), Some(120));
    assert_eq!(state.record_count(), 20);
    assert_eq!(state.status(), QueryStatus::Ready { has_more: true });
}

#[tokio::test(start_paused = true)]
async fn test_next_page_noop_without_more() {
    let source = Arc::new(ScriptedSource::new(20, 0));
    let store = store_with(&source);

    store.ensure_fetched("zzqx").await.unwrap().wait().await.unwrap();
    let before = store.snapshot("zzqx").await.unwrap();
    assert!(!before.has_more());
    let revision = store.revision();

    assert!(store.fetch_next_page("zzqx").await.is_none());

    assert_eq!(store.snapshot("zzqx").await.unwrap(), before);
    assert_eq!(store.revision(), revision);
    assert_eq!(source.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_next_page_noop_while_loading() {
    let source = Arc::new(ScriptedSource::new(20, 120));
    let store = store_with(&source);

    store.ensure_fetched("dune").await.unwrap().wait().await.unwrap();

    source.delay("dune", Duration::from_secs(5));
    let pending = store.fetch_next_page("dune").await.unwrap();
    assert_eq!(pending.tag().page, 2);

    // Scroll events keep arriving while page 2 is outstanding
    assert!(store.fetch_next_page("dune").await.is_none());
    assert!(store.fetch_next_page("dune").await.is_none());

    pending.wait().await.unwrap();
    assert_eq!(
        source.calls(),
        vec![("dune".to_string(), 1), ("dune".to_string(), 2)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_next_page_noop_for_unknown_query() {
    let source = Arc::new(ScriptedSource::new(20, 120));
    let store = store_with(&source);

    assert!(store.fetch_next_page("dune").await.is_none());
    assert_eq!(source.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_pages_flatten_in_page_order() {
    let source = Arc::new(ScriptedSource::new(2, 10));
    let store = store_with(&source);

    store.ensure_fetched("dune").await.unwrap().wait().await.unwrap();
    store.fetch_next_page("dune").await.unwrap().wait().await.unwrap();

    let keys = store
        .read("dune", |state| {
            state.records().map(|b| b.key.clone()).collect::<Vec<_>>()
        })
        .await
        .unwrap();
    assert_eq!(keys, vec!["dune:1:0", "dune:1:1", "dune:2:0", "dune:2:1"]);

    let state = store.snapshot("dune").await.unwrap();
    assert_eq!(state.next_page(), 3);
    assert!(matches!(
        state.items().last(),
        Some(ListItem::LoadingPlaceholder)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_paging_until_exhausted() {
    // 5 hits, 2 per page: pages 1-3 have records, page 4 is empty
    let source = Arc::new(ScriptedSource::new(2, 5));
    let store = store_with(&source);

    store.ensure_fetched("dune").await.unwrap().wait().await.unwrap();
    while let Some(pending) = store.fetch_next_page("dune").await {
        pending.wait().await.unwrap();
    }

    let state = store.snapshot("dune").await.unwrap();
    assert_eq!(state.record_count(), 5);
    assert!(!state.has_more());
    assert_eq!(state.next_page(), 5);
    assert_eq!(source.call_count(), 4);
    assert!(state.items().all(|item| item != ListItem::LoadingPlaceholder));
}

// ============================================================================
// Failure and Retry Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_transient_failures_are_invisible() {
    let source = Arc::new(ScriptedSource::new(20, 120));
    source.script(
        "dune",
        1,
        vec![Scripted::Transport("reset"), Scripted::Transport("reset")],
    );
    let store = store_with(&source);
    let start = Instant::now();

    store.ensure_fetched("dune").await.unwrap().wait().await.unwrap();

    let state = store.snapshot("dune").await.unwrap();
    assert!(state.error().is_none());
    assert_eq!(state.record_count(), 20);
    assert!(start.elapsed() >= Duration::from_millis(2000));
    assert_eq!(source.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_surface_last_error() {
    let source = Arc::new(ScriptedSource::new(20, 120));
    let store = store_with(&source);

    store.ensure_fetched("dune").await.unwrap().wait().await.unwrap();
    let before = store.snapshot("dune").await.unwrap();

    source.script(
        "dune",
        2,
        vec![
            Scripted::Transport("attempt 1"),
            Scripted::Transport("attempt 2"),
            Scripted::Transport("attempt 3"),
            Scripted::Transport("attempt 4"),
        ],
    );
    store.fetch_next_page("dune").await.unwrap().wait().await.unwrap();

    let state = store.snapshot("dune").await.unwrap();
    assert_eq!(state.error(), Some("Network request failed: attempt 4"));
    assert!(!state.is_loading());
    assert_eq!(state.pages(), before.pages());
    assert_eq!(state.next_page(), before.next_page());
    assert_eq!(state.has_more(), before.has_more());
    assert_eq!(source.call_count(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_failed_next_page_can_be_retried() {
    let source = Arc::new(ScriptedSource::new(20, 120));
    let store = store_with(&source);

    store.ensure_fetched("dune").await.unwrap().wait().await.unwrap();
    source.script("dune", 2, vec![Scripted::Status(502)]);
    store.fetch_next_page("dune").await.unwrap().wait().await.unwrap();
    assert!(store.snapshot("dune").await.unwrap().error().is_some());

    // Next scroll retries the same page and clears the error
    let pending = store.fetch_next_page("dune").await.unwrap();
    assert_eq!(pending.tag().page, 2);
    assert!(store.snapshot("dune").await.unwrap().error().is_none());
    pending.wait().await.unwrap();

    let state = store.snapshot("dune").await.unwrap();
    assert!(state.error().is_none());
    assert_eq!(state.next_page(), 3);
    assert_eq!(state.record_count(), 40);
}

#[tokio::test(start_paused = true)]
async fn test_failed_first_page_retried_on_reactivation() {
    let source = Arc::new(ScriptedSource::new(20, 120));
    source.script("dune", 1, vec![Scripted::Malformed]);
    let store = store_with(&source);

    store.ensure_fetched("dune").await.unwrap().wait().await.unwrap();
    let state = store.snapshot("dune").await.unwrap();
    assert_eq!(
        state.error(),
        Some("Malformed search response: missing field `docs`")
    );
    // Nothing loaded, so no has-more and scrolling cannot recover it
    assert!(store.fetch_next_page("dune").await.is_none());

    let pending = store.ensure_fetched("dune").await.unwrap();
    assert_eq!(pending.tag().page, 1);
    pending.wait().await.unwrap();

    let state = store.snapshot("dune").await.unwrap();
    assert!(state.error().is_none());
    assert_eq!(state.record_count(), 20);
    assert_eq!(source.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_errors_are_scoped_to_their_query() {
    let source = Arc::new(ScriptedSource::new(20, 120));
    source.script("broken", 1, vec![Scripted::Status(500)]);
    let store = store_with(&source);

    let broken = store.ensure_fetched("broken").await.unwrap();
    let healthy = store.ensure_fetched("healthy").await.unwrap();
    broken.wait().await.unwrap();
    healthy.wait().await.unwrap();

    assert!(store.snapshot("broken").await.unwrap().error().is_some());
    let healthy = store.snapshot("healthy").await.unwrap();
    assert!(healthy.error().is_none());
    assert_eq!(healthy.record_count(), 20);
}

// ============================================================================
// Stale Result Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_late_result_applies_to_its_own_query() {
    let source = Arc::new(ScriptedSource::new(20, 120));
    source.delay("a", Duration::from_secs(3));
    let store = store_with(&source);

    let slow = store.ensure_fetched("a").await.unwrap();
    // The user moves on to "b" while "a" is outstanding
    store.ensure_fetched("b").await.unwrap().wait().await.unwrap();

    let b_before = store.snapshot("b").await.unwrap();
    assert!(store.snapshot("a").await.unwrap().is_loading());

    slow.wait().await.unwrap();

    let a = store.snapshot("a").await.unwrap();
    assert!(!a.is_loading());
    assert!(a.records().all(|book| book.key.starts_with("a:")));
    assert_eq!(a.record_count(), 20);

    let b = store.snapshot("b").await.unwrap();
    assert_eq!(b, b_before);
    assert!(b.records().all(|book| book.key.starts_with("b:")));
}

#[tokio::test(start_paused = true)]
async fn test_switching_back_keeps_loaded_pages() {
    let source = Arc::new(ScriptedSource::new(20, 120));
    let store = store_with(&source);

    store.ensure_fetched("a").await.unwrap().wait().await.unwrap();
    store.fetch_next_page("a").await.unwrap().wait().await.unwrap();
    store.ensure_fetched("b").await.unwrap().wait().await.unwrap();

    // Back to "a": no new request, both pages still there
    assert!(store.ensure_fetched("a").await.is_none());
    assert_eq!(store.snapshot("a").await.unwrap().record_count(), 40);
    assert_eq!(source.call_count(), 3);
}

// ============================================================================
// Refresh and Notification Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_refresh_refetches_from_first_page() {
    let source = Arc::new(ScriptedSource::new(20, 120));
    let store = store_with(&source);

    store.ensure_fetched("dune").await.unwrap().wait().await.unwrap();
    store.fetch_next_page("dune").await.unwrap().wait().await.unwrap();

    let pending = store.refresh("dune").await.unwrap();
    assert_eq!(pending.tag().page, 1);
    assert!(store.snapshot("dune").await.unwrap().is_initial_load());
    // Already loading
    assert!(store.refresh("dune").await.is_none());
    pending.wait().await.unwrap();

    let state = store.snapshot("dune").await.unwrap();
    assert_eq!(state.record_count(), 20);
    assert_eq!(state.next_page(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_activates_unknown_query() {
    let source = Arc::new(ScriptedSource::new(20, 120));
    let store = store_with(&source);

    store.refresh("dune").await.unwrap().wait().await.unwrap();
    assert!(store.contains("dune").await);
    assert!(store.refresh("").await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_revision_changes_on_every_transition() {
    let source = Arc::new(ScriptedSource::new(20, 120));
    let store = store_with(&source);
    let mut rx = store.subscribe();

    let pending = store.ensure_fetched("dune").await.unwrap();
    assert!(rx.has_changed().unwrap());
    assert_eq!(*rx.borrow_and_update(), 1);

    pending.wait().await.unwrap();
    rx.changed().await.unwrap();
    assert_eq!(*rx.borrow_and_update(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_store_without_retry() {
    let source = Arc::new(ScriptedSource::new(20, 120));
    source.script("dune", 1, vec![Scripted::Transport("down")]);
    let store = QueryStore::new(RetryingFetcher::with_policy(
        source.clone(),
        RetryPolicy::no_retry(),
    ));

    store.ensure_fetched("dune").await.unwrap().wait().await.unwrap();
    assert_eq!(
        store.snapshot("dune").await.unwrap().error(),
        Some("Network request failed: down")
    );
    assert_eq!(source.call_count(), 1);
}
