//! Conformance suite for store implementations.
//!
//! This module provides async test functions that validate whether a
//! [`Store`] — and therefore the backend beneath it — honors the shared
//! contract: absent-key semantics, enumeration ordering, pagination and
//! cursor behavior, batch semantics, and typed round-trips. Every backend,
//! bundled or third-party, can run the same suite to ensure
//! interoperability.
//!
//! # Usage
//!
//! Call each function with a freshly opened store:
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use polystore_storage::{conformance, MemoryBackend, Store};
//!
//! #[tokio::test]
//! async fn crud_info_missing_is_absent() {
//!     let store = Store::new(Arc::new(MemoryBackend::new()));
//!     conformance::crud_info_missing_is_absent(&store).await;
//! }
//! ```
//!
//! Each function works in its own key namespace, so [`run_all`] can exercise
//! the whole suite against a single shared store.
//!
//! | Category | Contract aspect |
//! |----------|-----------------|
//! | CRUD | absent-key semantics, overwrite, idempotent delete |
//! | Enumeration | ordering, prefix filtering, `max_results`, paging, cursors |
//! | Batch | slot alignment, input order |
//! | Typed | serialize/deserialize round-trips |

use crate::{query::Query, store::Store, StoreError};

// ============================================================================
// CRUD — absent-key semantics and overwrite behavior
// ============================================================================

/// `info` on a key never written returns the absent indicator, not an error.
pub async fn crud_info_missing_is_absent(store: &Store) {
    let result = store.info("conf:crud:never-written").await;
    assert!(result.is_ok(), "info on a missing key must not error: {result:?}");
    assert!(result.expect("checked above").is_none());
}

/// `read` on a missing key returns `Ok(None)`.
pub async fn crud_read_missing_is_absent(store: &Store) {
    let result = store.read("conf:crud:missing").await;
    assert!(result.is_ok(), "read on a missing key must not error: {result:?}");
    assert!(result.expect("checked above").is_none());
}

/// `write` then `read` round-trips the value.
pub async fn crud_write_then_read_roundtrips(store: &Store) {
    store.write("conf:crud:rt", "value-1").await.expect("write");
    let value = store.read("conf:crud:rt").await.expect("read");
    assert_eq!(value.as_deref(), Some(b"value-1".as_slice()));
}

/// `write` on an existing key overwrites the value.
pub async fn crud_write_overwrites(store: &Store) {
    store.write("conf:crud:ow", "original").await.expect("write");
    store.write("conf:crud:ow", "updated").await.expect("overwrite");
    let value = store.read("conf:crud:ow").await.expect("read");
    assert_eq!(value.as_deref(), Some(b"updated".as_slice()));
}

/// `delete` on a missing key is a silent no-op.
pub async fn crud_delete_missing_is_noop(store: &Store) {
    let result = store.delete("conf:crud:ghost").await;
    assert!(result.is_ok(), "delete of a missing key must not error: {result:?}");
}

/// `delete` removes a previously written key.
pub async fn crud_delete_removes_key(store: &Store) {
    store.write("conf:crud:del", "v").await.expect("write");
    store.delete("conf:crud:del").await.expect("delete");
    assert!(store.read("conf:crud:del").await.expect("read").is_none());
}

/// `info` reports the stored value's length.
pub async fn crud_info_reports_length(store: &Store) {
    store.write("conf:crud:len", "12345").await.expect("write");
    let entry = store.info("conf:crud:len").await.expect("info").expect("present");
    assert_eq!(entry.key, "conf:crud:len");
    assert_eq!(entry.length, Some(5));
}

// ============================================================================
// Enumeration — ordering, filtering, pagination, cursors
// ============================================================================

/// Enumeration yields entries in ascending key order.
pub async fn enum_results_are_key_ordered(store: &Store) {
    for key in ["conf:ord:c", "conf:ord:a", "conf:ord:b"] {
        store.write(key, "v").await.expect("write");
    }
    let entries =
        store.enumerate(Query::with_prefix("conf:ord:")).collect().await.expect("collect");
    let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["conf:ord:a", "conf:ord:b", "conf:ord:c"]);
}

/// A prefix restricts results to keys starting with it.
pub async fn enum_prefix_filters(store: &Store) {
    for key in ["conf:pf:k1", "conf:pf:k2", "conf:pf:a3"] {
        store.write(key, "v").await.expect("write");
    }
    let entries =
        store.enumerate(Query::with_prefix("conf:pf:k")).collect().await.expect("collect");
    let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["conf:pf:k1", "conf:pf:k2"]);
}

/// A blank prefix matches everything.
pub async fn enum_blank_prefix_matches_all(store: &Store) {
    for key in ["conf:all:x", "conf:all:y"] {
        store.write(key, "v").await.expect("write");
    }
    let entries = store.enumerate(Query::default()).collect().await.expect("collect");
    let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
    assert!(keys.contains(&"conf:all:x") && keys.contains(&"conf:all:y"));
}

/// `max_results = N` yields exactly `N` entries when more exist.
pub async fn enum_max_results_caps_output(store: &Store) {
    for i in 0..5 {
        store.write(&format!("conf:cap:{i}"), "v").await.expect("write");
    }
    let query = Query::builder().prefix("conf:cap:").max_results(3).build();
    let entries = store.enumerate(query).collect().await.expect("collect");
    assert_eq!(entries.len(), 3, "max_results must cap the total produced");
}

/// A tiny page hint changes fetch granularity, never the result set.
pub async fn enum_small_pages_have_no_duplicates(store: &Store) {
    for key in ["conf:sp:k1", "conf:sp:k2", "conf:sp:a3"] {
        store.write(key, "v").await.expect("write");
    }
    let query = Query::builder().prefix("conf:sp:k").page_hint(1).build();
    let entries = store.enumerate(query).collect().await.expect("collect");
    let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["conf:sp:k1", "conf:sp:k2"], "no duplicates, no omissions");
}

/// A captured cursor resumes without skipping or repeating entries.
pub async fn enum_cursor_resumes_without_skip_or_repeat(store: &Store) {
    for i in 0..6 {
        store.write(&format!("conf:cr:{i}"), "v").await.expect("write");
    }

    let query = Query::builder().prefix("conf:cr:").page_hint(2).build();
    let mut first = store.enumerate(query);
    let mut seen = Vec::new();
    for _ in 0..3 {
        seen.push(first.next().await.expect("next").expect("entry").key);
    }
    let cursor = first.cursor().cloned().expect("cursor after a yielded entry");
    drop(first);

    let resumed = Query::builder().prefix("conf:cr:").page_hint(2).cursor(cursor).build();
    let rest = store.enumerate(resumed).collect().await.expect("resume");
    seen.extend(rest.into_iter().map(|e| e.key));

    let expected: Vec<String> = (0..6).map(|i| format!("conf:cr:{i}")).collect();
    assert_eq!(seen, expected, "resume must neither skip nor repeat");
}

/// Every yielded entry carries a cursor resuming after it.
pub async fn enum_entries_carry_cursors(store: &Store) {
    store.write("conf:ec:a", "v").await.expect("write");
    let entries = store.enumerate(Query::with_prefix("conf:ec:")).collect().await.expect("collect");
    assert!(entries.iter().all(|e| e.cursor.is_some()));
}

/// A cursor from a different backend or format revision is rejected.
pub async fn enum_foreign_cursor_rejected(store: &Store) {
    let query = Query::builder()
        .prefix("conf:fc:")
        .cursor(crate::Cursor::new("zz:definitely-not-ours"))
        .build();
    let result = store.enumerate(query).next().await;
    assert!(
        matches!(result, Err(StoreError::InvalidCursor { .. })),
        "foreign cursor must be rejected, got: {result:?}"
    );
}

// ============================================================================
// Batch — slot alignment and input order
// ============================================================================

/// `write_many` then `read_many` round-trips every item in order.
pub async fn batch_write_then_read_many(store: &Store) {
    let items: Vec<(String, bytes::Bytes)> = (0..4)
        .map(|i| (format!("conf:bt:{i}"), bytes::Bytes::from(format!("v{i}"))))
        .collect();
    store.write_many(&items).await.expect("write_many");

    let keys: Vec<String> = items.iter().map(|(k, _)| k.clone()).collect();
    let values = store.read_many(&keys).await.expect("read_many");
    assert_eq!(values.len(), 4);
    for (i, value) in values.iter().enumerate() {
        assert_eq!(value.as_deref(), Some(format!("v{i}").as_bytes()));
    }
}

/// `read_many`/`info_many` mark missing keys with absent slots.
pub async fn batch_read_many_marks_absent_slots(store: &Store) {
    store.write("conf:ba:present", "v").await.expect("write");
    let keys = vec!["conf:ba:present".to_owned(), "conf:ba:missing".to_owned()];

    let values = store.read_many(&keys).await.expect("read_many");
    assert!(values[0].is_some());
    assert!(values[1].is_none());

    let infos = store.info_many(&keys).await.expect("info_many");
    assert!(infos[0].is_some());
    assert!(infos[1].is_none());
}

// ============================================================================
// Typed — structured value round-trips
// ============================================================================

/// `write_json` then `read_json` round-trips a structured value.
pub async fn typed_roundtrip(store: &Store) {
    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Marker {
        id: u32,
        label: String,
    }

    let value = Marker { id: 7, label: "seven".into() };
    store.write_json("conf:ty:rt", &value).await.expect("write_json");
    let loaded: Option<Marker> = store.read_json("conf:ty:rt").await.expect("read_json");
    assert_eq!(loaded, Some(value));
}

/// `read_json` on a missing key is absent, not an error.
pub async fn typed_missing_is_absent(store: &Store) {
    let loaded: Option<serde_json::Value> =
        store.read_json("conf:ty:missing").await.expect("read_json");
    assert!(loaded.is_none());
}

// ============================================================================
// Convenience runner
// ============================================================================

/// Runs the full conformance suite against a single store.
///
/// Each test works in its own key namespace, so the shared store does not
/// leak state between checks. For finer-grained failure reporting, call the
/// individual functions from separate `#[tokio::test]`s.
pub async fn run_all(store: &Store) {
    // CRUD
    crud_info_missing_is_absent(store).await;
    crud_read_missing_is_absent(store).await;
    crud_write_then_read_roundtrips(store).await;
    crud_write_overwrites(store).await;
    crud_delete_missing_is_noop(store).await;
    crud_delete_removes_key(store).await;
    crud_info_reports_length(store).await;

    // Enumeration
    enum_results_are_key_ordered(store).await;
    enum_prefix_filters(store).await;
    enum_blank_prefix_matches_all(store).await;
    enum_max_results_caps_output(store).await;
    enum_small_pages_have_no_duplicates(store).await;
    enum_cursor_resumes_without_skip_or_repeat(store).await;
    enum_entries_carry_cursors(store).await;
    enum_foreign_cursor_rejected(store).await;

    // Batch
    batch_write_then_read_many(store).await;
    batch_read_many_marks_absent_slots(store).await;

    // Typed
    typed_roundtrip(store).await;
    typed_missing_is_absent(store).await;
}
