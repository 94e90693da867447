//! Pagination protocol scenarios observed through a fetch-counting backend.

#![allow(clippy::expect_used, clippy::panic)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use bytes::Bytes;
use polystore_storage::{
    testutil::make_key, Cursor, Entry, MemoryBackend, Page, Query, Store, StoreBackend,
    StoreResult,
};

/// Delegates to a memory backend and counts page fetches.
struct CountingBackend {
    inner: MemoryBackend,
    fetches: Arc<AtomicUsize>,
}

#[async_trait]
impl StoreBackend for CountingBackend {
    async fn info(&self, key: &str) -> StoreResult<Option<Entry>> {
        self.inner.info(key).await
    }

    async fn read(&self, key: &str) -> StoreResult<Option<Bytes>> {
        self.inner.read(key).await
    }

    async fn write(&self, key: &str, value: Bytes) -> StoreResult<()> {
        self.inner.write(key, value).await
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.inner.delete(key).await
    }

    async fn page(&self, prefix: &str, hint: usize, resume: Option<&Cursor>) -> StoreResult<Page> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.page(prefix, hint, resume).await
    }
}

/// A store over `count` zero-padded keys, plus the shared fetch counter.
async fn counted_store(count: usize) -> (Store, Arc<AtomicUsize>) {
    let inner = MemoryBackend::new();
    for i in 0..count {
        inner.write(&make_key("item", i), Bytes::from_static(b"v")).await.expect("populate");
    }
    let fetches = Arc::new(AtomicUsize::new(0));
    let store = Store::new(Arc::new(CountingBackend { inner, fetches: Arc::clone(&fetches) }));
    (store, fetches)
}

#[tokio::test]
async fn twenty_five_hundred_entries_take_three_fetches() {
    let (store, fetches) = counted_store(2500).await;

    let query = Query::builder().page_hint(1000).build();
    let entries = store.enumerate(query).collect().await.expect("collect");

    assert_eq!(entries.len(), 2500, "no omissions");
    let mut keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
    let before = keys.len();
    keys.dedup();
    assert_eq!(keys.len(), before, "no duplicates");
    assert_eq!(fetches.load(Ordering::SeqCst), 3, "1000 + 1000 + 500");
}

#[tokio::test]
async fn max_results_caps_exactly_and_stops_fetching() {
    let (store, fetches) = counted_store(50).await;

    let query = Query::builder().page_hint(10).max_results(25).build();
    let entries = store.enumerate(query).collect().await.expect("collect");

    assert_eq!(entries.len(), 25, "exactly max_results entries");
    // 10 + 10 + clamped 5: the budget never needs a fourth fetch.
    assert_eq!(fetches.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn pages_are_fetched_lazily() {
    let (store, fetches) = counted_store(30).await;

    let mut entries = store.enumerate(Query::builder().page_hint(10).build());
    assert_eq!(fetches.load(Ordering::SeqCst), 0, "nothing fetched before the first pull");

    for _ in 0..10 {
        entries.next().await.expect("next").expect("entry");
    }
    assert_eq!(fetches.load(Ordering::SeqCst), 1, "first page satisfies ten pulls");

    entries.next().await.expect("next").expect("entry");
    assert_eq!(fetches.load(Ordering::SeqCst), 2, "eleventh pull triggers the second page");
}

#[tokio::test]
async fn default_page_hint_is_one_thousand() {
    let (store, fetches) = counted_store(1500).await;

    let entries = store.enumerate(Query::default()).collect().await.expect("collect");
    assert_eq!(entries.len(), 1500);
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn interrupted_enumeration_resumes_from_entry_cursor() {
    let (store, _) = counted_store(40).await;

    let mut first = store.enumerate(Query::builder().page_hint(7).build());
    let mut seen = Vec::new();
    for _ in 0..17 {
        seen.push(first.next().await.expect("next").expect("entry"));
    }
    let cursor = seen.last().expect("entries").cursor.clone().expect("entry cursor");
    drop(first);

    let rest = store
        .enumerate(Query::builder().page_hint(7).cursor(cursor).build())
        .collect()
        .await
        .expect("resume");

    let mut keys: Vec<String> = seen.into_iter().map(|e| e.key).collect();
    keys.extend(rest.into_iter().map(|e| e.key));
    let expected: Vec<String> = (0..40).map(|i| make_key("item", i)).collect();
    assert_eq!(keys, expected, "interrupted + resumed covers every key exactly once");
}

#[tokio::test]
async fn enumeration_over_empty_store_is_empty() {
    let (store, fetches) = counted_store(0).await;
    let entries = store.enumerate(Query::default()).collect().await.expect("collect");
    assert!(entries.is_empty());
    assert_eq!(fetches.load(Ordering::SeqCst), 1, "one fetch discovers end-of-data");
}
