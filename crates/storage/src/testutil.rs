//! Shared test utilities for store testing.
//!
//! This module provides common helpers for creating test stores, generating
//! test data, and asserting on [`StoreResult`] values. It is feature-gated
//! behind `testutil` to prevent leaking into production builds.
//!
//! # Usage
//!
//! In integration tests, enable the feature in `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! polystore-storage = { path = "../storage", features = ["testutil"] }
//! ```

use std::sync::Arc;

use crate::{memory::MemoryBackend, store::Store};

/// Create a deterministic test key from a prefix and index.
///
/// Produces keys like `"prefix:000042"` (zero-padded to 6 digits). The
/// zero-padding makes lexicographic ordering match numeric ordering, which
/// matters for enumeration tests.
#[must_use]
pub fn make_key(prefix: &str, idx: usize) -> String {
    format!("{prefix}:{idx:06}")
}

/// Create a test value of the given size filled with `0xAB` bytes.
#[must_use]
pub fn make_value(size: usize) -> bytes::Bytes {
    bytes::Bytes::from(vec![0xAB; size])
}

/// Create a store over a fresh [`MemoryBackend`].
#[must_use]
pub fn memory_store() -> Store {
    Store::new(Arc::new(MemoryBackend::new()))
}

/// Create a memory store pre-populated with `count` keys.
///
/// Keys are formatted as `"{prefix}:{idx:06}"` with `value_size`-byte values.
///
/// # Panics
///
/// Panics if any write fails (should not happen with `MemoryBackend`).
pub async fn populated_store(prefix: &str, count: usize, value_size: usize) -> Store {
    let store = memory_store();
    let value = make_value(value_size);
    for i in 0..count {
        store.write(&make_key(prefix, i), value.clone()).await.expect("populate write failed");
    }
    store
}

/// Assert that a [`StoreResult`](crate::StoreResult) holds the absent
/// indicator (`Ok(None)`).
#[macro_export]
macro_rules! assert_absent {
    ($result:expr) => {
        match $result {
            Ok(None) => {}
            other => panic!("expected Ok(None) for a missing key, got: {other:?}"),
        }
    };
}

/// Assert that a result is an [`InvalidOption`](crate::StoreError::InvalidOption)
/// error naming the given field.
#[macro_export]
macro_rules! assert_invalid_option {
    ($result:expr, $field:expr) => {
        match $result {
            Err($crate::StoreError::InvalidOption { ref name, .. }) if name == $field => {}
            other => {
                panic!("expected InvalidOption for field `{}`, got: {:?}", $field, other)
            }
        }
    };
}

/// Assert that a result is an [`InvalidKey`](crate::StoreError::InvalidKey) error.
#[macro_export]
macro_rules! assert_invalid_key {
    ($result:expr) => {
        assert!(
            matches!($result, Err($crate::StoreError::InvalidKey { .. })),
            "expected StoreError::InvalidKey, got: {:?}",
            $result,
        );
    };
}

/// Assert that a result is an [`InvalidCursor`](crate::StoreError::InvalidCursor) error.
#[macro_export]
macro_rules! assert_invalid_cursor {
    ($result:expr) => {
        assert!(
            matches!($result, Err($crate::StoreError::InvalidCursor { .. })),
            "expected StoreError::InvalidCursor, got: {:?}",
            $result,
        );
    };
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::{Query, StoreError, StoreResult};

    #[test]
    fn make_key_format_and_ordering() {
        assert_eq!(make_key("test", 42), "test:000042");
        assert!(make_key("k", 1) < make_key("k", 10));
        assert!(make_key("k", 10) < make_key("k", 100));
    }

    #[test]
    fn make_value_size_and_fill() {
        assert_eq!(make_value(0).len(), 0);
        assert_eq!(make_value(64).len(), 64);
        assert!(make_value(16).iter().all(|&b| b == 0xAB));
    }

    #[tokio::test]
    async fn populated_store_holds_the_requested_keys() {
        let store = populated_store("item", 5, 16).await;
        for i in 0..5 {
            let entry = store.info(&make_key("item", i)).await.expect("info");
            assert_eq!(entry.expect("present").length, Some(16));
        }
        let entries = store.enumerate(Query::default()).collect().await.expect("collect");
        assert_eq!(entries.len(), 5);
    }

    #[tokio::test]
    async fn assert_macros_match_their_variants() {
        let store = memory_store();
        assert_absent!(store.read("missing").await);

        let invalid_option: StoreResult<()> = Err(StoreError::invalid_option("port", "bad"));
        assert_invalid_option!(invalid_option, "port");

        let invalid_key: StoreResult<()> = Err(StoreError::invalid_key("../x", "escape"));
        assert_invalid_key!(invalid_key);

        let invalid_cursor: StoreResult<()> = Err(StoreError::invalid_cursor("wrong tag"));
        assert_invalid_cursor!(invalid_cursor);
    }
}
