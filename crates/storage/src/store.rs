//! The `Store` facade and capability extension framework.
//!
//! [`Store`] wraps a backend implementing only the minimal
//! [`StoreBackend`] contract and exposes the full surface consumed by
//! collaborators: single-key CRUD, enumeration, multi-key batch operations,
//! and structured (typed) value operations.
//!
//! # Capability extension
//!
//! Whether a backend natively provides an optional operation group is
//! decided **once, when the store is built** — never probed per call:
//!
//! - [`Store::new`] wraps the minimal contract; batch and typed operations
//!   are synthesized.
//! - [`Store::with_batch`] / [`Store::with_typed`] attach the backend's
//!   native implementations; calls then pass straight through with no
//!   double-wrapping.
//!
//! # Synthesized batch semantics
//!
//! Batch defaults operate strictly sequentially in input order. On the first
//! per-item failure the batch stops and surfaces that failure — remaining
//! items are never attempted, and no partial-success report is produced.
//! Cancellation (dropping the future) likewise stops between items. The
//! sequential strategy trades throughput for deterministic ordering and
//! unambiguous failure semantics.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use polystore_storage::{MemoryBackend, Query, Store};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let store = Store::new(Arc::new(MemoryBackend::new()));
//!
//! store.write("greeting", "hello").await.unwrap();
//! let value = store.read("greeting").await.unwrap();
//! assert_eq!(value.as_deref(), Some(b"hello".as_slice()));
//!
//! let entries = store.enumerate(Query::default()).collect().await.unwrap();
//! assert_eq!(entries.len(), 1);
//! # });
//! ```

use std::sync::Arc;

use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::{
    backend::{BatchBackend, StoreBackend, TypedBackend},
    enumerate::Enumeration,
    error::{StoreError, StoreResult},
    query::{Entry, Query},
};

/// A live store instance: one backend plus the capability extensions
/// resolved at construction time.
///
/// Cheaply cloneable; clones share the same backend.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn StoreBackend>,
    batch: Option<Arc<dyn BatchBackend>>,
    typed: Option<Arc<dyn TypedBackend>>,
}

impl Store {
    /// Wraps a minimal backend. Batch and typed operations are synthesized.
    #[must_use]
    pub fn new(backend: Arc<dyn StoreBackend>) -> Self {
        Self { backend, batch: None, typed: None }
    }

    /// Attaches the backend's native batch implementation.
    ///
    /// Batch calls pass straight through to `batch` from now on; the
    /// decision is made here, not re-probed per call.
    #[must_use]
    pub fn with_batch(mut self, batch: Arc<dyn BatchBackend>) -> Self {
        self.batch = Some(batch);
        self
    }

    /// Attaches the backend's native structured-value implementation.
    #[must_use]
    pub fn with_typed(mut self, typed: Arc<dyn TypedBackend>) -> Self {
        self.typed = Some(typed);
        self
    }

    /// Whether batch calls go to a native implementation.
    #[must_use]
    pub fn has_native_batch(&self) -> bool {
        self.batch.is_some()
    }

    /// Whether typed calls go to a native implementation.
    #[must_use]
    pub fn has_native_typed(&self) -> bool {
        self.typed.is_some()
    }

    // ------------------------------------------------------------------
    // Single-key operations
    // ------------------------------------------------------------------

    /// Retrieves a metadata snapshot for a key, or `None` when absent.
    pub async fn info(&self, key: &str) -> StoreResult<Option<Entry>> {
        self.backend.info(key).await
    }

    /// Reads the value stored at a key, or `None` when absent.
    pub async fn read(&self, key: &str) -> StoreResult<Option<Bytes>> {
        self.backend.read(key).await
    }

    /// Stores a value, overwriting any existing value for the key.
    pub async fn write(&self, key: &str, value: impl Into<Bytes>) -> StoreResult<()> {
        self.backend.write(key, value.into()).await
    }

    /// Deletes a key. A missing key is a silent no-op.
    pub async fn delete(&self, key: &str) -> StoreResult<()> {
        self.backend.delete(key).await
    }

    /// Starts a lazily realized enumeration governed by `query`.
    #[must_use]
    pub fn enumerate(&self, query: Query) -> Enumeration {
        Enumeration::new(Arc::clone(&self.backend), &query)
    }

    // ------------------------------------------------------------------
    // Batch operations
    // ------------------------------------------------------------------

    /// Multi-key [`info`](Self::info); one slot per input key.
    pub async fn info_many(&self, keys: &[String]) -> StoreResult<Vec<Option<Entry>>> {
        if let Some(batch) = &self.batch {
            return batch.info_many(keys).await;
        }
        let mut results = Vec::with_capacity(keys.len());
        for key in keys {
            results.push(self.backend.info(key).await?);
        }
        Ok(results)
    }

    /// Multi-key [`read`](Self::read); one slot per input key.
    pub async fn read_many(&self, keys: &[String]) -> StoreResult<Vec<Option<Bytes>>> {
        if let Some(batch) = &self.batch {
            return batch.read_many(keys).await;
        }
        let mut results = Vec::with_capacity(keys.len());
        for key in keys {
            results.push(self.backend.read(key).await?);
        }
        Ok(results)
    }

    /// Multi-key [`write`](Self::write) in input order.
    ///
    /// # Errors
    ///
    /// Stops at the first failing item and surfaces that failure; items
    /// after it are never attempted.
    pub async fn write_many(&self, items: &[(String, Bytes)]) -> StoreResult<()> {
        if let Some(batch) = &self.batch {
            return batch.write_many(items).await;
        }
        debug!(items = items.len(), "sequential batch write");
        for (key, value) in items {
            self.backend.write(key, value.clone()).await?;
        }
        Ok(())
    }

    /// Multi-key [`delete`](Self::delete) in input order.
    ///
    /// # Errors
    ///
    /// Stops at the first failing item and surfaces that failure; items
    /// after it are never attempted.
    pub async fn delete_many(&self, keys: &[String]) -> StoreResult<()> {
        if let Some(batch) = &self.batch {
            return batch.delete_many(keys).await;
        }
        debug!(items = keys.len(), "sequential batch delete");
        for key in keys {
            self.backend.delete(key).await?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Typed operations
    // ------------------------------------------------------------------

    /// Reads and deserializes the value stored at a key.
    ///
    /// Returns `Ok(None)` when the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Codec`] when a stored value cannot be decoded
    /// into `T`.
    pub async fn read_json<T>(&self, key: &str) -> StoreResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        if let Some(typed) = &self.typed {
            return match typed.read_value(key).await? {
                Some(value) => serde_json::from_value(value).map(Some).map_err(|e| {
                    StoreError::codec_with_source(format!("failed to decode value at `{key}`"), e)
                }),
                None => Ok(None),
            };
        }
        match self.backend.read(key).await? {
            Some(bytes) => serde_json::from_slice(&bytes).map(Some).map_err(|e| {
                StoreError::codec_with_source(format!("failed to decode value at `{key}`"), e)
            }),
            None => Ok(None),
        }
    }

    /// Serializes and stores a value at a key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Codec`] when `value` cannot be serialized.
    pub async fn write_json<T>(&self, key: &str, value: &T) -> StoreResult<()>
    where
        T: Serialize + Sync,
    {
        if let Some(typed) = &self.typed {
            let value = serde_json::to_value(value).map_err(|e| {
                StoreError::codec_with_source(format!("failed to encode value for `{key}`"), e)
            })?;
            return typed.write_value(key, value).await;
        }
        let bytes = serde_json::to_vec(value).map_err(|e| {
            StoreError::codec_with_source(format!("failed to encode value for `{key}`"), e)
        })?;
        self.backend.write(key, Bytes::from(bytes)).await
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("native_batch", &self.batch.is_some())
            .field("native_typed", &self.typed.is_some())
            .finish()
    }
}
