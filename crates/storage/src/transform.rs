//! Transparent key rewriting around any backend.
//!
//! [`MappedBackend`] decorates a backend with a bidirectional key mapping:
//! every single-key operation rewrites the caller's (local) key to the
//! backend's (remote) form before delegating, and every enumeration result
//! is mapped back before it reaches the caller. Cursors pass through
//! untouched — they belong to the inner backend.
//!
//! [`PrefixTransform`] is the stock mapping: a fixed prefix added on the way
//! in and stripped on the way out. A remote key that does not carry the
//! expected prefix signals foreign or corrupt data reached through the wrong
//! mapping and raises [`StoreError::InvalidKey`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use polystore_storage::{MappedBackend, MemoryBackend, PrefixTransform, Store, StoreBackend};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let shared = Arc::new(MemoryBackend::new());
//! let scoped = Store::new(Arc::new(MappedBackend::new(
//!     shared.clone(),
//!     PrefixTransform::new("tenant-7/"),
//! )));
//!
//! scoped.write("profile", "data").await.unwrap();
//! // The shared backend sees the remote key.
//! assert!(shared.read("tenant-7/profile").await.unwrap().is_some());
//! # });
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::{
    backend::StoreBackend,
    error::{StoreError, StoreResult},
    query::{Cursor, Entry, Page},
};

/// A bidirectional key mapping.
///
/// Contract: `remote_to_local(local_to_remote(k)) == k` for every valid
/// local key `k`.
pub trait KeyTransform: Send + Sync {
    /// Maps a caller key to the backend's key space.
    fn local_to_remote(&self, key: &str) -> String;

    /// Maps a backend key back to the caller's key space.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidKey`] when the remote key is not in this
    /// transform's image (foreign data behind the mapping).
    fn remote_to_local(&self, key: &str) -> StoreResult<String>;
}

/// Fixed-prefix add/strip transform.
#[derive(Debug, Clone)]
pub struct PrefixTransform {
    prefix: String,
}

impl PrefixTransform {
    /// Creates a transform that prepends `prefix` on the way in and strips
    /// it on the way out.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    /// The configured prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl KeyTransform for PrefixTransform {
    fn local_to_remote(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }

    fn remote_to_local(&self, key: &str) -> StoreResult<String> {
        key.strip_prefix(&self.prefix).map(str::to_owned).ok_or_else(|| {
            StoreError::invalid_key(key, format!("expected the `{}` prefix", self.prefix))
        })
    }
}

/// A backend decorator applying a [`KeyTransform`] to every operation.
///
/// Composes with everything that accepts an `Arc<dyn StoreBackend>`: wrap a
/// backend before handing it to [`Store::new`](crate::Store::new) and the
/// whole store — CRUD, enumeration, synthesized batch and typed operations —
/// runs in the transformed key space.
pub struct MappedBackend<T: KeyTransform> {
    inner: Arc<dyn StoreBackend>,
    transform: T,
}

impl<T: KeyTransform> MappedBackend<T> {
    /// Wraps `inner` with the given transform.
    #[must_use]
    pub fn new(inner: Arc<dyn StoreBackend>, transform: T) -> Self {
        Self { inner, transform }
    }
}

#[async_trait]
impl<T: KeyTransform> StoreBackend for MappedBackend<T> {
    async fn info(&self, key: &str) -> StoreResult<Option<Entry>> {
        let remote = self.transform.local_to_remote(key);
        match self.inner.info(&remote).await? {
            Some(mut entry) => {
                entry.key = self.transform.remote_to_local(&entry.key)?;
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    async fn read(&self, key: &str) -> StoreResult<Option<Bytes>> {
        self.inner.read(&self.transform.local_to_remote(key)).await
    }

    async fn write(&self, key: &str, value: Bytes) -> StoreResult<()> {
        self.inner.write(&self.transform.local_to_remote(key), value).await
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.inner.delete(&self.transform.local_to_remote(key)).await
    }

    async fn page(&self, prefix: &str, hint: usize, resume: Option<&Cursor>) -> StoreResult<Page> {
        let remote_prefix = self.transform.local_to_remote(prefix);
        let mut page = self.inner.page(&remote_prefix, hint, resume).await?;
        for entry in &mut page.entries {
            entry.key = self.transform.remote_to_local(&entry.key)?;
        }
        Ok(page)
    }
}
