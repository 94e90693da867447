//! Pull-based enumeration over a backend's paged listing.
//!
//! [`Enumeration`] is the caller-driven side of the pagination protocol:
//! it fetches one [`Page`](crate::Page) from the backend only when its
//! buffer runs dry, yields entries one at a time, and stops as soon as the
//! backend signals end-of-data or the query's `max_results` cap is reached.
//!
//! The produced sequence is finite and lazily realized. It is restartable
//! only through an explicitly captured cursor — either the one carried by
//! each yielded [`Entry`], or [`Enumeration::cursor`] — never by re-invoking
//! from the start. Cancellation is cooperative: dropping the enumeration
//! (or the in-flight `next()` future) between entries abandons it without
//! further backend calls.
//!
//! # Example
//!
//! ```no_run
//! # use polystore_storage::{Query, Store, StoreResult};
//! # async fn example(store: &Store) -> StoreResult<()> {
//! let mut entries = store.enumerate(Query::with_prefix("user:"));
//! while let Some(entry) = entries.next().await? {
//!     println!("{} ({} bytes)", entry.key, entry.length.unwrap_or(0));
//! }
//! # Ok(())
//! # }
//! ```

use std::{collections::VecDeque, sync::Arc};

use tracing::trace;

use crate::{
    backend::StoreBackend,
    error::StoreResult,
    query::{Cursor, Entry, Query},
};

/// A lazily realized, caller-driven enumeration of store entries.
///
/// Created by [`Store::enumerate`](crate::Store::enumerate). Each call to
/// [`next`](Self::next) yields one entry, fetching a new page from the
/// backend only when needed.
pub struct Enumeration {
    backend: Arc<dyn StoreBackend>,
    prefix: String,
    hint: usize,
    /// Remaining `max_results` budget; `None` means unbounded.
    remaining: Option<usize>,
    /// Where the next page fetch resumes; `None` before the first fetch
    /// only when the query carried no cursor.
    resume: Option<Cursor>,
    buffer: VecDeque<Entry>,
    exhausted: bool,
    /// Cursor of the most recently yielded entry.
    position: Option<Cursor>,
}

impl Enumeration {
    pub(crate) fn new(backend: Arc<dyn StoreBackend>, query: &Query) -> Self {
        Self {
            backend,
            prefix: query.prefix().to_owned(),
            hint: query.page_hint(),
            remaining: query.max_results(),
            resume: query.cursor().cloned(),
            buffer: VecDeque::new(),
            exhausted: false,
            position: None,
        }
    }

    /// Yields the next entry, or `None` when the enumeration is finished.
    ///
    /// A page fetch happens only when the internal buffer is empty; reaching
    /// the `max_results` cap ends the enumeration immediately, even when the
    /// backend holds more data.
    ///
    /// # Errors
    ///
    /// Propagates backend failures and
    /// [`InvalidCursor`](crate::StoreError::InvalidCursor) unchanged. After
    /// an error the enumeration should be abandoned; resuming requires a
    /// captured cursor and a fresh query.
    pub async fn next(&mut self) -> StoreResult<Option<Entry>> {
        loop {
            if self.remaining == Some(0) {
                self.exhausted = true;
                self.buffer.clear();
                return Ok(None);
            }

            if let Some(entry) = self.buffer.pop_front() {
                if let Some(remaining) = self.remaining.as_mut() {
                    *remaining -= 1;
                }
                self.position = entry.cursor.clone();
                return Ok(Some(entry));
            }

            if self.exhausted {
                return Ok(None);
            }

            // Never fetch more than the remaining budget can use.
            let hint = match self.remaining {
                Some(remaining) => self.hint.min(remaining),
                None => self.hint,
            };
            let page = self.backend.page(&self.prefix, hint, self.resume.as_ref()).await?;
            trace!(
                prefix = %self.prefix,
                entries = page.entries.len(),
                more = page.continuation.is_some(),
                "fetched enumeration page"
            );

            self.resume = page.continuation;
            if self.resume.is_none() || page.entries.is_empty() {
                // A short or empty page is end-of-data; an empty page with a
                // continuation would otherwise loop forever.
                self.exhausted = true;
            }
            self.buffer.extend(page.entries);

            if self.buffer.is_empty() {
                return Ok(None);
            }
        }
    }

    /// The cursor resuming immediately after the most recently yielded
    /// entry, when the backend provided one.
    ///
    /// Feed it back via [`Query::builder`](crate::Query::builder)`.cursor(..)`
    /// with the same query parameters to continue where this enumeration
    /// stopped.
    #[must_use]
    pub fn cursor(&self) -> Option<&Cursor> {
        self.position.as_ref()
    }

    /// Drains the remaining entries into a vector.
    ///
    /// Convenience for tests and small listings; prefer the pull loop for
    /// large datasets.
    pub async fn collect(mut self) -> StoreResult<Vec<Entry>> {
        let mut entries = Vec::new();
        while let Some(entry) = self.next().await? {
            entries.push(entry);
        }
        Ok(entries)
    }
}

impl std::fmt::Debug for Enumeration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enumeration")
            .field("prefix", &self.prefix)
            .field("hint", &self.hint)
            .field("remaining", &self.remaining)
            .field("buffered", &self.buffer.len())
            .field("exhausted", &self.exhausted)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use async_trait::async_trait;
    use bytes::Bytes;

    use super::*;
    use crate::query::Page;

    /// A backend that always answers an empty page with a continuation —
    /// the pathological case the end-of-data guard exists for.
    struct StallingBackend;

    #[async_trait]
    impl StoreBackend for StallingBackend {
        async fn info(&self, _key: &str) -> StoreResult<Option<Entry>> {
            Ok(None)
        }

        async fn read(&self, _key: &str) -> StoreResult<Option<Bytes>> {
            Ok(None)
        }

        async fn write(&self, _key: &str, _value: Bytes) -> StoreResult<()> {
            Ok(())
        }

        async fn delete(&self, _key: &str) -> StoreResult<()> {
            Ok(())
        }

        async fn page(
            &self,
            _prefix: &str,
            _hint: usize,
            _resume: Option<&Cursor>,
        ) -> StoreResult<Page> {
            Ok(Page { entries: Vec::new(), continuation: Some(Cursor::new("v1:stall")) })
        }
    }

    #[tokio::test]
    async fn empty_page_with_continuation_still_terminates() {
        let mut e = Enumeration::new(Arc::new(StallingBackend), &Query::default());
        assert!(e.next().await.expect("next").is_none());
        assert!(e.next().await.expect("next again").is_none());
    }

    #[tokio::test]
    async fn zero_max_results_performs_no_fetch() {
        /// Panics on any page fetch.
        struct NeverBackend;

        #[async_trait]
        impl StoreBackend for NeverBackend {
            async fn info(&self, _key: &str) -> StoreResult<Option<Entry>> {
                Ok(None)
            }

            async fn read(&self, _key: &str) -> StoreResult<Option<Bytes>> {
                Ok(None)
            }

            async fn write(&self, _key: &str, _value: Bytes) -> StoreResult<()> {
                Ok(())
            }

            async fn delete(&self, _key: &str) -> StoreResult<()> {
                Ok(())
            }

            async fn page(
                &self,
                _prefix: &str,
                _hint: usize,
                _resume: Option<&Cursor>,
            ) -> StoreResult<Page> {
                panic!("max_results = 0 must not reach the backend");
            }
        }

        let query = Query::builder().max_results(0).build();
        let mut e = Enumeration::new(Arc::new(NeverBackend), &query);
        assert!(e.next().await.expect("next").is_none());
    }
}
