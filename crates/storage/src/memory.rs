//! In-memory store backend.
//!
//! [`MemoryBackend`] keeps entries in a [`BTreeMap`] guarded by a
//! [`parking_lot::RwLock`], which makes listings naturally key-ordered and
//! range-resumable. It is primarily intended for tests and development but
//! works anywhere persistence is not required.
//!
//! # Cloning
//!
//! `MemoryBackend` is cheaply cloneable via [`Arc`]; all clones share the
//! same underlying data.
//!
//! # Cursor format
//!
//! Listing cursors are `v1:<last-key>` — the key of the last entry already
//! yielded. Resume continues strictly after that key, so under a static
//! dataset no entry is skipped or repeated; under concurrent mutation,
//! entries ordered before the cursor position are simply not revisited.
//! Cursors without the `v1:` tag are rejected as foreign.

use std::{
    collections::BTreeMap,
    ops::Bound,
    sync::Arc,
};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::{
    backend::StoreBackend,
    descriptor::ConnectionDescriptor,
    error::StoreResult,
    options::{supported_options, NoOptions, OptionSpec},
    query::{Cursor, Entry, Page},
    registry::StoreFactory,
    store::Store,
};

/// Version tag on every cursor this backend mints.
const CURSOR_TAG: &str = "v1:";

/// One stored item plus the metadata `info`/`page` report about it.
#[derive(Debug, Clone)]
struct Stored {
    data: Bytes,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
    revision: u64,
}

#[derive(Default)]
struct State {
    entries: BTreeMap<String, Stored>,
    /// Monotone counter backing etags.
    revisions: u64,
}

/// In-memory [`StoreBackend`] over an ordered map.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<RwLock<State>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries. Test and diagnostics helper.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    /// Whether the backend holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().entries.is_empty()
    }

    fn entry_for(key: &str, stored: &Stored) -> Entry {
        let mut entry = Entry::new(key);
        entry.length = Some(stored.data.len() as u64);
        entry.created = Some(stored.created);
        entry.last_modified = Some(stored.modified);
        entry.cursor = Some(Cursor::tagged(CURSOR_TAG, key));
        entry.etag = Some(stored.revision.to_string());
        entry
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend").field("entries", &self.len()).finish()
    }
}

#[async_trait]
impl StoreBackend for MemoryBackend {
    async fn info(&self, key: &str) -> StoreResult<Option<Entry>> {
        let state = self.state.read();
        Ok(state.entries.get(key).map(|stored| Self::entry_for(key, stored)))
    }

    async fn read(&self, key: &str) -> StoreResult<Option<Bytes>> {
        let state = self.state.read();
        Ok(state.entries.get(key).map(|stored| stored.data.clone()))
    }

    async fn write(&self, key: &str, value: Bytes) -> StoreResult<()> {
        let mut state = self.state.write();
        state.revisions += 1;
        let revision = state.revisions;
        let now = Utc::now();
        state
            .entries
            .entry(key.to_owned())
            .and_modify(|stored| {
                stored.data = value.clone();
                stored.modified = now;
                stored.revision = revision;
            })
            .or_insert_with(|| Stored { data: value, created: now, modified: now, revision });
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.state.write().entries.remove(key);
        Ok(())
    }

    async fn page(&self, prefix: &str, hint: usize, resume: Option<&Cursor>) -> StoreResult<Page> {
        // Cursor translation happens before the data is touched.
        let start = match resume {
            Some(cursor) => Bound::Excluded(cursor.payload(CURSOR_TAG)?.to_owned()),
            None => Bound::Included(prefix.to_owned()),
        };

        let state = self.state.read();
        let mut entries = Vec::new();
        let mut more = false;
        for (key, stored) in state.entries.range::<String, _>((start, Bound::Unbounded)) {
            if !key.starts_with(prefix) {
                break;
            }
            if entries.len() == hint {
                more = true;
                break;
            }
            entries.push(Self::entry_for(key, stored));
        }

        let continuation = if more {
            entries.last().map(|entry| Cursor::tagged(CURSOR_TAG, &entry.key))
        } else {
            None
        };
        Ok(Page { entries, continuation })
    }
}

/// Factory for `memory://` connection strings.
///
/// Every open yields a fresh, independent, empty store; the path segment is
/// a label only. The memory backend declares no options.
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryFactory;

#[async_trait]
impl StoreFactory for MemoryFactory {
    fn schemes(&self) -> &'static [&'static str] {
        &["memory"]
    }

    fn options(&self) -> &'static [OptionSpec] {
        supported_options::<NoOptions>()
    }

    async fn open(&self, connection: &str) -> StoreResult<Store> {
        let _ = ConnectionDescriptor::parse(connection);
        Ok(Store::new(Arc::new(MemoryBackend::new())))
    }
}
