//! Enumeration request and result types.
//!
//! A [`Query`] describes one enumeration request: an optional key prefix, a
//! page-size hint, a cap on total results, and an optional resume [`Cursor`].
//! Backends answer one [`Page`] at a time; each [`Entry`] is a transient
//! metadata snapshot of a stored item, produced fresh per query and never
//! cached.
//!
//! # Cursors
//!
//! Cursors are opaque strings. Callers must return them unmodified to resume;
//! there is no cross-backend cursor compatibility. Backends prefix their wire
//! format with a short version tag (e.g. `v1:`) so foreign or stale cursors
//! are rejected deterministically ([`StoreError::InvalidCursor`]) rather than
//! silently misinterpreted — [`Cursor::tagged`] and [`Cursor::payload`] wrap
//! that convention.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Page-size granularity used when a query carries no hint.
pub const DEFAULT_PAGE_HINT: usize = 1000;

/// An opaque resume token for a paged enumeration.
///
/// The internal encoding is backend-specific; callers treat the value as a
/// black box and hand it back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wraps a raw wire value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw wire value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds a version-tagged cursor: `<tag><payload>`.
    ///
    /// Backends use a short tag like `"v1:"` so [`payload`](Self::payload)
    /// can reject cursors minted by a different backend or format revision.
    #[must_use]
    pub fn tagged(tag: &str, payload: &str) -> Self {
        Self(format!("{tag}{payload}"))
    }

    /// Strips the expected version tag, returning the payload.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidCursor`] when the cursor does not start
    /// with `tag` — the deterministic rejection of foreign or stale cursors.
    pub fn payload(&self, tag: &str) -> StoreResult<&str> {
        self.0.strip_prefix(tag).ok_or_else(|| {
            StoreError::invalid_cursor(format!("expected a `{tag}` cursor, got `{}`", self.0))
        })
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata snapshot of one stored item.
///
/// Entries are read-fresh data with no lifecycle beyond the call that
/// produced them: holding an `Entry` does not pin, lock, or watch the
/// underlying item. Every field except the key is best-effort — backends
/// fill what they can observe cheaply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// The item's key, in the caller's (local) key space.
    pub key: String,
    /// Value length in bytes, when the backend exposes it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
    /// Creation timestamp, when the backend tracks it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    /// Last-modification timestamp, when the backend tracks it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    /// Cursor resuming enumeration immediately after this entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Cursor>,
    /// Backend-specific change tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Additional backend-specific metadata.
    #[serde(default, skip_serializing_if = "std::collections::HashMap::is_empty")]
    pub extra: std::collections::HashMap<String, String>,
}

impl Entry {
    /// Creates an entry with only the key populated.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            length: None,
            created: None,
            last_modified: None,
            cursor: None,
            etag: None,
            extra: std::collections::HashMap::new(),
        }
    }
}

/// One backend fetch: a run of entries plus the continuation state.
///
/// `continuation: None` signals end-of-data; backends must return `None`
/// whenever a page comes back smaller than the requested hint.
#[derive(Debug, Clone)]
pub struct Page {
    /// Entries in this page, in the backend's result order.
    pub entries: Vec<Entry>,
    /// Cursor resuming after the last entry, or `None` at end-of-data.
    pub continuation: Option<Cursor>,
}

impl Page {
    /// An empty terminal page.
    #[must_use]
    pub fn empty() -> Self {
        Self { entries: Vec::new(), continuation: None }
    }
}

/// Describes one enumeration request.
///
/// Immutable; the empty query ([`Query::default`]) matches everything. Use
/// the builder for anything else:
///
/// ```
/// use polystore_storage::Query;
///
/// let query = Query::builder().prefix("user:").max_results(100).build();
/// assert_eq!(query.prefix(), "user:");
/// assert_eq!(query.max_results(), Some(100));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    prefix: Option<String>,
    page_hint: Option<usize>,
    max_results: Option<usize>,
    cursor: Option<Cursor>,
}

#[bon::bon]
impl Query {
    /// Builds an enumeration request.
    #[builder]
    pub fn new(
        /// Restrict results to keys starting with this prefix.
        #[builder(into)]
        prefix: Option<String>,
        /// Suggested backend fetch granularity; a hint, not a guarantee.
        page_hint: Option<usize>,
        /// Cap on the total number of entries produced across the call.
        max_results: Option<usize>,
        /// Resume a previously interrupted enumeration.
        cursor: Option<Cursor>,
    ) -> Self {
        Self { prefix, page_hint, max_results, cursor }
    }

    /// Convenience for the common prefix-only query.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: Some(prefix.into()), ..Self::default() }
    }

    /// The effective prefix; an absent or blank prefix matches everything.
    #[must_use]
    pub fn prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or("")
    }

    /// The effective page hint. An unset (or zero) hint resolves to
    /// [`DEFAULT_PAGE_HINT`].
    #[must_use]
    pub fn page_hint(&self) -> usize {
        match self.page_hint {
            Some(hint) if hint > 0 => hint,
            _ => DEFAULT_PAGE_HINT,
        }
    }

    /// The total-results cap, if any.
    #[must_use]
    pub fn max_results(&self) -> Option<usize> {
        self.max_results
    }

    /// The resume cursor, if any.
    #[must_use]
    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }
}
