//! Backend trait definitions.
//!
//! This module defines [`StoreBackend`], the minimal contract every backend
//! must implement, plus the two optional native-extension traits a backend
//! *may* also implement: [`BatchBackend`] (multi-key variants) and
//! [`TypedBackend`] (structured values). A backend implements zero, one, or
//! both extensions; the [`Store`](crate::Store) facade synthesizes whatever
//! is missing.
//!
//! # Design
//!
//! The minimal contract is deliberately thin — open a file, call a cloud
//! API, run a SQL statement. Everything with real invariants (option
//! binding, pagination, capability synthesis, key mapping) lives above this
//! trait and is shared by every backend.
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`info`](StoreBackend::info) | Metadata snapshot for a key, or absent |
//! | [`read`](StoreBackend::read) | Value bytes for a key, or absent |
//! | [`write`](StoreBackend::write) | Store a value, overwriting |
//! | [`delete`](StoreBackend::delete) | Remove a key; no-op when absent |
//! | [`page`](StoreBackend::page) | One ordered page of a prefix listing |
//!
//! A missing key is an explicit absent result (`Ok(None)`), never an error.

use async_trait::async_trait;
use bytes::Bytes;

use crate::{
    error::StoreResult,
    query::{Cursor, Entry, Page},
};

/// The minimal store contract implemented by every backend.
///
/// Backends are thread-safe (`Send + Sync`) thin I/O wrappers; they perform
/// no option parsing, no cursor bookkeeping beyond their own wire format,
/// and no key rewriting.
///
/// # Pagination contract
///
/// [`page`](Self::page) must satisfy the rules in
/// [`enumerate`](crate::enumerate): prefix filtering, hint-sized fetches,
/// `continuation: None` on a short page, deterministic rejection of foreign
/// cursors, and ascending key order wherever the backend has an ordered
/// index (backend-native order otherwise).
#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// Retrieves a metadata snapshot for a key.
    ///
    /// Returns `Ok(None)` when the key does not exist.
    #[must_use = "store operations may fail and errors must be handled"]
    async fn info(&self, key: &str) -> StoreResult<Option<Entry>>;

    /// Reads the value stored at a key.
    ///
    /// Returns `Ok(None)` when the key does not exist.
    #[must_use = "store operations may fail and errors must be handled"]
    async fn read(&self, key: &str) -> StoreResult<Option<Bytes>>;

    /// Stores a value, overwriting any existing value for the key.
    #[must_use = "store operations may fail and errors must be handled"]
    async fn write(&self, key: &str, value: Bytes) -> StoreResult<()>;

    /// Deletes a key. A missing key is a silent no-op.
    #[must_use = "store operations may fail and errors must be handled"]
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Fetches one page of keys starting with `prefix`.
    ///
    /// `hint` suggests the page size; `resume` continues a prior listing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidCursor`](crate::StoreError::InvalidCursor)
    /// when `resume` is malformed or foreign to this backend.
    #[must_use = "store operations may fail and errors must be handled"]
    async fn page(&self, prefix: &str, hint: usize, resume: Option<&Cursor>) -> StoreResult<Page>;
}

/// Native multi-key operations.
///
/// Implement this only when the backend has a genuinely batched path (a
/// multi-get wire call, a single SQL statement). The semantics the caller
/// observes must match the synthesized default: input order, stop at the
/// first per-item failure, no partial-success report.
#[async_trait]
pub trait BatchBackend: Send + Sync {
    /// Multi-key [`info`](StoreBackend::info); one slot per input key.
    #[must_use = "store operations may fail and errors must be handled"]
    async fn info_many(&self, keys: &[String]) -> StoreResult<Vec<Option<Entry>>>;

    /// Multi-key [`read`](StoreBackend::read); one slot per input key.
    #[must_use = "store operations may fail and errors must be handled"]
    async fn read_many(&self, keys: &[String]) -> StoreResult<Vec<Option<Bytes>>>;

    /// Multi-key [`write`](StoreBackend::write) in input order.
    #[must_use = "store operations may fail and errors must be handled"]
    async fn write_many(&self, items: &[(String, Bytes)]) -> StoreResult<()>;

    /// Multi-key [`delete`](StoreBackend::delete) in input order.
    #[must_use = "store operations may fail and errors must be handled"]
    async fn delete_many(&self, keys: &[String]) -> StoreResult<()>;
}

/// Native structured-value operations, at the JSON-value level.
///
/// Implement this when the backend stores structured data natively (e.g. a
/// relational JSON column) and can skip the byte round-trip. The
/// [`Store`](crate::Store) facade converts between `serde_json::Value` and
/// the caller's typed shape on both paths.
#[async_trait]
pub trait TypedBackend: Send + Sync {
    /// Reads the structured value stored at a key.
    ///
    /// Returns `Ok(None)` when the key does not exist.
    #[must_use = "store operations may fail and errors must be handled"]
    async fn read_value(&self, key: &str) -> StoreResult<Option<serde_json::Value>>;

    /// Stores a structured value, overwriting any existing value.
    #[must_use = "store operations may fail and errors must be handled"]
    async fn write_value(&self, key: &str, value: serde_json::Value) -> StoreResult<()>;
}
