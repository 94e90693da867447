//! Uniform key-value storage contract over heterogeneous backends.
//!
//! This crate provides a single connection-string-driven entry point to
//! key-value storage, whatever actually holds the data — memory, the local
//! filesystem, an object store, a relational table. The backend-specific
//! CRUD bodies are thin I/O wrappers behind [`StoreBackend`]; everything
//! with real invariants is shared:
//!
//! - **parsing and binding** of connection-string options into typed
//!   configuration ([`ConnectionDescriptor`], [`bind_options`]),
//! - **the pagination/cursor protocol** every enumeration honors
//!   ([`Query`], [`Enumeration`]),
//! - **the capability extension framework** that synthesizes batch and
//!   structured-value operations for backends without native support
//!   ([`Store`]).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Caller surface                         │
//! │     info │ read │ write │ delete │ enumerate │ batch/typed  │
//! ├─────────────────────────────────────────────────────────────┤
//! │   StoreRegistry ── scheme ──▶ StoreFactory ──▶ Store        │
//! │   (descriptor parsing, option binding, capability wiring)   │
//! ├─────────────────────────────────────────────────────────────┤
//! │              MappedBackend (optional key rewrite)           │
//! ├──────────────┬──────────────────────────────────────────────┤
//! │ MemoryBackend│  FsBackend  │  your backend (StoreBackend)   │
//! └──────────────┴──────────────────────────────────────────────┘
//! ```
//!
//! # Quick start
//!
//! ```
//! use polystore_storage::{Query, StoreRegistry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // One registry per application, built-ins opted in explicitly.
//!     let registry = StoreRegistry::new(true);
//!     let store = registry.create("memory://scratch").await?;
//!
//!     store.write("user:1", "Alice").await?;
//!
//!     let mut entries = store.enumerate(Query::with_prefix("user:"));
//!     while let Some(entry) = entries.next().await? {
//!         println!("{}", entry.key);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Implementing a backend
//!
//! 1. Implement [`StoreBackend`] (five methods; see [`MemoryBackend`] for a
//!    reference implementation).
//! 2. Optionally implement [`BatchBackend`] / [`TypedBackend`] and attach
//!    them with [`Store::with_batch`] / [`Store::with_typed`].
//! 3. Declare a configuration shape ([`OptionShape`]) and a
//!    [`StoreFactory`], and register it with the application's
//!    [`StoreRegistry`].
//! 4. Run the [`conformance`] suite against the result.
//!
//! # Error handling
//!
//! All operations return [`StoreResult<T>`]. A missing key is an explicit
//! absent result, never an error; backend I/O failures pass through as
//! [`StoreError::Provider`] unwrapped. See [`error`] for the taxonomy.
//!
//! # Feature flags
//!
//! - **`testutil`**: enables the [`testutil`] module with shared test
//!   helpers (key/value generators, store factories, assertion macros).
//!   Enable it in `[dev-dependencies]` for integration tests.

#![deny(unsafe_code)]

pub mod backend;
pub mod conformance;
pub mod descriptor;
pub mod enumerate;
pub mod error;
pub mod fs;
pub mod memory;
pub mod options;
pub mod query;
pub mod registry;
pub mod store;
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used)]
pub mod testutil;
pub mod transform;

// Re-export primary types at crate root for convenience
pub use backend::{BatchBackend, StoreBackend, TypedBackend};
pub use descriptor::ConnectionDescriptor;
pub use enumerate::Enumeration;
pub use error::{BoxError, StoreError, StoreResult};
pub use fs::{FsBackend, FsFactory, FsOptions};
pub use memory::{MemoryBackend, MemoryFactory};
pub use options::{
    bind_options, supported_options, BoundOptions, Choice, NoOptions, OptionKind, OptionShape,
    OptionSpec,
};
pub use query::{Cursor, Entry, Page, Query, DEFAULT_PAGE_HINT};
pub use registry::{StoreFactory, StoreRegistry};
pub use store::Store;
pub use transform::{KeyTransform, MappedBackend, PrefixTransform};
