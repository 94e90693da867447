//! Scheme-to-factory resolution.
//!
//! [`StoreRegistry`] maps connection-string schemes to [`StoreFactory`]
//! values and turns a full connection string into a live [`Store`]. It is an
//! explicit value created at application start and passed by reference to
//! whatever needs scheme resolution — there is no process-wide default
//! registry and no hidden static initialization.
//!
//! Bundled backends are opt-in at construction:
//! `StoreRegistry::new(true)` registers the built-in factories
//! ([`MemoryFactory`](crate::MemoryFactory), [`FsFactory`](crate::FsFactory));
//! `StoreRegistry::new(false)` yields an empty registry for sandboxed or
//! test execution.
//!
//! # Example
//!
//! ```
//! use polystore_storage::StoreRegistry;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let registry = StoreRegistry::new(true);
//! let store = registry.create("memory://scratch").await.unwrap();
//! store.write("k", "v").await.unwrap();
//! # });
//! ```

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::{
    descriptor::ConnectionDescriptor,
    error::{StoreError, StoreResult},
    options::OptionSpec,
    store::Store,
};

/// Builds a live store from a full connection string.
///
/// A factory advertises the schemes it serves and the options it binds; the
/// registry hands it the original connection string untouched, and the
/// factory re-parses path and options itself.
#[async_trait]
pub trait StoreFactory: Send + Sync {
    /// The schemes this factory serves (e.g. `["file"]`).
    fn schemes(&self) -> &'static [&'static str];

    /// The options this factory binds, for discovery and help output.
    fn options(&self) -> &'static [OptionSpec];

    /// Opens a store for the given connection string.
    ///
    /// # Errors
    ///
    /// Configuration errors ([`StoreError::InvalidOption`],
    /// [`StoreError::InvalidConnectionString`]) fail before any backend I/O;
    /// anything from the backend itself surfaces as
    /// [`StoreError::Provider`].
    async fn open(&self, connection: &str) -> StoreResult<Store>;
}

/// Maps scheme names to store factories.
///
/// The map is guarded by a single exclusive lock: registration happens at
/// startup, lookups are O(1) map reads, and the lock is released before any
/// factory I/O runs.
pub struct StoreRegistry {
    factories: Mutex<HashMap<String, Arc<dyn StoreFactory>>>,
}

impl StoreRegistry {
    /// Creates a registry.
    ///
    /// `with_builtins` controls whether the bundled factories (memory, file)
    /// are registered; pass `false` for sandboxed or test execution where no
    /// backend may be reachable implicitly.
    #[must_use]
    pub fn new(with_builtins: bool) -> Self {
        let registry = Self { factories: Mutex::new(HashMap::new()) };
        if with_builtins {
            registry.register(Arc::new(crate::memory::MemoryFactory));
            registry.register(Arc::new(crate::fs::FsFactory));
        }
        registry
    }

    /// Creates an empty registry. Equivalent to `new(false)`.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(false)
    }

    /// Registers a factory for every scheme it advertises.
    ///
    /// Schemes are matched case-insensitively. Re-registering a scheme
    /// replaces the previous factory.
    pub fn register(&self, factory: Arc<dyn StoreFactory>) {
        let mut factories = self.factories.lock();
        for scheme in factory.schemes() {
            debug!(scheme, "registered store factory");
            factories.insert(scheme.to_ascii_lowercase(), Arc::clone(&factory));
        }
    }

    /// The registered schemes, sorted. Discovery helper.
    #[must_use]
    pub fn schemes(&self) -> Vec<String> {
        let mut schemes: Vec<String> = self.factories.lock().keys().cloned().collect();
        schemes.sort();
        schemes
    }

    /// The options the factory for `scheme` binds, when one is registered.
    /// Discovery helper; independent of any connection string.
    #[must_use]
    pub fn options_for(&self, scheme: &str) -> Option<&'static [OptionSpec]> {
        self.factories.lock().get(&scheme.to_ascii_lowercase()).map(|f| f.options())
    }

    /// Resolves a connection string to a live store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownScheme`] when no factory is registered
    /// for the scheme; everything else is the factory's own failure,
    /// propagated unchanged.
    pub async fn create(&self, connection: &str) -> StoreResult<Store> {
        let scheme = ConnectionDescriptor::parse(connection).scheme().to_owned();
        let factory = {
            let factories = self.factories.lock();
            factories.get(&scheme.to_ascii_lowercase()).cloned()
        };
        let factory = factory.ok_or_else(|| StoreError::unknown_scheme(scheme.clone()))?;
        debug!(scheme = %scheme, "resolved store factory");
        factory.open(connection).await
    }
}

impl std::fmt::Debug for StoreRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreRegistry").field("schemes", &self.schemes()).finish()
    }
}
