//! Filesystem store backend.
//!
//! [`FsBackend`] maps keys to files under a configured root directory using
//! [`tokio::fs`]. Two key layouts are supported, selected by the
//! `pathmapped` option:
//!
//! - **flat** (default): every key is a single file name directly under the
//!   root; keys containing separators are rejected.
//! - **path-mapped**: `/`-separated keys become nested directories, created
//!   on write as needed.
//!
//! Either way, a key that would escape the root (`..` segments, absolute
//! paths, empty segments) raises
//! [`StoreError::InvalidKey`](crate::StoreError::InvalidKey) before any I/O.
//!
//! Listings walk the tree, reconstruct keys, and report them in ascending
//! key order with the same `v1:<last-key>` cursor scheme as the memory
//! backend. I/O failures surface as
//! [`StoreError::Provider`](crate::StoreError::Provider) with the source
//! preserved; this layer adds no atomicity beyond what the filesystem
//! provides.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::{debug, instrument};

use crate::{
    backend::StoreBackend,
    descriptor::ConnectionDescriptor,
    error::{StoreError, StoreResult},
    options::{bind_options, BoundOptions, OptionKind, OptionShape, OptionSpec},
    query::{Cursor, Entry, Page},
    registry::StoreFactory,
    store::Store,
};

/// Version tag on every cursor this backend mints.
const CURSOR_TAG: &str = "v1:";

/// Configuration shape for `file://` connection strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsOptions {
    /// Map `/`-separated keys to nested directories.
    pub path_mapped: bool,
    /// Create the root directory on open when it does not exist.
    pub create: bool,
}

const PATHMAPPED: OptionSpec = OptionSpec::optional("pathmapped", OptionKind::Flag, "false")
    .describe("map `/`-separated keys to nested directories");
const CREATE: OptionSpec = OptionSpec::optional("create", OptionKind::Flag, "true")
    .describe("create the root directory on open");

impl OptionShape for FsOptions {
    const SPECS: &'static [OptionSpec] = &[PATHMAPPED, CREATE];

    fn bind(options: &BoundOptions<'_>) -> StoreResult<Self> {
        Ok(Self { path_mapped: options.flag(&PATHMAPPED)?, create: options.flag(&CREATE)? })
    }
}

/// A [`StoreBackend`] rooted at a local directory.
#[derive(Debug, Clone)]
pub struct FsBackend {
    root: PathBuf,
    path_mapped: bool,
}

impl FsBackend {
    /// Opens a backend rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Provider`] when `create` is set and the root
    /// directory cannot be created.
    pub async fn open(root: impl Into<PathBuf>, options: FsOptions) -> StoreResult<Self> {
        let root = root.into();
        if options.create {
            fs::create_dir_all(&root).await.map_err(|e| {
                StoreError::provider_with_source(
                    format!("failed to create root directory {}", root.display()),
                    e,
                )
            })?;
        }
        debug!(root = %root.display(), path_mapped = options.path_mapped, "fs backend opened");
        Ok(Self { root, path_mapped: options.path_mapped })
    }

    /// The configured root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validates a key and maps it to its file path.
    fn key_to_path(&self, key: &str) -> StoreResult<PathBuf> {
        if key.is_empty() {
            return Err(StoreError::invalid_key(key, "empty key"));
        }
        if key.contains('\\') {
            return Err(StoreError::invalid_key(key, "backslash is not a valid key character"));
        }
        if !self.path_mapped && key.contains('/') {
            return Err(StoreError::invalid_key(
                key,
                "separators require the `pathmapped` option",
            ));
        }
        let mut path = self.root.clone();
        for segment in key.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(StoreError::invalid_key(key, "key would escape the root directory"));
            }
            path.push(segment);
        }
        Ok(path)
    }

    /// Walks the tree and returns every stored key, sorted ascending.
    async fn collect_keys(&self) -> StoreResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut pending = vec![self.root.clone()];
        while let Some(dir_path) = pending.pop() {
            let mut dir = match fs::read_dir(&dir_path).await {
                Ok(dir) => dir,
                // A root that was never written to is an empty store.
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(StoreError::provider_with_source(
                        format!("failed to list {}", dir_path.display()),
                        e,
                    ));
                }
            };
            while let Some(item) = dir.next_entry().await.map_err(|e| {
                StoreError::provider_with_source(
                    format!("failed to list {}", dir_path.display()),
                    e,
                )
            })? {
                let file_type = item.file_type().await.map_err(|e| {
                    StoreError::provider_with_source(
                        format!("failed to stat {}", item.path().display()),
                        e,
                    )
                })?;
                if file_type.is_dir() {
                    if self.path_mapped {
                        pending.push(item.path());
                    }
                } else if file_type.is_file() {
                    if let Some(key) = self.path_to_key(&item.path()) {
                        keys.push(key);
                    }
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    /// Reconstructs the key a file path stands for, if it is valid UTF-8.
    fn path_to_key(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let segments: Option<Vec<&str>> =
            rel.components().map(|c| c.as_os_str().to_str()).collect();
        segments.map(|segments| segments.join("/"))
    }

    /// Builds the metadata entry for a stored key.
    async fn entry_for(&self, key: &str, path: &Path) -> StoreResult<Entry> {
        let meta = fs::metadata(path).await.map_err(|e| {
            StoreError::provider_with_source(format!("failed to stat {}", path.display()), e)
        })?;
        let mut entry = Entry::new(key);
        entry.length = Some(meta.len());
        entry.created = meta.created().ok().map(DateTime::<Utc>::from);
        entry.last_modified = meta.modified().ok().map(DateTime::<Utc>::from);
        entry.cursor = Some(Cursor::tagged(CURSOR_TAG, key));
        entry.etag = entry
            .last_modified
            .map(|modified| format!("{}-{}", meta.len(), modified.timestamp_millis()));
        Ok(entry)
    }
}

#[async_trait]
impl StoreBackend for FsBackend {
    #[instrument(skip(self), fields(key = %key))]
    async fn info(&self, key: &str) -> StoreResult<Option<Entry>> {
        let path = self.key_to_path(key)?;
        match fs::metadata(&path).await {
            Ok(_) => Ok(Some(self.entry_for(key, &path).await?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::provider_with_source(
                format!("failed to stat {}", path.display()),
                e,
            )),
        }
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn read(&self, key: &str) -> StoreResult<Option<Bytes>> {
        let path = self.key_to_path(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::provider_with_source(
                format!("failed to read {}", path.display()),
                e,
            )),
        }
    }

    #[instrument(skip(self, value), fields(key = %key, size = value.len()))]
    async fn write(&self, key: &str, value: Bytes) -> StoreResult<()> {
        let path = self.key_to_path(key)?;
        if self.path_mapped {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    StoreError::provider_with_source(
                        format!("failed to create parent directories for {}", path.display()),
                        e,
                    )
                })?;
            }
        }
        fs::write(&path, &value).await.map_err(|e| {
            StoreError::provider_with_source(format!("failed to write {}", path.display()), e)
        })
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn delete(&self, key: &str) -> StoreResult<()> {
        let path = self.key_to_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::provider_with_source(
                format!("failed to delete {}", path.display()),
                e,
            )),
        }
    }

    #[instrument(skip(self), fields(prefix = %prefix, hint))]
    async fn page(&self, prefix: &str, hint: usize, resume: Option<&Cursor>) -> StoreResult<Page> {
        let after = match resume {
            Some(cursor) => Some(cursor.payload(CURSOR_TAG)?.to_owned()),
            None => None,
        };

        let keys = self.collect_keys().await?;
        let mut matching = keys
            .into_iter()
            .filter(|key| key.starts_with(prefix))
            .filter(|key| after.as_deref().map_or(true, |after| key.as_str() > after));

        let mut entries = Vec::new();
        let mut more = false;
        for key in &mut matching {
            if entries.len() == hint {
                more = true;
                break;
            }
            let path = self.key_to_path(&key)?;
            entries.push(self.entry_for(&key, &path).await?);
        }

        let continuation = if more {
            entries.last().map(|entry| Cursor::tagged(CURSOR_TAG, &entry.key))
        } else {
            None
        };
        Ok(Page { entries, continuation })
    }
}

/// Factory for `file://` connection strings.
///
/// The path segment is the root directory; see [`FsOptions`] for the
/// supported options.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsFactory;

#[async_trait]
impl StoreFactory for FsFactory {
    fn schemes(&self) -> &'static [&'static str] {
        &["file"]
    }

    fn options(&self) -> &'static [OptionSpec] {
        FsOptions::SPECS
    }

    async fn open(&self, connection: &str) -> StoreResult<Store> {
        let descriptor = ConnectionDescriptor::parse(connection);
        let root = descriptor.require_path()?.to_owned();
        let options: FsOptions = bind_options(&descriptor)?;
        let backend = FsBackend::open(root, options).await?;
        Ok(Store::new(std::sync::Arc::new(backend)))
    }
}
