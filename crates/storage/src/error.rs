//! Store error types and result alias.
//!
//! This module defines the error taxonomy shared by every store component.
//! Configuration errors ([`StoreError::InvalidConnectionString`],
//! [`StoreError::InvalidOption`]) are raised before any backend I/O is
//! attempted. [`StoreError::InvalidKey`] and [`StoreError::InvalidCursor`]
//! are raised at the point of key or cursor translation, before or instead
//! of the backend call. [`StoreError::Provider`] wraps opaque backend I/O
//! failures and is never retried, suppressed, or translated by this crate.
//!
//! A missing key is **not** an error: `info`/`read` on an absent key return
//! `Ok(None)`.
//!
//! # Example
//!
//! ```
//! use polystore_storage::{StoreError, StoreResult};
//!
//! fn check_scheme(scheme: &str) -> StoreResult<()> {
//!     if scheme.is_empty() {
//!         return Err(StoreError::invalid_connection_string("empty scheme"));
//!     }
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use thiserror::Error;

/// A boxed error type for source chain tracking.
pub type BoxError = Arc<dyn std::error::Error + Send + Sync>;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while configuring or operating a store.
///
/// This enum is the canonical error set for every component in the crate.
/// Backend implementations map their internal failures onto these variants,
/// preserving the source chain via `#[source]`.
///
/// # Non-exhaustive
///
/// New variants may be added in future minor releases without a
/// semver-breaking change. Downstream match expressions must include a
/// wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The connection string is structurally malformed.
    #[error("Invalid connection string: {message}")]
    InvalidConnectionString {
        /// Description of the structural problem.
        message: String,
    },

    /// A required option is missing, or an option value failed type coercion.
    #[error("Invalid option `{name}`: {reason}")]
    InvalidOption {
        /// The option (field) name as declared in the configuration shape.
        name: String,
        /// Why binding failed (missing, or the coercion that was attempted).
        reason: String,
    },

    /// A key cannot be mapped to or from its backend-native form.
    ///
    /// Raised when a key would escape a filesystem root boundary, or when a
    /// remote key lacks the prefix a key transform expects.
    #[error("Invalid key `{key}`: {reason}")]
    InvalidKey {
        /// The offending key.
        key: String,
        /// Why the mapping was rejected.
        reason: String,
    },

    /// A resume cursor is malformed or foreign to the backend that received it.
    #[error("Invalid cursor: {message}")]
    InvalidCursor {
        /// Description of the mismatch (e.g. unexpected version tag).
        message: String,
    },

    /// No factory is registered for the connection string's scheme.
    #[error("No store provider registered for scheme `{scheme}`")]
    UnknownScheme {
        /// The scheme that failed to resolve.
        scheme: String,
    },

    /// Serialization or deserialization of a structured value failed.
    #[error("Codec error: {message}")]
    Codec {
        /// Description of the encoding/decoding failure.
        message: String,
        /// The underlying serializer error.
        #[source]
        source: Option<BoxError>,
    },

    /// Opaque I/O failure from the underlying backend, passed through
    /// unwrapped. Retry policy, if any, is a caller or backend concern.
    #[error("Provider error: {message}")]
    Provider {
        /// Description of the backend failure.
        message: String,
        /// The underlying error that caused the failure.
        #[source]
        source: Option<BoxError>,
    },
}

impl StoreError {
    /// Creates a new `InvalidConnectionString` error.
    #[must_use]
    pub fn invalid_connection_string(message: impl Into<String>) -> Self {
        Self::InvalidConnectionString { message: message.into() }
    }

    /// Creates a new `InvalidOption` error naming the offending field.
    #[must_use]
    pub fn invalid_option(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption { name: name.into(), reason: reason.into() }
    }

    /// Creates a new `InvalidKey` error.
    #[must_use]
    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKey { key: key.into(), reason: reason.into() }
    }

    /// Creates a new `InvalidCursor` error.
    #[must_use]
    pub fn invalid_cursor(message: impl Into<String>) -> Self {
        Self::InvalidCursor { message: message.into() }
    }

    /// Creates a new `UnknownScheme` error.
    #[must_use]
    pub fn unknown_scheme(scheme: impl Into<String>) -> Self {
        Self::UnknownScheme { scheme: scheme.into() }
    }

    /// Creates a new `Codec` error with the given message.
    #[must_use]
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec { message: message.into(), source: None }
    }

    /// Creates a new `Codec` error with a message and source error.
    #[must_use]
    pub fn codec_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Codec { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a new `Provider` error with the given message.
    #[must_use]
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider { message: message.into(), source: None }
    }

    /// Creates a new `Provider` error with a message and source error.
    #[must_use]
    pub fn provider_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Provider { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Returns `true` for configuration errors that fail before any backend
    /// I/O (`InvalidConnectionString`, `InvalidOption`, `UnknownScheme`).
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::InvalidConnectionString { .. }
                | Self::InvalidOption { .. }
                | Self::UnknownScheme { .. }
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_option() {
        let err = StoreError::invalid_option("port", "expected an integer, got `abc`");
        assert_eq!(err.to_string(), "Invalid option `port`: expected an integer, got `abc`");
    }

    #[test]
    fn display_names_the_scheme() {
        let err = StoreError::unknown_scheme("s3");
        assert!(err.to_string().contains("`s3`"));
    }

    #[test]
    fn provider_preserves_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = StoreError::provider_with_source("write failed", io);
        let source = std::error::Error::source(&err).expect("source preserved");
        assert!(source.to_string().contains("denied"));
    }

    #[test]
    fn config_classification() {
        assert!(StoreError::invalid_connection_string("x").is_config());
        assert!(StoreError::invalid_option("a", "b").is_config());
        assert!(StoreError::unknown_scheme("x").is_config());
        assert!(!StoreError::provider("io").is_config());
        assert!(!StoreError::invalid_cursor("bad tag").is_config());
    }
}
