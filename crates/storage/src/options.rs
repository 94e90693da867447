//! Typed binding of connection-string options.
//!
//! A backend declares its configuration as a flat list of named fields, each
//! either required or carrying a default. The declaration is an explicit,
//! compile-time schema — an ordered slice of [`OptionSpec`] descriptors — and
//! a single generic binder ([`bind_options`]) interprets any such schema
//! against a parsed [`ConnectionDescriptor`]. No runtime reflection is
//! involved.
//!
//! The same schema doubles as discovery metadata: [`supported_options`]
//! returns the specs so callers can render help output without ever opening
//! a connection.
//!
//! # Coercion rules
//!
//! | Kind | Rule |
//! |------|------|
//! | [`OptionKind::Text`] | passthrough |
//! | [`OptionKind::Flag`] | case-insensitive `{true,1,on,yes}` / `{false,0,off,no}` |
//! | [`OptionKind::Number`] | standard textual parse for the target type |
//! | [`OptionKind::Choice`] | case-insensitive match against member names |
//!
//! Any failure — a required field with no supplied value, or a value that
//! does not coerce — raises [`StoreError::InvalidOption`] naming the field.
//!
//! # Example
//!
//! ```
//! use polystore_storage::{
//!     bind_options, BoundOptions, ConnectionDescriptor, OptionKind, OptionShape, OptionSpec,
//!     StoreResult,
//! };
//!
//! struct ServerOptions {
//!     host: String,
//!     port: u16,
//! }
//!
//! const HOST: OptionSpec = OptionSpec::required("host", OptionKind::Text);
//! const PORT: OptionSpec = OptionSpec::optional("port", OptionKind::Number, "3333");
//!
//! impl OptionShape for ServerOptions {
//!     const SPECS: &'static [OptionSpec] = &[HOST, PORT];
//!
//!     fn bind(options: &BoundOptions<'_>) -> StoreResult<Self> {
//!         Ok(Self { host: options.text(&HOST)?, port: options.number(&PORT)? })
//!     }
//! }
//!
//! let d = ConnectionDescriptor::parse("db://x?host=localhost");
//! let bound: ServerOptions = bind_options(&d).unwrap();
//! assert_eq!(bound.port, 3333);
//! ```

use std::fmt;

use crate::{
    descriptor::ConnectionDescriptor,
    error::{StoreError, StoreResult},
};

/// The declared type of a configurable field.
///
/// Used in error messages and help output; the actual coercion is selected
/// by the [`BoundOptions`] getter a shape calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// Free-form text, passed through unchanged.
    Text,
    /// Boolean with the `{true,1,on,yes}` / `{false,0,off,no}` lexicon.
    Flag,
    /// A numeric value parsed with the target type's standard parser.
    Number,
    /// One of a fixed set of member names, matched case-insensitively.
    Choice,
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Flag => write!(f, "boolean"),
            Self::Number => write!(f, "number"),
            Self::Choice => write!(f, "choice"),
        }
    }
}

/// Describes one configurable field of a backend's configuration shape.
///
/// A field is either required (no default) or optional (carries a textual
/// default that goes through the same coercion as a supplied value).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    /// Field name, matched case-insensitively against option keys.
    pub name: &'static str,
    /// Optional help text for discovery output.
    pub description: Option<&'static str>,
    /// Declared field type.
    pub kind: OptionKind,
    /// Whether a value must be supplied.
    pub required: bool,
    /// Default value in textual form; present exactly when not required.
    pub default: Option<&'static str>,
}

impl OptionSpec {
    /// Declares a required field with no default.
    #[must_use]
    pub const fn required(name: &'static str, kind: OptionKind) -> Self {
        Self { name, description: None, kind, required: true, default: None }
    }

    /// Declares an optional field with a textual default.
    ///
    /// The default is coerced through the same path as a supplied value when
    /// the option is absent from the connection string.
    #[must_use]
    pub const fn optional(name: &'static str, kind: OptionKind, default: &'static str) -> Self {
        Self { name, description: None, kind, required: false, default: Some(default) }
    }

    /// Attaches help text to the spec.
    #[must_use]
    pub const fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }
}

/// A set of member names for a [`OptionKind::Choice`] field.
///
/// Implement this for a `Copy` enum to make it bindable:
///
/// ```
/// use polystore_storage::Choice;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// enum Durability {
///     Relaxed,
///     Strict,
/// }
///
/// impl Choice for Durability {
///     const NAMES: &'static [(&'static str, Self)] =
///         &[("relaxed", Self::Relaxed), ("strict", Self::Strict)];
/// }
/// ```
pub trait Choice: Copy + 'static {
    /// Member names and their values, matched case-insensitively.
    const NAMES: &'static [(&'static str, Self)];
}

/// A configuration shape bindable from a [`ConnectionDescriptor`].
///
/// `SPECS` lists the shape's fields in declaration order; `bind` reads each
/// field through the typed [`BoundOptions`] getters in the same order.
pub trait OptionShape: Sized {
    /// The shape's fields, in declaration order.
    const SPECS: &'static [OptionSpec];

    /// Reads every field from the bound options.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidOption`] when a required field is absent
    /// or a value fails coercion.
    fn bind(options: &BoundOptions<'_>) -> StoreResult<Self>;
}

/// Binds a descriptor's options onto a configuration shape.
///
/// # Errors
///
/// Returns [`StoreError::InvalidOption`] naming the first field that is
/// required-but-absent or whose value fails coercion.
pub fn bind_options<S: OptionShape>(descriptor: &ConnectionDescriptor) -> StoreResult<S> {
    S::bind(&BoundOptions { descriptor })
}

/// Returns the option specs a shape declares, independent of any connection
/// string. Intended for discovery and help output.
#[must_use]
pub fn supported_options<S: OptionShape>() -> &'static [OptionSpec] {
    S::SPECS
}

/// Typed, coercing access to a descriptor's options during binding.
///
/// Each getter looks the field up case-insensitively, falls back to the
/// spec's default when absent, and coerces the textual value to the target
/// type. A required field with no supplied value is an error, never silently
/// defaulted.
pub struct BoundOptions<'a> {
    descriptor: &'a ConnectionDescriptor,
}

impl<'a> BoundOptions<'a> {
    /// Resolves the textual value for a spec: supplied value, else default,
    /// else an error for required fields.
    fn resolve(&self, spec: &OptionSpec) -> StoreResult<&'a str> {
        if let Some(value) = self.descriptor.option(spec.name) {
            return Ok(value);
        }
        match spec.default {
            Some(default) => Ok(default),
            None => Err(StoreError::invalid_option(spec.name, "required option was not supplied")),
        }
    }

    /// Reads a [`OptionKind::Text`] field.
    pub fn text(&self, spec: &OptionSpec) -> StoreResult<String> {
        self.resolve(spec).map(str::to_owned)
    }

    /// Reads a [`OptionKind::Flag`] field.
    ///
    /// # Errors
    ///
    /// Any literal outside the boolean lexicon is a coercion error.
    pub fn flag(&self, spec: &OptionSpec) -> StoreResult<bool> {
        let value = self.resolve(spec)?;
        const TRUE: [&str; 4] = ["true", "1", "on", "yes"];
        const FALSE: [&str; 4] = ["false", "0", "off", "no"];
        if TRUE.iter().any(|t| t.eq_ignore_ascii_case(value)) {
            Ok(true)
        } else if FALSE.iter().any(|f| f.eq_ignore_ascii_case(value)) {
            Ok(false)
        } else {
            Err(StoreError::invalid_option(
                spec.name,
                format!("expected a boolean ({{true,1,on,yes}} or {{false,0,off,no}}), got `{value}`"),
            ))
        }
    }

    /// Reads a [`OptionKind::Number`] field with the target type's standard
    /// parser (`u16`, `i64`, `f64`, ...).
    pub fn number<T>(&self, spec: &OptionSpec) -> StoreResult<T>
    where
        T: std::str::FromStr,
        T::Err: fmt::Display,
    {
        let value = self.resolve(spec)?;
        value.parse().map_err(|e: T::Err| {
            StoreError::invalid_option(
                spec.name,
                format!("expected a {} value, got `{value}`: {e}", std::any::type_name::<T>()),
            )
        })
    }

    /// Reads a [`OptionKind::Choice`] field by matching member names
    /// case-insensitively.
    pub fn choice<C: Choice>(&self, spec: &OptionSpec) -> StoreResult<C> {
        let value = self.resolve(spec)?;
        for (name, member) in C::NAMES {
            if name.eq_ignore_ascii_case(value) {
                return Ok(*member);
            }
        }
        let allowed: Vec<&str> = C::NAMES.iter().map(|(name, _)| *name).collect();
        Err(StoreError::invalid_option(
            spec.name,
            format!("expected one of [{}], got `{value}`", allowed.join(", ")),
        ))
    }
}

/// An empty configuration shape for backends with no options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoOptions;

impl OptionShape for NoOptions {
    const SPECS: &'static [OptionSpec] = &[];

    fn bind(_options: &BoundOptions<'_>) -> StoreResult<Self> {
        Ok(Self)
    }
}
