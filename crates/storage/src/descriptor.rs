//! Connection descriptor parsing.
//!
//! A connection string selects a backend and configures it in one line:
//!
//! ```text
//! <scheme>://<path>?<key1>=<value1>&<key2>=<value2>
//! ```
//!
//! [`ConnectionDescriptor::parse`] splits that grammar into a scheme, a path,
//! and an option map. Parsing never fails: missing separators degrade
//! gracefully (`"memory"` parses to scheme `memory` with an empty path), and
//! structural validation is left to the callers that know what they require
//! (see [`ConnectionDescriptor::require_path`]).
//!
//! Option keys are matched case-insensitively, duplicate keys resolve
//! last-wins, and both keys and values are percent-decoded.
//!
//! # Example
//!
//! ```
//! use polystore_storage::ConnectionDescriptor;
//!
//! let d = ConnectionDescriptor::parse("file://data?pathmapped=true");
//! assert_eq!(d.scheme(), "file");
//! assert_eq!(d.path(), "data");
//! assert_eq!(d.option("PathMapped"), Some("true"));
//! ```

use std::collections::HashMap;

use crate::error::{StoreError, StoreResult};

/// The parsed form of a connection string: scheme, path, and options.
///
/// Immutable once parsed. Option keys are stored lowercased so lookups are
/// case-insensitive; for duplicate keys the last occurrence wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    scheme: String,
    path: String,
    options: HashMap<String, String>,
}

impl ConnectionDescriptor {
    /// Parses a connection string.
    ///
    /// Grammar rules:
    /// - split on the first `://`; if absent, the scheme is the whole string
    ///   and path/options are empty;
    /// - the remainder splits on the first `?`; before it is the path, after
    ///   it the option string (no `?` means no options);
    /// - options split on `&`, each fragment split once on `=` (a key with no
    ///   `=` gets an empty value); keys and values are percent-decoded.
    ///
    /// Malformed option fragments are not an error; empty fragments are
    /// ignored and a missing value defaults to the empty string.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let (scheme, rest) = match text.split_once("://") {
            Some((scheme, rest)) => (scheme.to_owned(), rest),
            None => return Self { scheme: text.to_owned(), path: String::new(), options: HashMap::new() },
        };

        let (path, option_text) = match rest.split_once('?') {
            Some((path, options)) => (path.to_owned(), Some(options)),
            None => (rest.to_owned(), None),
        };

        let mut options = HashMap::new();
        if let Some(option_text) = option_text {
            for fragment in option_text.split('&') {
                if fragment.is_empty() {
                    continue;
                }
                let (key, value) = match fragment.split_once('=') {
                    Some((key, value)) => (key, value),
                    None => (fragment, ""),
                };
                // Last occurrence wins.
                options.insert(percent_decode(key).to_ascii_lowercase(), percent_decode(value));
            }
        }

        Self { scheme, path, options }
    }

    /// The backend identifier preceding the first `://`.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The path segment between `://` and `?` (may be empty).
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the path, or an error when it is blank.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidOption`] naming `path` when the path is
    /// empty or whitespace-only.
    pub fn require_path(&self) -> StoreResult<&str> {
        if self.path.trim().is_empty() {
            return Err(StoreError::invalid_option("path", "a non-empty path is required"));
        }
        Ok(&self.path)
    }

    /// Looks up an option by name, case-insensitively.
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// All parsed options, keyed by lowercased name.
    #[must_use]
    pub fn options(&self) -> &HashMap<String, String> {
        &self.options
    }
}

/// Decodes `%XX` escapes in a connection-string fragment.
///
/// Invalid escapes (truncated, or non-hex digits) pass through literally;
/// the parser raises no errors for malformed fragments.
fn percent_decode(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let (Some(hi), Some(lo)) = (hex_val(bytes.get(i + 1)), hex_val(bytes.get(i + 2))) {
                out.push(hi * 16 + lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_val(byte: Option<&u8>) -> Option<u8> {
    match byte {
        Some(b @ b'0'..=b'9') => Some(b - b'0'),
        Some(b @ b'a'..=b'f') => Some(b - b'a' + 10),
        Some(b @ b'A'..=b'F') => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_scheme_path_and_options() {
        let d = ConnectionDescriptor::parse("file://data?pathmapped=true");
        assert_eq!(d.scheme(), "file");
        assert_eq!(d.path(), "data");
        assert_eq!(d.option("pathmapped"), Some("true"));
    }

    #[test]
    fn missing_separator_makes_the_whole_string_the_scheme() {
        let d = ConnectionDescriptor::parse("memory");
        assert_eq!(d.scheme(), "memory");
        assert_eq!(d.path(), "");
        assert!(d.options().is_empty());
    }

    #[test]
    fn splits_on_first_scheme_separator_only() {
        let d = ConnectionDescriptor::parse("wrap://inner://target");
        assert_eq!(d.scheme(), "wrap");
        assert_eq!(d.path(), "inner://target");
    }

    #[test]
    fn splits_on_first_question_mark_only() {
        let d = ConnectionDescriptor::parse("db://host/name?query=a?b");
        assert_eq!(d.path(), "host/name");
        assert_eq!(d.option("query"), Some("a?b"));
    }

    #[test]
    fn option_without_equals_gets_empty_value() {
        let d = ConnectionDescriptor::parse("db://x?flag&named=v");
        assert_eq!(d.option("flag"), Some(""));
        assert_eq!(d.option("named"), Some("v"));
    }

    #[test]
    fn duplicate_keys_last_occurrence_wins() {
        let d = ConnectionDescriptor::parse("db://x?a=first&a=second");
        assert_eq!(d.option("a"), Some("second"));
    }

    #[test]
    fn duplicate_keys_differing_in_case_still_collapse() {
        let d = ConnectionDescriptor::parse("db://x?Key=first&KEY=second");
        assert_eq!(d.option("key"), Some("second"));
    }

    #[test]
    fn option_lookup_is_case_insensitive() {
        let d = ConnectionDescriptor::parse("db://x?TimeOut=30");
        assert_eq!(d.option("timeout"), Some("30"));
        assert_eq!(d.option("TIMEOUT"), Some("30"));
    }

    #[test]
    fn keys_and_values_are_percent_decoded() {
        let d = ConnectionDescriptor::parse("db://x?na%6de=hello%20world");
        assert_eq!(d.option("name"), Some("hello world"));
    }

    #[test]
    fn invalid_percent_escapes_pass_through() {
        let d = ConnectionDescriptor::parse("db://x?k=100%&v=%zz");
        assert_eq!(d.option("k"), Some("100%"));
        assert_eq!(d.option("v"), Some("%zz"));
    }

    #[test]
    fn plus_is_not_treated_as_space() {
        let d = ConnectionDescriptor::parse("db://x?k=a+b");
        assert_eq!(d.option("k"), Some("a+b"));
    }

    #[test]
    fn empty_option_fragments_are_ignored() {
        let d = ConnectionDescriptor::parse("db://x?&&a=1&&");
        assert_eq!(d.options().len(), 1);
        assert_eq!(d.option("a"), Some("1"));
    }

    #[test]
    fn empty_option_string_yields_no_options() {
        let d = ConnectionDescriptor::parse("db://x?");
        assert!(d.options().is_empty());
    }

    #[test]
    fn require_path_rejects_blank_path() {
        let d = ConnectionDescriptor::parse("file://?a=1");
        let err = d.require_path().unwrap_err();
        assert!(matches!(err, StoreError::InvalidOption { ref name, .. } if name == "path"));
    }

    #[test]
    fn require_path_returns_the_path() {
        let d = ConnectionDescriptor::parse("file:///var/data");
        assert_eq!(d.require_path().expect("path present"), "/var/data");
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        /// Strategy for scheme-safe text (no `:`, `/`, `?`, `&`, `=`).
        fn arb_scheme() -> impl Strategy<Value = String> {
            "[a-z][a-z0-9+-]{0,15}"
        }

        /// Strategy for path text without `?`.
        fn arb_path() -> impl Strategy<Value = String> {
            "[a-zA-Z0-9_/.-]{0,32}"
        }

        proptest! {
            /// The parsed scheme is always the text preceding the first `://`.
            #[test]
            fn scheme_is_text_before_separator(scheme in arb_scheme(), path in arb_path()) {
                let text = format!("{scheme}://{path}");
                let d = ConnectionDescriptor::parse(&text);
                prop_assert_eq!(d.scheme(), scheme.as_str());
                prop_assert_eq!(d.path(), path.as_str());
            }

            /// Parsing never panics on arbitrary input.
            #[test]
            fn parse_is_total(text in ".{0,128}") {
                let _ = ConnectionDescriptor::parse(&text);
            }

            /// Percent-encoding a value and parsing it back round-trips.
            #[test]
            fn percent_roundtrip(value in "[ -~]{0,24}") {
                let encoded: String = value
                    .bytes()
                    .map(|b| format!("%{b:02X}"))
                    .collect();
                let text = format!("db://x?k={encoded}");
                let d = ConnectionDescriptor::parse(&text);
                prop_assert_eq!(d.option("k"), Some(value.as_str()));
            }
        }
    }
}
