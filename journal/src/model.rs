//! Core data types for the journal.
//!
//! This module defines the scope that partitions the journal, the entry
//! payload persisted by writers, and the entry shape returned by readers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Per-scope sequence number.
///
/// Numbers are allocated from leased blocks, so within one scope they are
/// unique but not necessarily contiguous across writer sessions.
pub type Sequence = u64;

/// Header carrying the correlation id on write-side requests.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// A correlation scope: the name of one independent, ordered journal.
///
/// Scopes are never registered. A scope exists as soon as a writer or reader
/// refers to it, and scanning a scope nobody has written to yields nothing.
///
/// Valid ids are non-empty and contain neither `/` nor ASCII control
/// characters. Excluding `/` keeps the key prefixes of two scopes disjoint.
///
/// # Example
///
/// ```
/// use journal::Scope;
///
/// let scope = Scope::new("order-7f3a").unwrap();
/// assert_eq!(scope.as_str(), "order-7f3a");
/// assert!(Scope::new("a/b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Scope(String);

impl Scope {
    /// Id used when a caller supplies no correlation id.
    pub const UNKNOWN: &'static str = "unknown";

    /// Validates `id` and wraps it as a scope.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::InvalidScope("scope id is empty".to_string()));
        }
        if id.contains('/') {
            return Err(Error::InvalidScope(format!(
                "scope id {:?} contains '/'",
                id
            )));
        }
        if id.chars().any(|c| c.is_ascii_control()) {
            return Err(Error::InvalidScope(format!(
                "scope id {:?} contains control characters",
                id
            )));
        }
        Ok(Self(id))
    }

    /// The fallback scope for callers without a correlation id.
    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }

    /// Resolves the scope for a write-side caller.
    ///
    /// An absent correlation id falls back to [`Scope::unknown`]; a present
    /// one must be a valid scope id.
    pub fn from_correlation_id(correlation_id: Option<&str>) -> Result<Self> {
        match correlation_id {
            Some(id) => Self::new(id),
            None => Ok(Self::unknown()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// The payload persisted for each append.
///
/// Writers fill `value`. `id` and `name` are reserved for richer producers
/// and stay empty when written through [`ScopedWriter`](crate::ScopedWriter).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl Entry {
    /// Creates an entry carrying only a value.
    pub fn from_value(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Default::default()
        }
    }
}

/// An entry read back from the journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    /// The sequence number encoded in the entry's storage key.
    pub sequence: Sequence,

    /// The decoded entry, or a placeholder when decoding failed.
    pub entry: Entry,

    /// Why the stored value could not be decoded.
    ///
    /// When set, `entry` is a placeholder whose `value` reads
    /// `"error: <reason>"`, so the gap stays visible to callers.
    pub decode_error: Option<String>,
}

impl JournalEntry {
    pub(crate) fn decoded(sequence: Sequence, entry: Entry) -> Self {
        Self {
            sequence,
            entry,
            decode_error: None,
        }
    }

    pub(crate) fn placeholder(sequence: Sequence, reason: String) -> Self {
        Self {
            sequence,
            entry: Entry::from_value(format!("error: {}", reason)),
            decode_error: Some(reason),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.decode_error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_accept_plain_scope_ids() {
        for id in ["abc", "unknown", "9c1e-44d2", "order:42", "with space"] {
            assert_eq!(Scope::new(id).unwrap().as_str(), id);
        }
    }

    #[test]
    fn should_reject_invalid_scope_ids() {
        for id in ["", "a/b", "/", "tab\there", "nl\n"] {
            assert!(
                matches!(Scope::new(id), Err(Error::InvalidScope(_))),
                "expected {:?} to be rejected",
                id
            );
        }
    }

    #[test]
    fn should_fall_back_to_unknown_without_correlation_id() {
        // given/when
        let scope = Scope::from_correlation_id(None).unwrap();

        // then
        assert_eq!(scope, Scope::unknown());
        assert_eq!(scope.as_str(), "unknown");
    }

    #[test]
    fn should_use_present_correlation_id() {
        // given/when
        let scope = Scope::from_correlation_id(Some("req-17")).unwrap();

        // then
        assert_eq!(scope.as_str(), "req-17");
        assert!(Scope::from_correlation_id(Some("")).is_err());
    }

    #[test]
    fn should_build_placeholder_with_error_value() {
        // given/when
        let entry = JournalEntry::placeholder(3, "bad json".to_string());

        // then
        assert!(entry.is_placeholder());
        assert_eq!(entry.sequence, 3);
        assert_eq!(entry.entry.value, "error: bad json");
        assert!(entry.entry.id.is_empty());
    }
}
