//! Serde for journal storage
//!
//! This module provides encoding and decoding for the records the journal
//! keeps in the key-value store. Keys are human-readable ASCII so that a
//! plain prefix scan over a scope returns its entries in sequence order.
//!
//! # Key Format
//!
//! ```text
//! entry:     prefix/<scope>/<sequence zero-padded to width>
//! seq block: sequence/<scope>
//! key width: keywidth/<scope>
//! ```
//!
//! Zero padding makes lexicographic order equal numeric order for every
//! sequence below `10^width`. Encoding a larger sequence is an error rather
//! than a key that would sort before its predecessors. The default width of
//! [`MAX_KEY_WIDTH`] digits holds any `u64`.
//!
//! Keys of different widths do not sort numerically against each other, so
//! the width a scope was first written with is recorded under its
//! `keywidth/` key and used for every later entry of that scope.
//!
//! # Value Format
//!
//! Entry values are JSON objects with the fields `id`, `name` and `value`.
//! Sequence block values use the binary layout of [`common::SeqBlock`].
//! Key width values are a single byte.

use bytes::Bytes;
use common::{BytesRange, DeserializeError};

use crate::error::{Error, Result};
use crate::model::{Entry, Scope, Sequence};

impl From<DeserializeError> for Error {
    fn from(err: DeserializeError) -> Self {
        Error::Encoding(err.message)
    }
}

/// Leading path segment of every entry key.
pub const ENTRY_NAMESPACE: &str = "prefix";

/// Leading path segment of every sequence block key.
pub const SEQUENCE_NAMESPACE: &str = "sequence";

/// Leading path segment of every key width record.
pub const KEY_WIDTH_NAMESPACE: &str = "keywidth";

/// Number of decimal digits in `u64::MAX`.
pub const MAX_KEY_WIDTH: usize = 20;

/// Returns `10^width`, or `None` when it exceeds `u64`.
fn width_ceiling(width: usize) -> Option<u64> {
    u32::try_from(width)
        .ok()
        .and_then(|exp| 10u64.checked_pow(exp))
}

/// Key for one journal entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryKey {
    pub scope: Scope,
    pub sequence: Sequence,
}

impl EntryKey {
    pub fn new(scope: Scope, sequence: Sequence) -> Self {
        Self { scope, sequence }
    }

    /// Encodes the key with the sequence padded to `width` digits.
    ///
    /// Fails with [`Error::SequenceOverflow`] if the sequence needs more
    /// than `width` digits.
    pub fn serialize(&self, width: usize) -> Result<Bytes> {
        if matches!(width_ceiling(width), Some(ceiling) if self.sequence >= ceiling) {
            return Err(Error::SequenceOverflow {
                sequence: self.sequence,
                width,
            });
        }
        Ok(Bytes::from(format!(
            "{}{:0width$}",
            scope_prefix_string(&self.scope),
            self.sequence,
            width = width
        )))
    }

    /// Decodes an entry key of any width.
    pub fn deserialize(key: &[u8]) -> Result<Self> {
        let key = std::str::from_utf8(key)
            .map_err(|e| Error::Encoding(format!("entry key is not utf-8: {}", e)))?;
        let rest = key
            .strip_prefix(ENTRY_NAMESPACE)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| Error::Encoding(format!("not an entry key: {:?}", key)))?;
        let (scope, suffix) = rest
            .split_once('/')
            .ok_or_else(|| Error::Encoding(format!("entry key has no sequence: {:?}", key)))?;
        let sequence = parse_sequence(suffix)
            .ok_or_else(|| Error::Encoding(format!("invalid sequence suffix: {:?}", suffix)))?;
        Ok(Self {
            scope: Scope::new(scope)?,
            sequence,
        })
    }
}

/// Parses a decimal sequence suffix. Only ASCII digits are accepted.
pub(crate) fn parse_sequence(suffix: &str) -> Option<Sequence> {
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

fn scope_prefix_string(scope: &Scope) -> String {
    format!("{}/{}/", ENTRY_NAMESPACE, scope.as_str())
}

/// Key prefix shared by all entries of `scope`, including the trailing `/`.
pub fn scope_prefix(scope: &Scope) -> Bytes {
    Bytes::from(scope_prefix_string(scope))
}

/// Range covering every entry key of `scope`.
pub fn scan_range(scope: &Scope) -> BytesRange {
    BytesRange::prefix(scope_prefix(scope))
}

/// Key of the persisted sequence block for `scope`.
pub fn seq_block_key(scope: &Scope) -> Bytes {
    Bytes::from(format!("{}/{}", SEQUENCE_NAMESPACE, scope.as_str()))
}

/// Key of the recorded entry key width for `scope`.
pub fn key_width_key(scope: &Scope) -> Bytes {
    Bytes::from(format!("{}/{}", KEY_WIDTH_NAMESPACE, scope.as_str()))
}

pub fn encode_key_width(width: usize) -> Result<Bytes> {
    match u8::try_from(width) {
        Ok(byte) if (1..=MAX_KEY_WIDTH).contains(&width) => Ok(Bytes::from(vec![byte])),
        _ => Err(Error::Encoding(format!("invalid key width: {}", width))),
    }
}

pub fn decode_key_width(value: &[u8]) -> Result<usize> {
    match value {
        [width] if (1..=MAX_KEY_WIDTH).contains(&usize::from(*width)) => Ok(usize::from(*width)),
        _ => Err(Error::Encoding(format!("invalid key width record: {:?}", value))),
    }
}

/// Encodes an entry value as JSON.
pub fn encode_entry(entry: &Entry) -> Result<Bytes> {
    serde_json::to_vec(entry)
        .map(Bytes::from)
        .map_err(|e| Error::Encoding(e.to_string()))
}

/// Decodes a JSON entry value.
pub fn decode_entry(value: &[u8]) -> Result<Entry> {
    serde_json::from_slice(value).map_err(|e| Error::Encoding(e.to_string()))
}
