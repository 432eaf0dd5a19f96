//! Read-only journal access and the [`JournalRead`] trait.
//!
//! This module provides:
//! - [`JournalRead`]: The trait defining read operations on the journal.
//! - [`JournalReader`]: A read-only view of the journal that implements `JournalRead`.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{JournalEntry, Scope};
use crate::storage::{JournalStorage, ScopeIterator};

/// Trait for read operations on the journal.
///
/// Implemented by both [`JournalDb`](crate::JournalDb) and [`JournalReader`]
/// so that consumers can be written against either.
///
/// # Read Visibility
///
/// A scan reads from a snapshot taken when [`scan`](JournalRead::scan) is
/// called. Entries committed afterwards are never returned by that scan,
/// however long the iterator is held.
#[async_trait]
pub trait JournalRead {
    /// Scans the entries of `scope` in sequence order.
    ///
    /// A scope nobody has written to yields an empty iterator.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot or the scan cannot be opened.
    async fn scan(&self, scope: &Scope) -> Result<EntryIterator>;

    /// Collects every entry of `scope` in sequence order.
    async fn entries(&self, scope: &Scope) -> Result<Vec<JournalEntry>> {
        let mut iter = self.scan(scope).await?;
        let mut entries = Vec::new();
        while let Some(entry) = iter.next().await? {
            entries.push(entry);
        }
        Ok(entries)
    }
}

/// A read-only view of the journal.
///
/// Obtained from [`JournalDb::reader`](crate::JournalDb::reader) and shares
/// that journal's storage handle. `JournalReader` is cheap to clone and safe
/// to share across tasks.
#[derive(Clone)]
pub struct JournalReader {
    storage: JournalStorage,
}

impl JournalReader {
    pub(crate) fn new(storage: JournalStorage) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl JournalRead for JournalReader {
    async fn scan(&self, scope: &Scope) -> Result<EntryIterator> {
        let inner = self.storage.scan_scope(scope).await?;
        Ok(EntryIterator { inner })
    }
}

/// Iterator over the entries of one scope.
///
/// Entries whose stored value cannot be decoded are returned as placeholders
/// (see [`JournalEntry::decode_error`]) so that gaps stay visible.
pub struct EntryIterator {
    inner: ScopeIterator,
}

impl EntryIterator {
    /// Returns the next entry, or `None` when the scope is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage iteration fails. The scan
    /// should be abandoned after an error.
    pub async fn next(&mut self) -> Result<Option<JournalEntry>> {
        self.inner.next().await
    }
}
