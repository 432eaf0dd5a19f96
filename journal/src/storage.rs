//! Journal-specific storage wrappers.
//!
//! [`JournalStorage`] wraps the shared storage traits with the operations the
//! journal needs: sequence block access, write transactions and snapshot
//! scans over one scope.

use std::sync::Arc;

use common::{
    Record, SeqBlock, Storage, StorageIterator, StorageRead, StorageSnapshot, WriteOptions,
    WriteTransaction,
};

use crate::error::Result;
use crate::model::{JournalEntry, Scope};
use crate::serde::{
    EntryKey, decode_entry, decode_key_width, encode_key_width, key_width_key, scan_range,
    seq_block_key,
};

/// Read-write journal storage operations.
///
/// Wraps `Arc<dyn Storage>` with journal-specific operations.
#[derive(Clone)]
pub(crate) struct JournalStorage {
    storage: Arc<dyn Storage>,
}

impl JournalStorage {
    /// Creates a new journal storage wrapper.
    pub(crate) fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Creates a new journal storage with an in-memory backend.
    #[cfg(test)]
    pub(crate) fn in_memory() -> Self {
        use common::storage::in_memory::InMemoryStorage;
        Self::new(Arc::new(InMemoryStorage::new()))
    }

    pub(crate) fn inner(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Gets the current sequence block for `scope`.
    ///
    /// Returns `None` if no block has been written yet.
    pub(crate) async fn get_seq_block(&self, scope: &Scope) -> Result<Option<SeqBlock>> {
        let record = self.storage.get(seq_block_key(scope)).await?;
        match record {
            Some(r) => Ok(Some(SeqBlock::deserialize(&r.value)?)),
            None => Ok(None),
        }
    }

    /// Durably replaces the sequence block for `scope`, provided it still
    /// holds `expected` (`None` for a scope never leased).
    ///
    /// Returns `false` without writing when another allocator got there
    /// first.
    pub(crate) async fn swap_seq_block(
        &self,
        scope: &Scope,
        expected: Option<SeqBlock>,
        block: SeqBlock,
    ) -> Result<bool> {
        let record = Record::new(seq_block_key(scope), block.serialize());
        let swapped = self
            .storage
            .put_if(
                record,
                expected.map(|prev| prev.serialize()),
                WriteOptions {
                    await_durable: true,
                },
            )
            .await?;
        Ok(swapped)
    }

    /// Returns the entry key width of `scope`.
    ///
    /// The first caller for a scope records `configured`; every later
    /// caller gets the recorded width back, whatever it has configured.
    pub(crate) async fn key_width(&self, scope: &Scope, configured: usize) -> Result<usize> {
        loop {
            if let Some(record) = self.storage.get(key_width_key(scope)).await? {
                return decode_key_width(&record.value);
            }
            let record = Record::new(key_width_key(scope), encode_key_width(configured)?);
            let recorded = self
                .storage
                .put_if(
                    record,
                    None,
                    WriteOptions {
                        await_durable: true,
                    },
                )
                .await?;
            if recorded {
                return Ok(configured);
            }
        }
    }

    /// Opens a write transaction that holds at most `max_pending` entries.
    pub(crate) fn begin_write(&self, max_pending: usize, await_durable: bool) -> WriteTransaction {
        WriteTransaction::new(Arc::clone(&self.storage), WriteOptions { await_durable })
            .with_max_pending(max_pending)
    }

    /// Opens a snapshot and scans the entries of `scope` in key order.
    pub(crate) async fn scan_scope(&self, scope: &Scope) -> Result<ScopeIterator> {
        let snapshot = self.storage.snapshot().await?;
        ScopeIterator::open(snapshot, scope).await
    }
}

/// Iterator over the entries of one scope within a snapshot.
///
/// Holds the snapshot for its whole lifetime, so entries committed after the
/// scan was opened are never returned.
pub(crate) struct ScopeIterator {
    // Keeps the snapshot alive for backends whose iterators borrow from it.
    _snapshot: Arc<dyn StorageSnapshot>,
    inner: Box<dyn StorageIterator + Send>,
    scope: Scope,
}

impl ScopeIterator {
    async fn open(snapshot: Arc<dyn StorageSnapshot>, scope: &Scope) -> Result<Self> {
        let inner = snapshot.scan_iter(scan_range(scope)).await?;
        Ok(Self {
            _snapshot: snapshot,
            inner,
            scope: scope.clone(),
        })
    }

    /// Returns the next entry, or `None` once the scope is exhausted.
    ///
    /// A value that fails to decode comes back as a placeholder entry. A key
    /// whose sequence suffix cannot be parsed is skipped.
    pub(crate) async fn next(&mut self) -> Result<Option<JournalEntry>> {
        loop {
            let Some(record) = self.inner.next().await? else {
                return Ok(None);
            };

            let key = match EntryKey::deserialize(&record.key) {
                Ok(key) => key,
                Err(e) => {
                    tracing::warn!(
                        scope = %self.scope,
                        key = %String::from_utf8_lossy(&record.key),
                        error = %e,
                        "skipping entry with malformed key"
                    );
                    continue;
                }
            };

            let entry = match decode_entry(&record.value) {
                Ok(entry) => JournalEntry::decoded(key.sequence, entry),
                Err(e) => {
                    tracing::warn!(
                        scope = %self.scope,
                        sequence = key.sequence,
                        error = %e,
                        "failed to decode entry"
                    );
                    JournalEntry::placeholder(key.sequence, e.to_string())
                }
            };
            return Ok(Some(entry));
        }
    }
}
