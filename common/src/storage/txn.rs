//! Staged write transactions.

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;

use super::{Record, Storage, StorageError, StorageResult, WriteOptions};

/// Default cap on the number of distinct keys a transaction may stage.
pub const DEFAULT_MAX_PENDING: usize = 100_000;

/// A write transaction that buffers sets in memory and applies them as one
/// atomic batch on [`commit`](WriteTransaction::commit).
///
/// Nothing staged is visible to readers before commit. Dropping the
/// transaction discards the staged writes.
pub struct WriteTransaction {
    storage: Arc<dyn Storage>,
    pending: BTreeMap<Bytes, Bytes>,
    max_pending: usize,
    options: WriteOptions,
}

impl WriteTransaction {
    pub fn new(storage: Arc<dyn Storage>, options: WriteOptions) -> Self {
        Self {
            storage,
            pending: BTreeMap::new(),
            max_pending: DEFAULT_MAX_PENDING,
            options,
        }
    }

    /// Caps the number of distinct keys that may be staged.
    pub fn with_max_pending(mut self, max_pending: usize) -> Self {
        self.max_pending = max_pending;
        self
    }

    /// Stages a write of `value` under `key`. A later set of the same key
    /// replaces the earlier one.
    ///
    /// Fails with [`StorageError::InvalidWrite`] for an empty key or when the
    /// transaction is full.
    pub fn set(&mut self, key: Bytes, value: Bytes) -> StorageResult<()> {
        if key.is_empty() {
            return Err(StorageError::InvalidWrite("empty key".to_string()));
        }
        if self.pending.len() >= self.max_pending && !self.pending.contains_key(&key) {
            return Err(StorageError::InvalidWrite(format!(
                "transaction too large: {} staged writes",
                self.pending.len()
            )));
        }
        self.pending.insert(key, value);
        Ok(())
    }

    /// Number of staged writes.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Applies every staged write atomically.
    pub async fn commit(self) -> StorageResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let records = self
            .pending
            .into_iter()
            .map(|(key, value)| Record::new(key, value))
            .collect();
        self.storage.put_with_options(records, self.options).await
    }
}
