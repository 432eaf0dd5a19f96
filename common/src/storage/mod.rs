//! Storage traits and backends.
//!
//! Backends implement [`Storage`] (read-write) and hand out
//! [`StorageSnapshot`]s for consistent point-in-time reads. All writes go
//! through atomic batches; there is no partial commit.

pub mod config;
pub mod factory;
pub mod in_memory;
pub mod slate;
pub mod txn;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::BytesRange;

/// A single key/value pair as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub key: Bytes,
    pub value: Bytes,
}

impl Record {
    pub fn new(key: Bytes, value: Bytes) -> Self {
        Self { key, value }
    }
}

/// Errors returned by storage backends.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// The underlying engine failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// A write was rejected before reaching the engine.
    #[error("invalid write: {0}")]
    InvalidWrite(String),
}

impl StorageError {
    /// Wraps an engine-specific error.
    pub fn from_storage(e: impl std::fmt::Display) -> Self {
        StorageError::Storage(e.to_string())
    }
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Options applied to a batch write.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Wait for the batch to be durable before returning.
    pub await_durable: bool,
}

/// Ordered iterator over records returned by a scan.
#[async_trait]
pub trait StorageIterator {
    async fn next(&mut self) -> StorageResult<Option<Record>>;
}

/// Read operations shared by live storage and snapshots.
#[async_trait]
pub trait StorageRead: Send + Sync {
    async fn get(&self, key: Bytes) -> StorageResult<Option<Record>>;

    /// Scans records in ascending key order within `range`.
    async fn scan_iter(
        &self,
        range: BytesRange,
    ) -> StorageResult<Box<dyn StorageIterator + Send + 'static>>;
}

/// A consistent, read-only view of storage at the moment it was taken.
///
/// Writes committed after the snapshot was created are never visible through
/// it, no matter how long it is held.
#[async_trait]
pub trait StorageSnapshot: StorageRead {}

/// Read-write storage.
#[async_trait]
pub trait Storage: StorageRead {
    /// Writes all records atomically with default options.
    async fn put(&self, records: Vec<Record>) -> StorageResult<()> {
        self.put_with_options(records, WriteOptions::default())
            .await
    }

    /// Writes all records atomically: either every record becomes visible or
    /// none does.
    async fn put_with_options(
        &self,
        records: Vec<Record>,
        options: WriteOptions,
    ) -> StorageResult<()>;

    /// Writes `record` only if its key currently holds `expected`, where
    /// `None` means the key is absent.
    ///
    /// Returns `false` without writing when the current value differs. The
    /// check and the write are atomic with respect to every other `put_if`
    /// on the same backend, which makes this the primitive for counters
    /// shared by several handles.
    async fn put_if(
        &self,
        record: Record,
        expected: Option<Bytes>,
        options: WriteOptions,
    ) -> StorageResult<bool>;

    /// Opens a snapshot of the current state.
    async fn snapshot(&self) -> StorageResult<Arc<dyn StorageSnapshot>>;

    /// Flushes buffered writes to durable storage.
    async fn flush(&self) -> StorageResult<()>;

    /// Closes the backend. Further calls may fail.
    async fn close(&self) -> StorageResult<()>;
}
