#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use common::storage::in_memory::InMemoryStorage;
use common::{
    BytesRange, Record, Storage, StorageError, StorageIterator, StorageRead, StorageResult,
    StorageSnapshot, WriteOptions,
};

/// Storage that counts every call before delegating to an in-memory backend.
#[derive(Default)]
pub struct CountingStorage {
    inner: InMemoryStorage,
    calls: AtomicUsize,
}

impl CountingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl StorageRead for CountingStorage {
    async fn get(&self, key: Bytes) -> StorageResult<Option<Record>> {
        self.record_call();
        self.inner.get(key).await
    }

    async fn scan_iter(
        &self,
        range: BytesRange,
    ) -> StorageResult<Box<dyn StorageIterator + Send + 'static>> {
        self.record_call();
        self.inner.scan_iter(range).await
    }
}

#[async_trait]
impl Storage for CountingStorage {
    async fn put_with_options(
        &self,
        records: Vec<Record>,
        options: WriteOptions,
    ) -> StorageResult<()> {
        self.record_call();
        self.inner.put_with_options(records, options).await
    }

    async fn put_if(
        &self,
        record: Record,
        expected: Option<Bytes>,
        options: WriteOptions,
    ) -> StorageResult<bool> {
        self.record_call();
        self.inner.put_if(record, expected, options).await
    }

    async fn snapshot(&self) -> StorageResult<Arc<dyn StorageSnapshot>> {
        self.record_call();
        self.inner.snapshot().await
    }

    async fn flush(&self) -> StorageResult<()> {
        self.record_call();
        self.inner.flush().await
    }

    async fn close(&self) -> StorageResult<()> {
        self.record_call();
        self.inner.close().await
    }
}

/// Storage whose reads or writes can be switched to fail.
#[derive(Default)]
pub struct FaultyStorage {
    inner: InMemoryStorage,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

pub const INJECTED_FAILURE: &str = "injected failure: disk quota exceeded";

impl FaultyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(&self, flag: &AtomicBool) -> StorageResult<()> {
        if flag.load(Ordering::SeqCst) {
            Err(StorageError::Storage(INJECTED_FAILURE.to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl StorageRead for FaultyStorage {
    async fn get(&self, key: Bytes) -> StorageResult<Option<Record>> {
        self.check(&self.fail_reads)?;
        self.inner.get(key).await
    }

    async fn scan_iter(
        &self,
        range: BytesRange,
    ) -> StorageResult<Box<dyn StorageIterator + Send + 'static>> {
        self.check(&self.fail_reads)?;
        self.inner.scan_iter(range).await
    }
}

#[async_trait]
impl Storage for FaultyStorage {
    async fn put_with_options(
        &self,
        records: Vec<Record>,
        options: WriteOptions,
    ) -> StorageResult<()> {
        self.check(&self.fail_writes)?;
        self.inner.put_with_options(records, options).await
    }

    async fn put_if(
        &self,
        record: Record,
        expected: Option<Bytes>,
        options: WriteOptions,
    ) -> StorageResult<bool> {
        self.check(&self.fail_writes)?;
        self.inner.put_if(record, expected, options).await
    }

    async fn snapshot(&self) -> StorageResult<Arc<dyn StorageSnapshot>> {
        self.check(&self.fail_reads)?;
        self.inner.snapshot().await
    }

    async fn flush(&self) -> StorageResult<()> {
        self.inner.flush().await
    }

    async fn close(&self) -> StorageResult<()> {
        self.inner.close().await
    }
}

/// Storage whose point reads take as long as a round trip to a remote
/// object store, so that concurrent callers interleave.
#[derive(Default)]
pub struct SlowStorage {
    inner: InMemoryStorage,
}

impl SlowStorage {
    pub const READ_DELAY: Duration = Duration::from_millis(20);

    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageRead for SlowStorage {
    async fn get(&self, key: Bytes) -> StorageResult<Option<Record>> {
        tokio::time::sleep(Self::READ_DELAY).await;
        self.inner.get(key).await
    }

    async fn scan_iter(
        &self,
        range: BytesRange,
    ) -> StorageResult<Box<dyn StorageIterator + Send + 'static>> {
        self.inner.scan_iter(range).await
    }
}

#[async_trait]
impl Storage for SlowStorage {
    async fn put_with_options(
        &self,
        records: Vec<Record>,
        options: WriteOptions,
    ) -> StorageResult<()> {
        self.inner.put_with_options(records, options).await
    }

    async fn put_if(
        &self,
        record: Record,
        expected: Option<Bytes>,
        options: WriteOptions,
    ) -> StorageResult<bool> {
        self.inner.put_if(record, expected, options).await
    }

    async fn snapshot(&self) -> StorageResult<Arc<dyn StorageSnapshot>> {
        self.inner.snapshot().await
    }

    async fn flush(&self) -> StorageResult<()> {
        self.inner.flush().await
    }

    async fn close(&self) -> StorageResult<()> {
        self.inner.close().await
    }
}
