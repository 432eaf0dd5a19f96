use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use bytes::Bytes;

use super::{
    Record, Storage, StorageError, StorageIterator, StorageRead, StorageResult, StorageSnapshot,
    WriteOptions,
};
use crate::BytesRange;

/// Every value a key has held, by the version that wrote it.
type History = BTreeMap<u64, Bytes>;

#[derive(Default)]
struct VersionedTree {
    version: u64,
    entries: BTreeMap<Bytes, History>,
}

impl VersionedTree {
    fn get_at(&self, key: &Bytes, version: u64) -> Option<&Bytes> {
        self.entries
            .get(key)
            .and_then(|history| history.range(..=version).next_back())
            .map(|(_, value)| value)
    }

    fn insert(&mut self, key: Bytes, value: Bytes) {
        self.entries
            .entry(key)
            .or_default()
            .insert(self.version, value);
    }
}

/// In-memory storage backed by a multi-version `BTreeMap`.
///
/// Each batch write bumps a version and records new values under it, so a
/// write costs its own records only. Snapshots pin a version and read the
/// newest value at or below it. Superseded values are never reclaimed; the
/// backend is meant for tests and short-lived processes.
#[derive(Default)]
pub struct InMemoryStorage {
    tree: Arc<RwLock<VersionedTree>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, VersionedTree>> {
        self.tree.read().map_err(|_| poisoned())
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, VersionedTree>> {
        self.tree.write().map_err(|_| poisoned())
    }

    fn current_version(&self) -> StorageResult<u64> {
        Ok(self.read()?.version)
    }
}

fn poisoned() -> StorageError {
    StorageError::Storage("in-memory storage lock poisoned".to_string())
}

#[async_trait]
impl StorageRead for InMemoryStorage {
    async fn get(&self, key: Bytes) -> StorageResult<Option<Record>> {
        let tree = self.read()?;
        let version = tree.version;
        Ok(tree
            .get_at(&key, version)
            .cloned()
            .map(|value| Record::new(key, value)))
    }

    async fn scan_iter(
        &self,
        range: BytesRange,
    ) -> StorageResult<Box<dyn StorageIterator + Send + 'static>> {
        let tree = self.read()?;
        let version = tree.version;
        Ok(Box::new(InMemoryIterator::new(&tree, version, range)))
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn put_with_options(
        &self,
        records: Vec<Record>,
        _options: WriteOptions,
    ) -> StorageResult<()> {
        let mut tree = self.write()?;
        tree.version += 1;
        for record in records {
            tree.insert(record.key, record.value);
        }
        Ok(())
    }

    async fn put_if(
        &self,
        record: Record,
        expected: Option<Bytes>,
        _options: WriteOptions,
    ) -> StorageResult<bool> {
        let mut tree = self.write()?;
        let version = tree.version;
        if tree.get_at(&record.key, version) != expected.as_ref() {
            return Ok(false);
        }
        tree.version += 1;
        tree.insert(record.key, record.value);
        Ok(true)
    }

    async fn snapshot(&self) -> StorageResult<Arc<dyn StorageSnapshot>> {
        Ok(Arc::new(InMemorySnapshot {
            tree: Arc::clone(&self.tree),
            version: self.current_version()?,
        }))
    }

    async fn flush(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        Ok(())
    }
}

/// View of an [`InMemoryStorage`] pinned at one version.
pub struct InMemorySnapshot {
    tree: Arc<RwLock<VersionedTree>>,
    version: u64,
}

#[async_trait]
impl StorageRead for InMemorySnapshot {
    async fn get(&self, key: Bytes) -> StorageResult<Option<Record>> {
        let tree = self.tree.read().map_err(|_| poisoned())?;
        Ok(tree
            .get_at(&key, self.version)
            .cloned()
            .map(|value| Record::new(key, value)))
    }

    async fn scan_iter(
        &self,
        range: BytesRange,
    ) -> StorageResult<Box<dyn StorageIterator + Send + 'static>> {
        let tree = self.tree.read().map_err(|_| poisoned())?;
        Ok(Box::new(InMemoryIterator::new(&tree, self.version, range)))
    }
}

#[async_trait]
impl StorageSnapshot for InMemorySnapshot {}

struct InMemoryIterator {
    records: std::vec::IntoIter<Record>,
}

impl InMemoryIterator {
    fn new(tree: &VersionedTree, version: u64, range: BytesRange) -> Self {
        let records: Vec<Record> = tree
            .entries
            .range(range)
            .filter_map(|(key, history)| {
                history
                    .range(..=version)
                    .next_back()
                    .map(|(_, value)| Record::new(key.clone(), value.clone()))
            })
            .collect();
        Self {
            records: records.into_iter(),
        }
    }
}

#[async_trait]
impl StorageIterator for InMemoryIterator {
    async fn next(&mut self) -> StorageResult<Option<Record>> {
        Ok(self.records.next())
    }
}
