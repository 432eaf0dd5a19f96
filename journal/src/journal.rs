//! Core journal implementation.
//!
//! This module provides [`JournalDb`], the entry point that hands out scoped
//! writers and exposes read operations via the [`JournalRead`] trait.

use std::sync::Arc;

use async_trait::async_trait;
use common::Storage;
use common::storage::factory::create_storage;

use crate::config::{Config, WriterConfig};
use crate::error::Result;
use crate::model::Scope;
use crate::reader::{EntryIterator, JournalRead, JournalReader};
use crate::sequence::SequenceAllocator;
use crate::storage::JournalStorage;
use crate::writer::ScopedWriter;

/// The journal database.
///
/// `JournalDb` owns the storage handle and the per-scope sequence allocator.
/// It is meant to be wrapped in an `Arc` and shared; every method takes
/// `&self`.
///
/// # Example
///
/// ```ignore
/// use journal::{Config, JournalDb, JournalRead, Scope};
///
/// let journal = JournalDb::open(Config::default()).await?;
///
/// let mut writer = journal.writer(Scope::new("abc")?).await?;
/// writer.append("hello");
/// writer.append("world");
/// writer.finalize().await?;
///
/// for entry in journal.entries(&Scope::new("abc")?).await? {
///     println!("{}: {}", entry.sequence, entry.entry.value);
/// }
/// ```
pub struct JournalDb {
    storage: JournalStorage,
    allocator: SequenceAllocator,
    config: WriterConfig,
}

impl JournalDb {
    /// Opens the journal over the storage described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer settings are invalid or the storage
    /// backend cannot be initialized.
    pub async fn open(config: Config) -> Result<Self> {
        config.writer.validate()?;
        let storage = create_storage(&config.storage).await?;
        Self::new(storage, config.writer)
    }

    /// Creates a journal over an existing storage handle.
    pub fn new(storage: Arc<dyn Storage>, config: WriterConfig) -> Result<Self> {
        config.validate()?;
        let storage = JournalStorage::new(storage);
        let allocator = SequenceAllocator::new(storage.clone(), config.lease_block_size);
        Ok(Self {
            storage,
            allocator,
            config,
        })
    }

    pub fn writer_config(&self) -> &WriterConfig {
        &self.config
    }

    /// Opens a writer for `scope`.
    ///
    /// Acquires a sequence lease and opens a write transaction. Entry keys
    /// use the width the scope was first written with; the configured
    /// `key_width` only applies to scopes without entries yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the key width or the lease cannot be obtained.
    pub async fn writer(&self, scope: Scope) -> Result<ScopedWriter> {
        let key_width = self
            .storage
            .key_width(&scope, self.config.key_width)
            .await?;
        if key_width != self.config.key_width {
            tracing::debug!(
                scope = %scope,
                key_width,
                configured = self.config.key_width,
                "using recorded key width"
            );
        }
        let lease = self.allocator.acquire(&scope).await?;
        let txn = self
            .storage
            .begin_write(self.config.max_staged_entries, self.config.await_durable);
        Ok(ScopedWriter::new(scope, txn, lease, key_width))
    }

    /// Opens a writer for the scope named by a correlation id.
    ///
    /// A missing id selects the `unknown` scope.
    pub async fn writer_for(&self, correlation_id: Option<&str>) -> Result<ScopedWriter> {
        self.writer(Scope::from_correlation_id(correlation_id)?)
            .await
    }

    /// Returns a read-only view sharing this journal's storage.
    pub fn reader(&self) -> JournalReader {
        JournalReader::new(self.storage.clone())
    }

    /// Flushes and closes the storage backend.
    pub async fn close(&self) -> Result<()> {
        self.storage.inner().flush().await?;
        self.storage.inner().close().await?;
        Ok(())
    }
}

#[async_trait]
impl JournalRead for JournalDb {
    async fn scan(&self, scope: &Scope) -> Result<EntryIterator> {
        self.reader().scan(scope).await
    }
}
