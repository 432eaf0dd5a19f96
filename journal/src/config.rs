//! Configuration options for the journal.
//!
//! This module defines the configuration that controls storage setup and the
//! behaviour of scoped writers.

use common::StorageConfig;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::serde::MAX_KEY_WIDTH;

/// Configuration for opening a [`JournalDb`](crate::JournalDb).
///
/// Every field has a default, so a YAML file only needs the settings it
/// changes:
///
/// ```yaml
/// storage:
///   type: InMemory
/// writer:
///   lease_block_size: 1000
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Storage backend configuration.
    ///
    /// See [`StorageConfig`] for the in-memory and SlateDB options.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Scoped writer settings.
    #[serde(default)]
    pub writer: WriterConfig,
}

/// Settings applied to every [`ScopedWriter`](crate::ScopedWriter).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Number of sequence numbers reserved per lease.
    ///
    /// A writer issues numbers from its lease without touching storage. A
    /// writer that exhausts its lease rejects further appends.
    pub lease_block_size: u64,

    /// Number of decimal digits used for the sequence in storage keys.
    ///
    /// Keys sort in sequence order only while every sequence fits in this
    /// many digits. The default of 20 covers the whole `u64` range. Smaller
    /// widths stay readable by older deployments, and appends whose sequence
    /// does not fit are rejected rather than written out of order.
    pub key_width: usize,

    /// Maximum number of entries one writer may stage before finalizing.
    pub max_staged_entries: usize,

    /// Whether finalize waits for the commit to be durable.
    pub await_durable: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            lease_block_size: 10_000,
            key_width: MAX_KEY_WIDTH,
            max_staged_entries: 100_000,
            await_durable: false,
        }
    }
}

impl WriterConfig {
    /// Rejects settings no writer could operate with.
    pub fn validate(&self) -> Result<()> {
        if self.lease_block_size == 0 {
            return Err(Error::InvalidConfig(
                "lease_block_size must be positive".to_string(),
            ));
        }
        if self.key_width == 0 || self.key_width > MAX_KEY_WIDTH {
            return Err(Error::InvalidConfig(format!(
                "key_width must be between 1 and {}, got {}",
                MAX_KEY_WIDTH, self.key_width
            )));
        }
        if self.max_staged_entries == 0 {
            return Err(Error::InvalidConfig(
                "max_staged_entries must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
