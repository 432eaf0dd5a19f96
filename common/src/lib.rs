//! Storage abstractions shared by the journal crates.
//!
//! The [`Storage`] trait family hides the embedded key-value engine behind a
//! narrow async interface: point reads, ordered range scans, atomic batch
//! writes, and point-in-time snapshots. [`WriteTransaction`] layers a staged,
//! all-or-nothing write set on top of it.

pub mod sequence;
pub mod storage;
pub mod util;

pub use sequence::{DeserializeError, SeqBlock};
pub use storage::config::StorageConfig;
pub use storage::txn::WriteTransaction;
pub use storage::{
    Record, Storage, StorageError, StorageIterator, StorageRead, StorageResult, StorageSnapshot,
    WriteOptions,
};
pub use util::BytesRange;
