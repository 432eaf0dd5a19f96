//! Journal - a correlation-scoped, append-only log of text entries.
//!
//! Each correlation id names an independent journal (a [`Scope`]). Writers
//! append text entries to one scope inside a transaction, and readers get a
//! scope's entries back in the order they were appended.
//!
//! # Architecture
//!
//! The journal sits on an embedded key-value store (SlateDB or an in-memory
//! backend for tests). Every entry is stored under a key of the form
//! `prefix/<scope>/<sequence>`, with the sequence zero-padded so that a prefix
//! scan over a scope returns its entries in sequence order.
//!
//! # Key Concepts
//!
//! - **JournalDb**: The entry point. Opens writers and implements [`JournalRead`].
//! - **ScopedWriter**: Appends entries to one scope and commits them atomically
//!   on [`finalize`](ScopedWriter::finalize).
//! - **Sequence Numbers**: Allocated per scope from leased blocks. Within one
//!   writer they increase by exactly one per append; different writers of the
//!   same scope never share a number.
//! - **JournalReader**: A read-only view for consumers without write access.
//!
//! # Example
//!
//! ```ignore
//! use journal::{Config, JournalDb, JournalRead, Scope};
//!
//! let journal = JournalDb::open(Config::default()).await?;
//!
//! let mut writer = journal.writer_for(Some("abc")).await?;
//! writer.append("hello");
//! writer.append_fmt(format_args!("{} items", 2));
//! writer.finalize().await?;
//!
//! let mut iter = journal.scan(&Scope::new("abc")?).await?;
//! while let Some(entry) = iter.next().await? {
//!     println!("seq={}: {}", entry.sequence, entry.entry.value);
//! }
//! ```

mod config;
mod error;
mod journal;
mod model;
mod reader;
mod sequence;
mod serde;
#[cfg(feature = "http-server")]
pub mod server;
mod storage;
mod writer;

pub use config::{Config, WriterConfig};
pub use error::{Error, Result};
pub use journal::JournalDb;
pub use model::{CORRELATION_ID_HEADER, Entry, JournalEntry, Scope, Sequence};
pub use reader::{EntryIterator, JournalRead, JournalReader};
pub use serde::MAX_KEY_WIDTH;
pub use writer::{FinalizeSummary, ScopedWriter};
