//! Scoped writers.
//!
//! A [`ScopedWriter`] appends text entries to one scope. Each append takes
//! the next number from the writer's sequence lease and stages one write in
//! the writer's transaction. Nothing becomes visible to readers until
//! [`finalize`](ScopedWriter::finalize) commits the whole batch.

use std::fmt;

use common::WriteTransaction;

use crate::error::{Error, Result};
use crate::model::{Entry, Scope, Sequence};
use crate::sequence::SequenceLease;
use crate::serde::{EntryKey, encode_entry};

/// Outcome of a successful [`ScopedWriter::finalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeSummary {
    pub scope: Scope,
    /// Number of entries committed.
    pub entries: usize,
}

/// Appends entries to a single scope within one transaction.
///
/// Sequence numbers are issued in append order and increase by exactly one
/// per append, so the committed keys sort in the order the entries were
/// appended. Appends that fail are logged and skipped; they never poison
/// the writer.
///
/// Dropping a writer without finalizing discards everything it staged.
///
/// # Example
///
/// ```ignore
/// let mut writer = journal.writer(Scope::new("abc")?).await?;
/// writer.append("hello");
/// writer.append_fmt(format_args!("{} items", 3));
/// writer.finalize().await?;
/// ```
pub struct ScopedWriter {
    scope: Scope,
    txn: WriteTransaction,
    lease: SequenceLease,
    key_width: usize,
}

impl ScopedWriter {
    pub(crate) fn new(
        scope: Scope,
        txn: WriteTransaction,
        lease: SequenceLease,
        key_width: usize,
    ) -> Self {
        Self {
            scope,
            txn,
            lease,
            key_width,
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Number of entries staged so far.
    pub fn staged(&self) -> usize {
        self.txn.len()
    }

    /// Appends `text`, returning the sequence it was staged under.
    ///
    /// On failure the error is logged with the scope (and the sequence, if
    /// one was issued) and `None` is returned.
    pub fn append(&mut self, text: impl Into<String>) -> Option<Sequence> {
        let sequence = match self.lease.next() {
            Ok(sequence) => sequence,
            Err(e) => {
                tracing::error!(scope = %self.scope, error = %e, "failed to allocate sequence");
                return None;
            }
        };
        match self.stage(sequence, text.into()) {
            Ok(()) => Some(sequence),
            Err(e) => {
                tracing::error!(
                    scope = %self.scope,
                    sequence,
                    error = %e,
                    "failed to stage entry"
                );
                None
            }
        }
    }

    /// Appends a formatted entry. See [`append`](ScopedWriter::append).
    pub fn append_fmt(&mut self, args: fmt::Arguments<'_>) -> Option<Sequence> {
        self.append(args.to_string())
    }

    /// Appends `text`, returning any failure to the caller.
    ///
    /// A sequence number issued before the failure is not reused.
    pub fn try_append(&mut self, text: impl Into<String>) -> Result<Sequence> {
        let sequence = self.lease.next()?;
        self.stage(sequence, text.into())?;
        Ok(sequence)
    }

    fn stage(&mut self, sequence: Sequence, text: String) -> Result<()> {
        let key = EntryKey::new(self.scope.clone(), sequence).serialize(self.key_width)?;
        let value = encode_entry(&Entry::from_value(text))?;
        self.txn.set(key, value)?;
        Ok(())
    }

    /// Releases the lease and commits every staged entry.
    ///
    /// Both steps always run, in that order, whatever happened to earlier
    /// appends. Each failure is logged with the scope. If either step
    /// failed, the combined outcome is returned as [`Error::Finalize`].
    pub async fn finalize(mut self) -> Result<FinalizeSummary> {
        let entries = self.txn.len();

        let release = match self.lease.release().await {
            Ok(()) => None,
            Err(e) => {
                tracing::error!(scope = %self.scope, error = %e, "failed to release sequence lease");
                Some(e.to_string())
            }
        };

        let commit = match self.txn.commit().await {
            Ok(()) => None,
            Err(e) => {
                tracing::error!(
                    scope = %self.scope,
                    entries,
                    error = %e,
                    "failed to commit journal entries"
                );
                Some(e.to_string())
            }
        };

        if release.is_some() || commit.is_some() {
            return Err(Error::Finalize {
                scope: self.scope.to_string(),
                release,
                commit,
            });
        }

        tracing::debug!(scope = %self.scope, entries, "finalized scoped writer");
        Ok(FinalizeSummary {
            scope: self.scope,
            entries,
        })
    }
}
