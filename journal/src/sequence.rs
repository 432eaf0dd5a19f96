//! Per-scope sequence number allocation.
//!
//! Sequence numbers are handed out in leased blocks. Acquiring a lease reads
//! the scope's persisted [`SeqBlock`], reserves the block that follows it and
//! durably writes the reservation, conditional on the block it read, before
//! any number is issued. Numbers are then issued from memory without
//! touching storage.
//!
//! Two leases for the same scope never overlap, even when they come from
//! separate journals sharing one store. A crash between acquire and release
//! loses the unissued numbers of the lease but never reissues any.

use common::SeqBlock;

use crate::error::{Error, Result};
use crate::model::{Scope, Sequence};
use crate::serde::MAX_KEY_WIDTH;
use crate::storage::JournalStorage;

/// Grants [`SequenceLease`]s over persisted per-scope counters.
///
/// Every block change is a conditional write against the block it was
/// computed from, so allocators on separate handles over one store still
/// never grant overlapping blocks.
#[derive(Clone)]
pub(crate) struct SequenceAllocator {
    storage: JournalStorage,
    block_size: u64,
}

impl SequenceAllocator {
    pub(crate) fn new(storage: JournalStorage, block_size: u64) -> Self {
        Self {
            storage,
            block_size,
        }
    }

    /// Reserves the next block of `block_size` numbers for `scope`.
    ///
    /// The block starts where the previously persisted block ended, or at 0
    /// for a scope that has never been leased. Retries when another
    /// allocator moves the block in between.
    pub(crate) async fn acquire(&self, scope: &Scope) -> Result<SequenceLease> {
        loop {
            let prev = self.storage.get_seq_block(scope).await?;
            let base = match prev {
                Some(prev) => prev.next_base().ok_or(Error::SequenceOverflow {
                    sequence: prev.base_sequence,
                    width: MAX_KEY_WIDTH,
                })?,
                None => 0,
            };
            let block = SeqBlock::new(base, self.block_size);
            let end = block.next_base().ok_or(Error::SequenceOverflow {
                sequence: base,
                width: MAX_KEY_WIDTH,
            })?;

            if !self.storage.swap_seq_block(scope, prev, block).await? {
                tracing::debug!(scope = %scope, "sequence block moved concurrently, retrying");
                continue;
            }
            tracing::debug!(scope = %scope, base, end, "acquired sequence lease");

            return Ok(SequenceLease {
                allocator: self.clone(),
                scope: scope.clone(),
                block,
                end,
                next: base,
                released: false,
            });
        }
    }

    async fn release(&self, scope: &Scope, block: SeqBlock, next: Sequence) -> Result<()> {
        let used = next - block.base_sequence;
        let shrunk = SeqBlock::new(block.base_sequence, used);
        if self.storage.swap_seq_block(scope, Some(block), shrunk).await? {
            tracing::debug!(
                scope = %scope,
                returned = block.block_size - used,
                "released sequence lease"
            );
        } else {
            // A newer lease was granted; its reservation stays untouched.
            tracing::debug!(scope = %scope, "sequence block moved on, nothing to return");
        }
        Ok(())
    }
}

/// A reserved block of sequence numbers for one scope.
///
/// Numbers are issued in increasing order, one at a time, from memory. An
/// exhausted lease fails every further request instead of silently
/// reserving another block.
pub(crate) struct SequenceLease {
    allocator: SequenceAllocator,
    scope: Scope,
    block: SeqBlock,
    end: Sequence,
    next: Sequence,
    released: bool,
}

impl SequenceLease {
    /// Number of sequence numbers this lease can still issue.
    #[cfg(test)]
    pub(crate) fn remaining(&self) -> u64 {
        if self.released {
            0
        } else {
            self.end - self.next
        }
    }

    /// Issues the next sequence number.
    pub(crate) fn next(&mut self) -> Result<Sequence> {
        if self.released {
            return Err(Error::LeaseReleased(self.scope.to_string()));
        }
        if self.next >= self.end {
            return Err(Error::LeaseExhausted {
                scope: self.scope.to_string(),
                block_size: self.block.block_size,
            });
        }
        let sequence = self.next;
        self.next += 1;
        Ok(sequence)
    }

    /// Returns unissued numbers to the scope's counter.
    ///
    /// When no newer lease has been granted for the scope, the persisted
    /// block is shrunk so the next lease starts right after the last number
    /// this lease issued. Otherwise nothing changes. Releasing twice is a
    /// no-op.
    pub(crate) async fn release(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.allocator
            .release(&self.scope, self.block, self.next)
            .await
    }
}
