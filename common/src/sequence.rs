//! Persisted sequence block record.
//!
//! A `SeqBlock` records the most recent block of sequence numbers handed out
//! for a counter. Allocators read it, reserve the following block, and write
//! the new block back before issuing any number from it, so a crash can only
//! lose numbers, never reissue them.
//!
//! ```text
//! | version (u8) | base_sequence (u64 BE) | block_size (u64 BE) |
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};

const SEQ_BLOCK_VERSION: u8 = 0x01;
const SEQ_BLOCK_LEN: usize = 17;

/// Error raised when a stored record cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct DeserializeError {
    pub message: String,
}

/// A contiguous block `[base_sequence, base_sequence + block_size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeqBlock {
    pub base_sequence: u64,
    pub block_size: u64,
}

impl SeqBlock {
    pub fn new(base_sequence: u64, block_size: u64) -> Self {
        Self {
            base_sequence,
            block_size,
        }
    }

    /// First sequence after this block, or `None` on `u64` overflow.
    pub fn next_base(&self) -> Option<u64> {
        self.base_sequence.checked_add(self.block_size)
    }

    pub fn serialize(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(SEQ_BLOCK_LEN);
        buf.put_u8(SEQ_BLOCK_VERSION);
        buf.put_u64(self.base_sequence);
        buf.put_u64(self.block_size);
        buf.freeze()
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, DeserializeError> {
        if data.len() != SEQ_BLOCK_LEN {
            return Err(DeserializeError {
                message: format!(
                    "invalid seq block length: expected {}, got {}",
                    SEQ_BLOCK_LEN,
                    data.len()
                ),
            });
        }
        let mut buf = data;
        let version = buf.get_u8();
        if version != SEQ_BLOCK_VERSION {
            return Err(DeserializeError {
                message: format!("unsupported seq block version: 0x{:02x}", version),
            });
        }
        let base_sequence = buf.get_u64();
        let block_size = buf.get_u64();
        Ok(Self::new(base_sequence, block_size))
    }
}
