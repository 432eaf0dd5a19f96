//! Error types for journal operations.

use common::StorageError;

use crate::model::Sequence;

/// Errors returned by journal operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The storage backend failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// A key or value could not be encoded or decoded.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The correlation id is not a valid scope.
    #[error("invalid scope: {0}")]
    InvalidScope(String),

    /// The configuration was rejected at open.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Every number in the lease has been issued.
    #[error("sequence lease for scope {scope} exhausted after {block_size} numbers")]
    LeaseExhausted { scope: String, block_size: u64 },

    /// The lease was released and can no longer issue numbers.
    #[error("sequence lease for scope {0} already released")]
    LeaseReleased(String),

    /// The sequence does not fit in the configured key width.
    #[error("sequence {sequence} does not fit in {width} key digits")]
    SequenceOverflow { sequence: Sequence, width: usize },

    /// Releasing the lease or committing the transaction failed.
    #[error(
        "finalize failed for scope {scope} (release: {}, commit: {})",
        .release.as_deref().unwrap_or("ok"),
        .commit.as_deref().unwrap_or("ok")
    )]
    Finalize {
        scope: String,
        release: Option<String>,
        commit: Option<String>,
    },
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Error::Storage(err.to_string())
    }
}

/// Result type for journal operations.
pub type Result<T> = std::result::Result<T, Error>;
