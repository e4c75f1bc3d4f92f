//! Errors raised while saving or loading ledger snapshots.

use thiserror::Error;

/// Snapshot repository failures.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("snapshot repository lock was poisoned")]
    LockPoisoned,

    #[error("snapshot file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode ledger snapshot: {0}")]
    Serialization(String),

    #[error("snapshot is corrupted: {0}")]
    CorruptedData(String),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
