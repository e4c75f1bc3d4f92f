//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, repositories, and submission
//! checks so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use game_core::{Amount, ConfigError, LedgerError};

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("ledger worker command channel closed")]
    CommandChannelClosed,

    #[error("ledger worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("ledger worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("invalid game configuration")]
    Config(#[from] ConfigError),

    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Amount, available: Amount },

    #[error("query rejected: {0}")]
    Query(#[source] LedgerError),

    #[error("failed to encode transaction")]
    Encoding(#[source] bincode::Error),
}
