//! Failure classification for submitted actions.
//!
//! Every way an action can go wrong (wallet refusal, transport trouble, a
//! ledger revert, a confirmation timeout) is mapped once, at the submission
//! boundary, onto a small stable set of [`FailureCategory`] values. Callers
//! branch on the category and code, never on message text.
use std::time::Duration;

use serde::Serialize;

use client_blockchain_core::{SubmissionError, TransportError, WalletError};
use game_core::{AccountId, ErrorCode, LedgerError};

use crate::action::ActionId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    /// The key holder declined to sign.
    UserRejected,
    WalletLocked,
    /// The sender cannot cover the attached value.
    InsufficientFunds,
    /// A read-only check said the action would be rejected; nothing was sent.
    Precondition,
    /// Included in a block but rejected by the ledger.
    Reverted,
    /// No receipt within the confirmation timeout. The transaction may still land.
    Timeout,
    Network,
    Unknown,
}

impl FailureCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserRejected => "user_rejected",
            Self::WalletLocked => "wallet_locked",
            Self::InsufficientFunds => "insufficient_funds",
            Self::Precondition => "precondition",
            Self::Reverted => "reverted",
            Self::Timeout => "timeout",
            Self::Network => "network",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of one action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{category}: {message}")]
pub struct ActionFailure {
    pub category: FailureCategory,
    /// Ledger code for reverts and denied preconditions.
    pub code: Option<ErrorCode>,
    pub message: String,
}

impl ActionFailure {
    pub fn new(category: FailureCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            code: None,
            message: message.into(),
        }
    }

    pub fn reverted(error: &LedgerError) -> Self {
        Self {
            category: FailureCategory::Reverted,
            code: Some(error.code),
            message: error.reason().to_string(),
        }
    }

    pub fn denied(code: ErrorCode) -> Self {
        Self {
            category: FailureCategory::Precondition,
            code: Some(code),
            message: code.message().to_string(),
        }
    }

    pub fn timeout(after: Duration) -> Self {
        Self::new(
            FailureCategory::Timeout,
            format!("no receipt after {}s", after.as_secs()),
        )
    }

    /// Whether resubmitting the same action unchanged could succeed.
    ///
    /// Timeouts are not retryable: the original transaction may still be
    /// included.
    pub fn is_retryable(&self) -> bool {
        match self.category {
            FailureCategory::Network => true,
            FailureCategory::Reverted | FailureCategory::Precondition => {
                self.code.is_some_and(ErrorCode::is_retryable)
            }
            _ => false,
        }
    }
}

impl From<WalletError> for ActionFailure {
    fn from(error: WalletError) -> Self {
        let category = match error {
            WalletError::Rejected => FailureCategory::UserRejected,
            WalletError::Locked => FailureCategory::WalletLocked,
        };
        Self::new(category, error.to_string())
    }
}

impl From<TransportError> for ActionFailure {
    fn from(error: TransportError) -> Self {
        match &error {
            TransportError::InsufficientFunds { .. } => {
                Self::new(FailureCategory::InsufficientFunds, error.to_string())
            }
            TransportError::NetworkError(_) | TransportError::TransactionNotFound(_) => {
                Self::new(FailureCategory::Network, error.to_string())
            }
            TransportError::Query(ledger) => Self::denied(ledger.code),
            TransportError::UnexpectedResponse(_)
            | TransportError::SerializationError(_)
            | TransportError::ConfigError(_)
            | TransportError::BackendError(_) => Self::new(FailureCategory::Unknown, error.to_string()),
        }
    }
}

impl From<SubmissionError> for ActionFailure {
    fn from(error: SubmissionError) -> Self {
        match error {
            SubmissionError::Wallet(error) => error.into(),
            SubmissionError::Transport(error) => error.into(),
        }
    }
}

/// Errors returned synchronously by the orchestrator itself.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("action {action} is still in flight for {account}")]
    ActionInFlight { account: AccountId, action: ActionId },

    #[error("no tokio runtime available to drive the action")]
    NoAsyncRuntime,
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
