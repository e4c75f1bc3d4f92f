//! Per-action status stream.
//!
//! [`SessionOrchestrator::submit`](crate::SessionOrchestrator::submit) returns
//! an [`ActionHandle`] that owns a typed channel of [`ActionStatus`] updates:
//!
//! ```text
//! Pending ──► Confirming ──► Completed
//!    │            │
//!    └────────────┴────────► Failed
//! ```
//!
//! `Pending` is already queued when `submit` returns. Exactly one terminal
//! status (`Completed` or `Failed`) ends every stream.
use std::fmt;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use client_blockchain_core::{BlockInfo, TransactionId};
use game_core::{AccountId, CallKind, FightSummary};

use crate::decode::DecodedEvent;
use crate::error::{ActionFailure, FailureCategory};
use crate::refresh::RefreshScope;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(pub u64);

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionPhase {
    Pending,
    Confirming,
    Completed,
    Failed,
}

impl ActionPhase {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ActionStatus {
    Pending { action: ActionId, kind: CallKind },
    /// Included in a block, waiting for finality.
    Confirming {
        transaction_id: TransactionId,
        block: BlockInfo,
    },
    Completed(ActionOutcome),
    Failed(ActionFailure),
}

impl ActionStatus {
    pub fn phase(&self) -> ActionPhase {
        match self {
            Self::Pending { .. } => ActionPhase::Pending,
            Self::Confirming { .. } => ActionPhase::Confirming,
            Self::Completed(_) => ActionPhase::Completed,
            Self::Failed(_) => ActionPhase::Failed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase().is_terminal()
    }
}

/// Result of a completed action.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionOutcome {
    /// `None` when the action resolved without sending anything.
    pub transaction_id: Option<TransactionId>,
    pub block: Option<BlockInfo>,
    pub events: Vec<DecodedEvent>,
    /// Last fight summary among the emitted events.
    pub fight: Option<FightSummary>,
    pub refresh: RefreshScope,
    /// A continue/flee found the fight it expected already over.
    pub already_resolved: bool,
}

/// Receiving side of one action's status channel.
pub struct ActionHandle {
    id: ActionId,
    account: AccountId,
    kind: CallKind,
    statuses: mpsc::UnboundedReceiver<ActionStatus>,
}

impl ActionHandle {
    pub(crate) fn new(
        id: ActionId,
        account: AccountId,
        kind: CallKind,
        statuses: mpsc::UnboundedReceiver<ActionStatus>,
    ) -> Self {
        Self {
            id,
            account,
            kind,
            statuses,
        }
    }

    pub fn id(&self) -> ActionId {
        self.id
    }

    pub fn account(&self) -> AccountId {
        self.account
    }

    pub fn kind(&self) -> CallKind {
        self.kind
    }

    /// Next status update; `None` after the terminal status was taken.
    pub async fn next(&mut self) -> Option<ActionStatus> {
        self.statuses.recv().await
    }

    /// Every remaining status, in order, up to and including the terminal one.
    pub async fn collect(mut self) -> Vec<ActionStatus> {
        let mut statuses = Vec::new();
        while let Some(status) = self.statuses.recv().await {
            statuses.push(status);
        }
        statuses
    }

    /// Waits for the terminal status, discarding intermediate ones.
    pub async fn finish(mut self) -> Result<ActionOutcome, ActionFailure> {
        let mut last = None;
        while let Some(status) = self.statuses.recv().await {
            last = Some(status);
        }
        match last {
            Some(ActionStatus::Completed(outcome)) => Ok(outcome),
            Some(ActionStatus::Failed(failure)) => Err(failure),
            _ => Err(ActionFailure::new(
                FailureCategory::Unknown,
                "action task ended without a result",
            )),
        }
    }
}

impl fmt::Debug for ActionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionHandle")
            .field("id", &self.id)
            .field("account", &self.account)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Terminal record kept in the orchestrator's bounded history.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionRecord {
    pub id: ActionId,
    pub account: AccountId,
    pub kind: CallKind,
    pub transaction_id: Option<TransactionId>,
    pub phase: ActionPhase,
    pub failure: Option<ActionFailure>,
    pub finished_at: DateTime<Utc>,
}
