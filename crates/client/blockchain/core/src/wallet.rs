//! Key-holding wallet that answers without a human in the loop.

use std::sync::atomic::{AtomicU8, Ordering};

use async_trait::async_trait;
use game_core::AccountId;
use tracing::debug;

use crate::traits::{Wallet, WalletError};
use crate::types::TransactionData;

/// How a [`LocalWallet`] answers approval requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ApprovalPolicy {
    Approve = 0,
    Reject = 1,
    Locked = 2,
}

impl ApprovalPolicy {
    fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Reject,
            2 => Self::Locked,
            _ => Self::Approve,
        }
    }
}

/// Wallet for a locally controlled account.
#[derive(Debug)]
pub struct LocalWallet {
    account: AccountId,
    policy: AtomicU8,
}

impl LocalWallet {
    pub fn new(account: AccountId) -> Self {
        Self {
            account,
            policy: AtomicU8::new(ApprovalPolicy::Approve as u8),
        }
    }

    pub fn set_policy(&self, policy: ApprovalPolicy) {
        self.policy.store(policy as u8, Ordering::Relaxed);
    }

    pub fn policy(&self) -> ApprovalPolicy {
        ApprovalPolicy::from_raw(self.policy.load(Ordering::Relaxed))
    }
}

#[async_trait]
impl Wallet for LocalWallet {
    fn account(&self) -> AccountId {
        self.account
    }

    async fn authorize(&self, tx: &TransactionData) -> Result<(), WalletError> {
        let decision = match self.policy() {
            ApprovalPolicy::Approve => Ok(()),
            ApprovalPolicy::Reject => Err(WalletError::Rejected),
            ApprovalPolicy::Locked => Err(WalletError::Locked),
        };
        debug!(account = %self.account, call = %tx.call.kind(), ok = decision.is_ok(), "wallet decision");
        decision
    }
}
