//! Per-epoch reward funding, root publication, claims, and roll-forward.
//!
//! Lifecycle of an epoch's rewards:
//!
//! ```text
//! fund (prize pool -> epoch) -> publish root -> dispute window
//!     -> claim window (claims accepted) -> expiry -> roll unclaimed forward
//! ```
use std::collections::{BTreeMap, BTreeSet};

use super::merkle::{Hash32, leaf_hash, verify_proof};
use crate::error::{ErrorCode, LedgerError};
use crate::types::{AccountId, Amount, Epoch, Timestamp};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EpochRewards {
    /// Balance set aside for this epoch's claims.
    pub funded: Amount,
    pub root: Option<Hash32>,
    pub published_at: Timestamp,
    pub total_allocated: Amount,
    pub total_claimed: Amount,
    pub claimed: BTreeSet<u64>,
    pub rolled: bool,
}

/// Windows applied to every published epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClaimWindows {
    pub dispute: Timestamp,
    pub claim: Timestamp,
}

/// A single claim request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Claim<'a> {
    pub epoch: Epoch,
    pub index: u64,
    pub account: AccountId,
    pub amount: Amount,
    pub proof: &'a [Hash32],
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RewardBook {
    epochs: BTreeMap<Epoch, EpochRewards>,
}

impl RewardBook {
    pub fn epoch(&self, epoch: Epoch) -> Option<&EpochRewards> {
        self.epochs.get(&epoch)
    }

    /// Adds `amount` to an epoch's reward balance.
    ///
    /// Rejected once the epoch can no longer pay out: after its leftovers were
    /// rolled forward, or once its claim window has expired.
    pub fn fund(&mut self, epoch: Epoch, amount: Amount, windows: ClaimWindows, now: Timestamp) -> Result<(), LedgerError> {
        if self.is_claim_window_expired(epoch, windows, now) {
            return Err(ErrorCode::EpochClosed.into());
        }
        let entry = self.epochs.entry(epoch).or_default();
        if entry.rolled {
            return Err(ErrorCode::EpochClosed.into());
        }
        entry.funded = entry.funded.saturating_add(amount);
        Ok(())
    }

    /// Publishes the claim root for a finished epoch.
    pub fn publish(
        &mut self,
        epoch: Epoch,
        current_epoch: Epoch,
        root: Hash32,
        total_allocated: Amount,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        if epoch >= current_epoch {
            return Err(ErrorCode::InvalidEpoch.into());
        }
        if root == [0; 32] {
            return Err(ErrorCode::InvalidRoot.into());
        }

        let entry = self.epochs.entry(epoch).or_default();
        if entry.root.is_some() {
            return Err(ErrorCode::EpochAlreadyPublished.into());
        }
        if entry.funded == 0 {
            return Err(ErrorCode::UnfundedEpoch.into());
        }
        if entry.funded < total_allocated {
            return Err(ErrorCode::InsufficientEpochFunds.into());
        }

        entry.root = Some(root);
        entry.published_at = now;
        entry.total_allocated = total_allocated;
        Ok(())
    }

    /// Deadline after which claims for `epoch` are rejected.
    pub fn claim_deadline(&self, epoch: Epoch, windows: ClaimWindows) -> Option<Timestamp> {
        let entry = self.epochs.get(&epoch)?;
        entry.root?;
        Some(entry.published_at.saturating_add(windows.claim))
    }

    pub fn is_claimed(&self, epoch: Epoch, index: u64) -> bool {
        self.epochs
            .get(&epoch)
            .is_some_and(|entry| entry.claimed.contains(&index))
    }

    pub fn is_claim_window_expired(&self, epoch: Epoch, windows: ClaimWindows, now: Timestamp) -> bool {
        self.claim_deadline(epoch, windows)
            .is_some_and(|deadline| now > deadline)
    }

    /// `total_allocated - total_claimed` for a published epoch.
    pub fn unclaimed_amount(&self, epoch: Epoch) -> Amount {
        self.epochs
            .get(&epoch)
            .filter(|entry| entry.root.is_some() && !entry.rolled)
            .map(|entry| entry.total_allocated.saturating_sub(entry.total_claimed))
            .unwrap_or(0)
    }

    /// Validates and records a claim. The caller credits the recipient.
    pub fn claim(&mut self, claim: &Claim<'_>, windows: ClaimWindows, now: Timestamp) -> Result<(), LedgerError> {
        if claim.account.is_zero() {
            return Err(ErrorCode::InvalidRecipient.into());
        }

        let entry = self
            .epochs
            .get_mut(&claim.epoch)
            .ok_or(LedgerError::new(ErrorCode::NoRootAvailable))?;
        let root = entry.root.ok_or(LedgerError::new(ErrorCode::NoRootAvailable))?;

        if now < entry.published_at.saturating_add(windows.dispute) {
            return Err(ErrorCode::DisputeWindowActive.into());
        }
        if now > entry.published_at.saturating_add(windows.claim) || entry.rolled {
            return Err(ErrorCode::ClaimWindowExpired.into());
        }
        if entry.claimed.contains(&claim.index) {
            return Err(ErrorCode::AlreadyClaimed.into());
        }

        let leaf = leaf_hash(claim.epoch, claim.index, &claim.account, claim.amount);
        if !verify_proof(claim.proof, &root, leaf) {
            return Err(ErrorCode::InvalidProof.into());
        }

        let remaining = entry.funded.saturating_sub(entry.total_claimed);
        if claim.amount > remaining {
            return Err(ErrorCode::InsufficientEpochFunds.into());
        }

        entry.claimed.insert(claim.index);
        entry.total_claimed += claim.amount;
        Ok(())
    }

    /// Closes an expired epoch and returns everything not claimed.
    ///
    /// The returned amount includes any funding beyond the allocation.
    pub fn roll_unclaimed(&mut self, epoch: Epoch, windows: ClaimWindows, now: Timestamp) -> Result<Amount, LedgerError> {
        let entry = self
            .epochs
            .get_mut(&epoch)
            .ok_or(LedgerError::new(ErrorCode::NotPublished))?;
        if entry.root.is_none() {
            return Err(ErrorCode::NotPublished.into());
        }
        if now <= entry.published_at.saturating_add(windows.claim) {
            return Err(ErrorCode::ClaimWindowActive.into());
        }

        let leftover = entry.funded.saturating_sub(entry.total_claimed);
        if entry.rolled || leftover == 0 {
            return Err(ErrorCode::NoUnclaimedFunds.into());
        }

        entry.rolled = true;
        entry.funded = entry.total_claimed;
        Ok(leftover)
    }
}
