//! Reward claims and treasury administration.
use tracing::info;

use super::LedgerEngine;
use crate::error::{ErrorCode, LedgerError};
use crate::event::LedgerEvent;
use crate::treasury::{Claim, Hash32, Pool};
use crate::types::{AccountId, Amount, Epoch};

impl LedgerEngine<'_> {
    /// Anyone may submit a claim; the reward always goes to `account`.
    pub(super) fn claim_reward(
        &mut self,
        epoch: Epoch,
        index: u64,
        account: AccountId,
        amount: Amount,
        proof: &[Hash32],
    ) -> Result<(), LedgerError> {
        let claim = Claim {
            epoch,
            index,
            account,
            amount,
            proof,
        };
        let windows = self.config.claim_windows();
        self.state.rewards.claim(&claim, windows, self.now())?;
        self.state.credit(account, amount);

        info!(epoch, index, %account, amount, "reward claimed");
        self.emit(LedgerEvent::Claimed {
            epoch,
            index,
            account,
            amount,
        });
        Ok(())
    }

    pub(super) fn fund_epoch(&mut self, epoch: Epoch, amount: Amount) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(ErrorCode::NoFundsProvided.into());
        }
        let windows = self.config.claim_windows();
        self.state.rewards.fund(epoch, amount, windows, self.now())?;
        self.state.pools.withdraw(Pool::Prize, amount)?;
        self.emit(LedgerEvent::EpochFunded { epoch, amount });
        Ok(())
    }

    pub(super) fn publish_epoch_root(
        &mut self,
        epoch: Epoch,
        root: Hash32,
        total_allocated: Amount,
    ) -> Result<(), LedgerError> {
        let now = self.now();
        let current = self.state.epoch.current;
        self.state
            .rewards
            .publish(epoch, current, root, total_allocated, now)?;

        info!(epoch, total_allocated, "epoch root published");
        self.emit(LedgerEvent::EpochRootPublished {
            epoch,
            root,
            total_allocated,
            published_at: now,
        });
        Ok(())
    }

    pub(super) fn roll_unclaimed_funds(&mut self, epoch: Epoch) -> Result<(), LedgerError> {
        let windows = self.config.claim_windows();
        let amount = self
            .state
            .rewards
            .roll_unclaimed(epoch, windows, self.now())?;
        self.state.pools.deposit(Pool::NextEpoch, amount);
        self.emit(LedgerEvent::UnclaimedFundsRolled {
            from_epoch: epoch,
            amount,
        });
        Ok(())
    }

    pub(super) fn consume_epoch_reserve(&mut self, epoch: Epoch, amount: Amount) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(ErrorCode::NoFundsProvided.into());
        }
        self.state
            .pools
            .transfer(Pool::NextEpoch, Pool::Prize, amount)?;
        self.emit(LedgerEvent::EpochReserveConsumed { epoch, amount });
        Ok(())
    }

    pub(super) fn consume_emergency_reserve(
        &mut self,
        epoch: Epoch,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(ErrorCode::NoFundsProvided.into());
        }
        self.state
            .pools
            .transfer(Pool::Emergency, Pool::Prize, amount)?;
        self.emit(LedgerEvent::EmergencyReserveConsumed { epoch, amount });
        Ok(())
    }
}
