//! The six fee pools and the fee split.
use crate::config::FeeSplit;
use crate::error::{ErrorCode, LedgerError};
use crate::types::{Amount, apply_bp};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Pool {
    Prize,
    Equipment,
    GasRefund,
    Developer,
    NextEpoch,
    Emergency,
}

/// Per-pool amounts; used both for balances and for one fee's split.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolBalances {
    pub prize: Amount,
    pub equipment: Amount,
    pub gas_refund: Amount,
    pub developer: Amount,
    pub next_epoch: Amount,
    pub emergency: Amount,
}

/// How a single fee was divided.
pub type FeeDistribution = PoolBalances;

impl PoolBalances {
    pub fn get(&self, pool: Pool) -> Amount {
        match pool {
            Pool::Prize => self.prize,
            Pool::Equipment => self.equipment,
            Pool::GasRefund => self.gas_refund,
            Pool::Developer => self.developer,
            Pool::NextEpoch => self.next_epoch,
            Pool::Emergency => self.emergency,
        }
    }

    fn slot(&mut self, pool: Pool) -> &mut Amount {
        match pool {
            Pool::Prize => &mut self.prize,
            Pool::Equipment => &mut self.equipment,
            Pool::GasRefund => &mut self.gas_refund,
            Pool::Developer => &mut self.developer,
            Pool::NextEpoch => &mut self.next_epoch,
            Pool::Emergency => &mut self.emergency,
        }
    }

    pub fn total(&self) -> Amount {
        self.prize
            .saturating_add(self.equipment)
            .saturating_add(self.gas_refund)
            .saturating_add(self.developer)
            .saturating_add(self.next_epoch)
            .saturating_add(self.emergency)
    }

    /// Adds every share of a distribution to the matching pool.
    pub fn credit(&mut self, distribution: &FeeDistribution) {
        self.prize = self.prize.saturating_add(distribution.prize);
        self.equipment = self.equipment.saturating_add(distribution.equipment);
        self.gas_refund = self.gas_refund.saturating_add(distribution.gas_refund);
        self.developer = self.developer.saturating_add(distribution.developer);
        self.next_epoch = self.next_epoch.saturating_add(distribution.next_epoch);
        self.emergency = self.emergency.saturating_add(distribution.emergency);
    }

    pub fn deposit(&mut self, pool: Pool, amount: Amount) {
        let slot = self.slot(pool);
        *slot = slot.saturating_add(amount);
    }

    /// Removes `amount` from a pool; balances never go negative.
    pub fn withdraw(&mut self, pool: Pool, amount: Amount) -> Result<(), LedgerError> {
        let slot = self.slot(pool);
        *slot = slot
            .checked_sub(amount)
            .ok_or(LedgerError::new(ErrorCode::InsufficientPoolBalance))?;
        Ok(())
    }

    /// Moves `amount` between pools atomically.
    pub fn transfer(&mut self, from: Pool, to: Pool, amount: Amount) -> Result<(), LedgerError> {
        self.withdraw(from, amount)?;
        self.deposit(to, amount);
        Ok(())
    }
}

/// Splits `fee` by the configured weights.
///
/// Every share except the developer's is rounded down; the developer share
/// absorbs the remainder so the six shares always sum to exactly `fee`.
pub fn split_fee(fee: Amount, split: &FeeSplit) -> FeeDistribution {
    let prize = apply_bp(fee, split.prize_bp);
    let equipment = apply_bp(fee, split.equipment_bp);
    let gas_refund = apply_bp(fee, split.gas_refund_bp);
    let next_epoch = apply_bp(fee, split.next_epoch_bp);
    let emergency = apply_bp(fee, split.emergency_bp);
    let developer = fee
        .saturating_sub(prize)
        .saturating_sub(equipment)
        .saturating_sub(gas_refund)
        .saturating_sub(next_epoch)
        .saturating_sub(emergency);

    FeeDistribution {
        prize,
        equipment,
        gas_refund,
        developer,
        next_epoch,
        emergency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UNIT;

    #[test]
    fn creation_fee_split_matches_weights() {
        let split = split_fee(15 * UNIT, &FeeSplit::default());
        assert_eq!(split.developer, 3 * UNIT);
        assert_eq!(split.prize, 72 * UNIT / 10);
        assert_eq!(split.gas_refund, 18 * UNIT / 10);
        assert_eq!(split.equipment, 12 * UNIT / 10);
        assert_eq!(split.next_epoch, 12 * UNIT / 10);
        assert_eq!(split.emergency, 6 * UNIT / 10);
        assert_eq!(split.total(), 15 * UNIT);
    }

    #[test]
    fn split_always_sums_to_fee() {
        let split = FeeSplit::default();
        for fee in [0, 1, 7, 15, 99, 10_001, 123_456_789, u64::MAX as Amount, 15 * UNIT + 3] {
            assert_eq!(split_fee(fee, &split).total(), fee, "fee {fee}");
        }
    }

    #[test]
    fn remainder_goes_to_developer() {
        let split = split_fee(15, &FeeSplit::default());
        assert_eq!(split.prize, 7);
        assert_eq!(split.gas_refund, 1);
        assert_eq!(split.equipment, 1);
        assert_eq!(split.next_epoch, 1);
        assert_eq!(split.emergency, 0);
        assert_eq!(split.developer, 5);
    }

    #[test]
    fn withdraw_never_goes_negative() {
        let mut pools = PoolBalances::default();
        pools.deposit(Pool::NextEpoch, 10);
        let err = pools.withdraw(Pool::NextEpoch, 11).unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientPoolBalance);
        assert_eq!(pools.next_epoch, 10);

        pools.transfer(Pool::NextEpoch, Pool::Prize, 4).unwrap();
        assert_eq!(pools.next_epoch, 6);
        assert_eq!(pools.prize, 4);
    }
}
