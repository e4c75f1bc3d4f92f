//! Gas refunds paid to players from the gas-refund pool.
use crate::config::GasRefundConfig;
use crate::types::Amount;

/// Refund owed for one fight call.
///
/// Characters at or below the low-level threshold get the full per-fight
/// cap, others half. The result is bounded by what the account may still
/// receive this epoch and by the pool balance.
pub fn refund_amount(config: &GasRefundConfig, level: u32, used_this_epoch: Amount, pool_balance: Amount) -> Amount {
    let per_fight = if level <= config.low_level_threshold {
        config.cap_per_fight
    } else {
        config.cap_per_fight / 2
    };
    let epoch_headroom = config
        .per_epoch_cap_per_account
        .saturating_sub(used_this_epoch);

    per_fight.min(epoch_headroom).min(pool_balance)
}
