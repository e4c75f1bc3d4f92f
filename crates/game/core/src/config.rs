//! Ledger configuration constants and tunable parameters.
use crate::treasury::ClaimWindows;
use crate::types::{Amount, BASIS_POINTS, Timestamp, UNIT};

/// Fees charged by fee-bearing calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeeSchedule {
    pub creation: Amount,
    pub heal: Amount,
    pub resurrection: Amount,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            creation: 15 * UNIT,
            heal: 2 * UNIT,
            resurrection: 5 * UNIT,
        }
    }
}

/// Weights (basis points) used to split every fee across the six pools.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeeSplit {
    pub developer_bp: u32,
    pub prize_bp: u32,
    pub gas_refund_bp: u32,
    pub equipment_bp: u32,
    pub next_epoch_bp: u32,
    pub emergency_bp: u32,
}

impl FeeSplit {
    pub const fn total_bp(&self) -> u32 {
        self.developer_bp
            + self.prize_bp
            + self.gas_refund_bp
            + self.equipment_bp
            + self.next_epoch_bp
            + self.emergency_bp
    }
}

impl Default for FeeSplit {
    fn default() -> Self {
        Self {
            developer_bp: 2_000,
            prize_bp: 4_800,
            gas_refund_bp: 1_200,
            equipment_bp: 800,
            next_epoch_bp: 800,
            emergency_bp: 400,
        }
    }
}

/// Gas refund caps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GasRefundConfig {
    pub cap_per_fight: Amount,
    pub per_epoch_cap_per_account: Amount,
    /// Characters at or below this level receive the full per-fight cap;
    /// higher levels receive half.
    pub low_level_threshold: u32,
}

impl Default for GasRefundConfig {
    fn default() -> Self {
        Self {
            cap_per_fight: UNIT / 100,
            per_epoch_cap_per_account: UNIT / 10,
            low_level_threshold: 5,
        }
    }
}

/// Critical-hit and damage tuning for a single exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatTuning {
    /// Damage never drops below this floor (zero disables the floor).
    pub min_damage: u32,
    /// Defense is divided by this before being subtracted from combat.
    pub defense_divisor: u32,
    pub crit_base_bp: u32,
    pub crit_per_luck_bp: u32,
    pub crit_cap_bp: u32,
    pub crit_multiplier_pct: u32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            min_damage: 1,
            defense_divisor: 2,
            crit_base_bp: 500,
            crit_per_luck_bp: 50,
            crit_cap_bp: 6_000,
            crit_multiplier_pct: 150,
        }
    }
}

/// Ledger configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    pub fees: FeeSchedule,
    pub fee_split: FeeSplit,
    pub gas_refund: GasRefundConfig,
    pub combat: CombatTuning,
    /// Rounds resolved by a single fight/continue call.
    pub rounds_per_call: usize,
    pub healing_cooldown: Timestamp,
    /// Time for passive regeneration to restore a character from zero to full.
    pub regen_window: Timestamp,
    pub epoch_duration: Timestamp,
    pub claim_window: Timestamp,
    pub dispute_window: Timestamp,
    pub max_drop_rate_bp: u32,
}

/// Rejected configuration values.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("fee split weights sum to {0} bp, expected 10000")]
    FeeSplitTotal(u32),

    #[error("rounds per call must be between 1 and {max}, got {got}")]
    RoundBudget { got: usize, max: usize },

    #[error("{0} must be non-zero")]
    ZeroDuration(&'static str),

    #[error("max drop rate {0} bp exceeds 10000")]
    DropRate(u32),
}

impl GameConfig {
    // ===== compile-time constants used as type parameters =====
    /// Upper bound for `rounds_per_call`; sizes the per-call round log.
    pub const MAX_ROUNDS_PER_CALL: usize = 32;
    pub const MAX_LEVEL: u32 = 100;
    pub const MAX_ENEMY_LEVEL: u32 = 100;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_ROUNDS_PER_CALL: usize = 10;
    pub const DEFAULT_HEALING_COOLDOWN: Timestamp = 3_600;
    pub const DEFAULT_REGEN_WINDOW: Timestamp = 3_600;
    pub const DEFAULT_EPOCH_DURATION: Timestamp = 86_400;
    pub const DEFAULT_CLAIM_WINDOW: Timestamp = 30 * 86_400;
    pub const DEFAULT_DISPUTE_WINDOW: Timestamp = 3_600;
    pub const DEFAULT_MAX_DROP_RATE_BP: u32 = 3_000;

    pub fn new() -> Self {
        Self {
            fees: FeeSchedule::default(),
            fee_split: FeeSplit::default(),
            gas_refund: GasRefundConfig::default(),
            combat: CombatTuning::default(),
            rounds_per_call: Self::DEFAULT_ROUNDS_PER_CALL,
            healing_cooldown: Self::DEFAULT_HEALING_COOLDOWN,
            regen_window: Self::DEFAULT_REGEN_WINDOW,
            epoch_duration: Self::DEFAULT_EPOCH_DURATION,
            claim_window: Self::DEFAULT_CLAIM_WINDOW,
            dispute_window: Self::DEFAULT_DISPUTE_WINDOW,
            max_drop_rate_bp: Self::DEFAULT_MAX_DROP_RATE_BP,
        }
    }

    #[must_use]
    pub fn with_rounds_per_call(mut self, rounds: usize) -> Self {
        self.rounds_per_call = rounds;
        self
    }

    #[must_use]
    pub fn with_epoch_duration(mut self, duration: Timestamp) -> Self {
        self.epoch_duration = duration;
        self
    }

    #[must_use]
    pub fn with_claim_windows(mut self, dispute: Timestamp, claim: Timestamp) -> Self {
        self.dispute_window = dispute;
        self.claim_window = claim;
        self
    }

    pub fn claim_windows(&self) -> ClaimWindows {
        ClaimWindows {
            dispute: self.dispute_window,
            claim: self.claim_window,
        }
    }

    #[must_use]
    pub fn with_fees(mut self, fees: FeeSchedule) -> Self {
        self.fees = fees;
        self
    }

    #[must_use]
    pub fn with_combat(mut self, combat: CombatTuning) -> Self {
        self.combat = combat;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let total = self.fee_split.total_bp();
        if total != BASIS_POINTS {
            return Err(ConfigError::FeeSplitTotal(total));
        }
        if self.rounds_per_call == 0 || self.rounds_per_call > Self::MAX_ROUNDS_PER_CALL {
            return Err(ConfigError::RoundBudget {
                got: self.rounds_per_call,
                max: Self::MAX_ROUNDS_PER_CALL,
            });
        }
        if self.epoch_duration == 0 {
            return Err(ConfigError::ZeroDuration("epoch_duration"));
        }
        if self.regen_window == 0 {
            return Err(ConfigError::ZeroDuration("regen_window"));
        }
        if self.max_drop_rate_bp > BASIS_POINTS {
            return Err(ConfigError::DropRate(self.max_drop_rate_bp));
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
