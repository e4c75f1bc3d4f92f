//! Domain events emitted by ledger calls.
//!
//! Events are the only record of per-round detail and of terminal fight
//! outcomes; the ledger itself keeps just the final character state.
use arrayvec::ArrayVec;

use crate::character::{CharacterClass, EquipmentBonuses};
use crate::combat::EnemyId;
use crate::config::GameConfig;
use crate::treasury::{FeeDistribution, Hash32};
use crate::types::{AccountId, Amount, Epoch, Timestamp};

/// One resolved round inside a [`FightSummary`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundRecord {
    /// 1-based round number within the whole session.
    pub round: u32,
    pub player_damage: u32,
    pub enemy_damage: u32,
    pub player_critical: bool,
    pub enemy_critical: bool,
}

/// Rounds resolved by a single call.
pub type RoundLog = ArrayVec<RoundRecord, { GameConfig::MAX_ROUNDS_PER_CALL }>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum FightOutcome {
    Victory,
    Defeat,
    /// Player left the fight; no rewards, no death.
    Fled,
    /// Round budget exhausted; the session persists.
    Unresolved,
}

/// Everything a client needs to replay one fight/continue/flee call.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FightSummary {
    pub player: AccountId,
    pub enemy_id: EnemyId,
    pub enemy_level: u32,
    /// Rounds elapsed over the whole session, including earlier calls.
    pub rounds_elapsed: u32,
    pub player_start_endurance: u32,
    pub player_endurance: u32,
    pub enemy_start_endurance: u32,
    pub enemy_endurance: u32,
    pub outcome: FightOutcome,
    pub rounds: RoundLog,
}

impl FightSummary {
    pub fn victory(&self) -> bool {
        self.outcome == FightOutcome::Victory
    }

    pub fn unresolved(&self) -> bool {
        self.outcome == FightOutcome::Unresolved
    }

    pub fn player_died(&self) -> bool {
        self.outcome == FightOutcome::Defeat
    }
}

#[derive(Clone, Debug, PartialEq, Eq, strum::EnumDiscriminants)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum_discriminants(name(LedgerEventKind))]
#[strum_discriminants(derive(Hash, strum::Display))]
#[strum_discriminants(strum(serialize_all = "snake_case"))]
pub enum LedgerEvent {
    CharacterCreated {
        player: AccountId,
        class: CharacterClass,
    },
    CharacterHealed {
        player: AccountId,
        new_endurance: u32,
    },
    CharacterResurrected {
        player: AccountId,
        new_endurance: u32,
    },
    LevelUp {
        player: AccountId,
        new_level: u32,
    },
    FightSummary(FightSummary),
    DifficultyMultiplierApplied {
        player: AccountId,
        enemy_id: EnemyId,
        enemy_level: u32,
        combat_index: i64,
        multiplier_bp: u32,
        base_xp: u32,
        adjusted_xp: u64,
        base_drop_rate_bp: u32,
        adjusted_drop_rate_bp: u32,
    },
    FightXpReward {
        player: AccountId,
        xp: u64,
    },
    EquipmentDropped {
        player: AccountId,
        enemy_id: EnemyId,
        enemy_level: u32,
        bonuses: EquipmentBonuses,
    },
    FightRecorded {
        epoch: Epoch,
        player: AccountId,
        enemy_level: u32,
        is_kill: bool,
        fight_score: u64,
    },
    FeeDistributed {
        payer: AccountId,
        shares: FeeDistribution,
    },
    GasRefundIssued {
        player: AccountId,
        epoch: Epoch,
        amount: Amount,
    },
    EpochAdvanced {
        from: Epoch,
        to: Epoch,
    },
    EpochFunded {
        epoch: Epoch,
        amount: Amount,
    },
    EpochRootPublished {
        epoch: Epoch,
        root: Hash32,
        total_allocated: Amount,
        published_at: Timestamp,
    },
    Claimed {
        epoch: Epoch,
        index: u64,
        account: AccountId,
        amount: Amount,
    },
    UnclaimedFundsRolled {
        from_epoch: Epoch,
        amount: Amount,
    },
    EpochReserveConsumed {
        epoch: Epoch,
        amount: Amount,
    },
    EmergencyReserveConsumed {
        epoch: Epoch,
        amount: Amount,
    },
}

impl LedgerEvent {
    pub fn kind(&self) -> LedgerEventKind {
        self.into()
    }

    /// Player the event is about, if it concerns a single player.
    pub fn player(&self) -> Option<AccountId> {
        match self {
            Self::CharacterCreated { player, .. }
            | Self::CharacterHealed { player, .. }
            | Self::CharacterResurrected { player, .. }
            | Self::LevelUp { player, .. }
            | Self::DifficultyMultiplierApplied { player, .. }
            | Self::FightXpReward { player, .. }
            | Self::EquipmentDropped { player, .. }
            | Self::FightRecorded { player, .. }
            | Self::GasRefundIssued { player, .. } => Some(*player),
            Self::FightSummary(summary) => Some(summary.player),
            Self::FeeDistributed { payer, .. } => Some(*payer),
            Self::Claimed { account, .. } => Some(*account),
            Self::EpochAdvanced { .. }
            | Self::EpochFunded { .. }
            | Self::EpochRootPublished { .. }
            | Self::UnclaimedFundsRolled { .. }
            | Self::EpochReserveConsumed { .. }
            | Self::EmergencyReserveConsumed { .. } => None,
        }
    }
}
