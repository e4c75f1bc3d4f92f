//! Refresh signals for state-mutating actions.
//!
//! A completed action says *what* went stale, not what the new values are.
//! Consumers re-read the affected queries; handling the same signal twice is
//! harmless.
//!
//! # Architecture
//!
//! - `RefreshScope`: bitflags naming the read surfaces an action touched
//! - `RefreshSignal`: broadcast by the orchestrator after each `Completed`

use bitflags::bitflags;

use client_blockchain_core::BlockInfo;
use game_core::{AccountId, CallKind, LedgerEventKind};

use crate::action::ActionId;

bitflags! {
    /// Read surfaces that may have changed.
    ///
    /// # Design
    ///
    /// - Each flag maps onto a group of ledger queries
    /// - `TREASURY` and `ALL` are shortcuts for common combinations
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct RefreshScope: u32 {
        /// Character record, eligibility checks, effective endurance.
        const CHARACTER = 0b000001;

        /// Combat session of the player.
        const COMBAT    = 0b000010;

        /// Native balance of the player.
        const BALANCE   = 0b000100;

        /// Fee pool balances.
        const POOLS     = 0b001000;

        /// Epoch number, timers, and scores.
        const EPOCH     = 0b010000;

        /// Reward roots, claim deadlines, claimed bits.
        const CLAIMS    = 0b100000;

        const TREASURY = Self::POOLS.bits() | Self::EPOCH.bits() | Self::CLAIMS.bits();

        const ALL = Self::CHARACTER.bits()
                  | Self::COMBAT.bits()
                  | Self::BALANCE.bits()
                  | Self::TREASURY.bits();
    }
}

impl RefreshScope {
    /// What a successful call of `kind` can change.
    pub fn for_call(kind: CallKind) -> Self {
        match kind {
            CallKind::CreateCharacter => Self::CHARACTER | Self::BALANCE | Self::POOLS | Self::EPOCH,
            CallKind::FightEnemy | CallKind::ContinueFight | CallKind::FleeRound => {
                // gas refunds move balance and pools
                Self::CHARACTER | Self::COMBAT | Self::BALANCE | Self::POOLS | Self::EPOCH
            }
            CallKind::HealCharacter | CallKind::ResurrectCharacter => {
                Self::CHARACTER | Self::BALANCE | Self::POOLS
            }
            CallKind::ClaimReward => Self::BALANCE | Self::CLAIMS,
            CallKind::FundEpoch | CallKind::RollUnclaimedFunds => Self::POOLS | Self::CLAIMS,
            CallKind::PublishEpochRoot => Self::CLAIMS,
            CallKind::ConsumeEpochReserve | CallKind::ConsumeEmergencyReserve => Self::POOLS,
        }
    }

    /// What an observed event says changed.
    pub fn for_event(kind: LedgerEventKind) -> Self {
        match kind {
            LedgerEventKind::CharacterCreated
            | LedgerEventKind::CharacterHealed
            | LedgerEventKind::CharacterResurrected
            | LedgerEventKind::LevelUp
            | LedgerEventKind::EquipmentDropped
            | LedgerEventKind::FightXpReward => Self::CHARACTER,
            LedgerEventKind::FightSummary | LedgerEventKind::DifficultyMultiplierApplied => {
                Self::CHARACTER | Self::COMBAT
            }
            LedgerEventKind::FightRecorded | LedgerEventKind::EpochAdvanced => Self::EPOCH,
            LedgerEventKind::FeeDistributed => Self::BALANCE | Self::POOLS,
            LedgerEventKind::GasRefundIssued => Self::BALANCE | Self::POOLS,
            LedgerEventKind::EpochFunded
            | LedgerEventKind::UnclaimedFundsRolled
            | LedgerEventKind::EpochReserveConsumed
            | LedgerEventKind::EmergencyReserveConsumed => Self::POOLS | Self::CLAIMS,
            LedgerEventKind::EpochRootPublished => Self::CLAIMS,
            LedgerEventKind::Claimed => Self::BALANCE | Self::CLAIMS,
        }
    }

    /// Returns true if anything about the player's character needs re-reading.
    pub fn touches_character(&self) -> bool {
        self.intersects(Self::CHARACTER | Self::COMBAT)
    }
}

/// Emitted once per completed action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefreshSignal {
    pub action: ActionId,
    pub account: AccountId,
    pub kind: CallKind,
    pub scope: RefreshScope,
    /// Inclusion block; `None` when nothing was sent.
    pub block: Option<BlockInfo>,
}
