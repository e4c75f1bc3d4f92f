//! Ledger-resident state.
use std::collections::BTreeMap;

use crate::character::PackedCharacter;
use crate::combat::{EnemyId, EnemyStats};
use crate::treasury::{EpochClock, PoolBalances, RewardBook};
use crate::types::{AccountId, Amount, Epoch, Timestamp};

/// An unresolved fight. At most one exists per player.
///
/// Enemy stats and the difficulty multiplier are frozen when the fight
/// starts; endurances here are session-local and only written back to the
/// character when the fight ends.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatSession {
    pub enemy_id: EnemyId,
    pub enemy_level: u32,
    pub enemy: EnemyStats,
    pub enemy_endurance: u32,
    pub player_endurance: u32,
    pub enemy_start_endurance: u32,
    pub player_start_endurance: u32,
    pub rounds_elapsed: u32,
    pub combat_index: i64,
    pub multiplier_bp: u32,
    pub started_at: Timestamp,
    pub last_updated: Timestamp,
}

impl CombatSession {
    pub fn start(
        enemy: EnemyStats,
        player_endurance: u32,
        combat_index: i64,
        multiplier_bp: u32,
        now: Timestamp,
    ) -> Self {
        Self {
            enemy_id: enemy.id,
            enemy_level: enemy.level,
            enemy,
            enemy_endurance: enemy.endurance,
            player_endurance,
            enemy_start_endurance: enemy.endurance,
            player_start_endurance: player_endurance,
            rounds_elapsed: 0,
            combat_index,
            multiplier_bp,
            started_at: now,
            last_updated: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LedgerState {
    pub characters: BTreeMap<AccountId, PackedCharacter>,
    pub sessions: BTreeMap<AccountId, CombatSession>,
    /// Registration order; backs player-by-index lookups.
    pub players: Vec<AccountId>,
    pub balances: BTreeMap<AccountId, Amount>,
    pub pools: PoolBalances,
    pub epoch: EpochClock,
    pub scores: BTreeMap<(Epoch, AccountId), u64>,
    pub refunds_used: BTreeMap<(Epoch, AccountId), Amount>,
    pub rewards: RewardBook,
    pub seed: u64,
    /// Count of committed calls; feeds the roll seeds.
    pub nonce: u64,
}

impl LedgerState {
    pub fn new(genesis: Timestamp, epoch_duration: Timestamp, seed: u64) -> Self {
        Self {
            characters: BTreeMap::new(),
            sessions: BTreeMap::new(),
            players: Vec::new(),
            balances: BTreeMap::new(),
            pools: PoolBalances::default(),
            epoch: EpochClock::new(genesis, epoch_duration),
            scores: BTreeMap::new(),
            refunds_used: BTreeMap::new(),
            rewards: RewardBook::default(),
            seed,
            nonce: 0,
        }
    }

    pub fn balance(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn credit(&mut self, account: AccountId, amount: Amount) {
        let balance = self.balances.entry(account).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    /// Debits `amount`; returns `false` without changes if the balance is short.
    pub fn debit(&mut self, account: AccountId, amount: Amount) -> bool {
        match self.balances.get_mut(&account) {
            Some(balance) if *balance >= amount => {
                *balance -= amount;
                true
            }
            _ => amount == 0,
        }
    }

    pub fn epoch_score(&self, account: AccountId, epoch: Epoch) -> u64 {
        self.scores.get(&(epoch, account)).copied().unwrap_or(0)
    }

    pub fn refunds_used(&self, account: AccountId, epoch: Epoch) -> Amount {
        self.refunds_used
            .get(&(epoch, account))
            .copied()
            .unwrap_or(0)
    }
}
