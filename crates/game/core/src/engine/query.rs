//! Read-only ledger queries.
//!
//! [`LedgerQuery`] is the wire form of the read surface so remote clients can
//! ask the same questions the typed accessors on [`Ledger`] answer.
use super::{CombatSession, Eligibility, Ledger};
use crate::character::Character;
use crate::combat::{EnemyId, EnemyStats, scale_enemy_for_level};
use crate::config::{FeeSchedule, GameConfig, GasRefundConfig};
use crate::error::{ErrorCode, LedgerError};
use crate::progression::{healing_cooldown_remaining, pending_regeneration, xp_required_for_level};
use crate::treasury::{EpochRewards, PoolBalances};
use crate::types::{AccountId, Amount, Epoch, Timestamp};

#[derive(Clone, Debug, PartialEq, Eq, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum LedgerQuery {
    Character(AccountId),
    CombatState(AccountId),
    IsInCombat(AccountId),
    ScaledEnemy { enemy_id: EnemyId, level: u32 },
    XpRequiredForLevel(u32),
    HealingCooldownRemaining(AccountId),
    PendingRegeneration(AccountId),
    EffectiveEndurance(AccountId),
    Pools,
    CurrentEpoch,
    EpochTimeRemaining,
    EpochScore { account: AccountId, epoch: Epoch },
    TotalPlayerCount,
    PlayerByIndex(u64),
    ClaimDeadline(Epoch),
    IsClaimed { epoch: Epoch, index: u64 },
    IsClaimWindowExpired(Epoch),
    UnclaimedAmount(Epoch),
    EpochRewards(Epoch),
    Balance(AccountId),
    RefundsUsed { account: AccountId, epoch: Epoch },
    GasRefundConfig,
    Fees,
    CanFight(AccountId),
    CanHeal(AccountId),
    CanResurrect(AccountId),
    CanContinueFight(AccountId),
}

impl LedgerQuery {
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QueryValue {
    Character(Option<Character>),
    CombatState(Option<CombatSession>),
    Enemy(EnemyStats),
    Bool(bool),
    U64(u64),
    Amount(Amount),
    Timestamp(Option<Timestamp>),
    Account(Option<AccountId>),
    Pools(PoolBalances),
    EpochRewards(Option<EpochRewards>),
    GasRefund(GasRefundConfig),
    Fees(FeeSchedule),
    Eligibility(Eligibility),
}

impl Ledger {
    pub fn combat_state(&self, account: &AccountId) -> Option<&CombatSession> {
        self.state.sessions.get(account)
    }

    pub fn scaled_enemy(&self, enemy_id: EnemyId, level: u32) -> Result<EnemyStats, LedgerError> {
        let base = self
            .roster
            .get(enemy_id)
            .ok_or(LedgerError::new(ErrorCode::EnemyDoesNotExist))?;
        if level == 0 || level > GameConfig::MAX_ENEMY_LEVEL {
            return Err(ErrorCode::InvalidEnemyLevel.into());
        }
        Ok(scale_enemy_for_level(base, level))
    }

    pub fn current_epoch(&self, now: Timestamp) -> Epoch {
        self.state.epoch.at(now).0
    }

    pub fn epoch_time_remaining(&self, now: Timestamp) -> Timestamp {
        self.state.epoch.time_remaining(now)
    }

    pub fn player_by_index(&self, index: u64) -> Option<AccountId> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.state.players.get(i))
            .copied()
    }

    /// Answers a wire query as of `now`.
    ///
    /// Time-dependent answers (regeneration, epoch, claim windows) are
    /// computed as if a call landed at `now`, without mutating state.
    pub fn query(&self, query: &LedgerQuery, now: Timestamp) -> Result<QueryValue, LedgerError> {
        let rewards = &self.state.rewards;
        let value = match query {
            LedgerQuery::Character(account) => QueryValue::Character(self.character(account)?),
            LedgerQuery::CombatState(account) => {
                QueryValue::CombatState(self.combat_state(account).cloned())
            }
            LedgerQuery::IsInCombat(account) => {
                QueryValue::Bool(self.state.sessions.contains_key(account))
            }
            LedgerQuery::ScaledEnemy { enemy_id, level } => {
                QueryValue::Enemy(self.scaled_enemy(*enemy_id, *level)?)
            }
            LedgerQuery::XpRequiredForLevel(level) => QueryValue::U64(xp_required_for_level(*level)),
            LedgerQuery::HealingCooldownRemaining(account) => {
                let remaining = self
                    .character(account)?
                    .map(|c| healing_cooldown_remaining(&c, now, self.config.healing_cooldown))
                    .unwrap_or(0);
                QueryValue::U64(remaining)
            }
            LedgerQuery::PendingRegeneration(account) => {
                let pending = self
                    .character(account)?
                    .map(|c| pending_regeneration(&c, now, self.config.regen_window))
                    .unwrap_or(0);
                QueryValue::U64(pending as u64)
            }
            LedgerQuery::EffectiveEndurance(account) => {
                let endurance = self
                    .effective_character(account, now)?
                    .map(|c| c.current_endurance)
                    .unwrap_or(0);
                QueryValue::U64(endurance as u64)
            }
            LedgerQuery::Pools => QueryValue::Pools(self.state.pools),
            LedgerQuery::CurrentEpoch => QueryValue::U64(self.current_epoch(now)),
            LedgerQuery::EpochTimeRemaining => QueryValue::U64(self.epoch_time_remaining(now)),
            LedgerQuery::EpochScore { account, epoch } => {
                QueryValue::U64(self.state.epoch_score(*account, *epoch))
            }
            LedgerQuery::TotalPlayerCount => QueryValue::U64(self.state.players.len() as u64),
            LedgerQuery::PlayerByIndex(index) => QueryValue::Account(self.player_by_index(*index)),
            LedgerQuery::ClaimDeadline(epoch) => {
                QueryValue::Timestamp(rewards.claim_deadline(*epoch, self.config.claim_windows()))
            }
            LedgerQuery::IsClaimed { epoch, index } => {
                QueryValue::Bool(rewards.is_claimed(*epoch, *index))
            }
            LedgerQuery::IsClaimWindowExpired(epoch) => {
                QueryValue::Bool(rewards.is_claim_window_expired(*epoch, self.config.claim_windows(), now))
            }
            LedgerQuery::UnclaimedAmount(epoch) => QueryValue::Amount(rewards.unclaimed_amount(*epoch)),
            LedgerQuery::EpochRewards(epoch) => QueryValue::EpochRewards(rewards.epoch(*epoch).cloned()),
            LedgerQuery::Balance(account) => QueryValue::Amount(self.state.balance(account)),
            LedgerQuery::RefundsUsed { account, epoch } => {
                QueryValue::Amount(self.state.refunds_used(*account, *epoch))
            }
            LedgerQuery::GasRefundConfig => QueryValue::GasRefund(self.config.gas_refund),
            LedgerQuery::Fees => QueryValue::Fees(self.config.fees),
            LedgerQuery::CanFight(account) => QueryValue::Eligibility(self.can_fight(account, now)?),
            LedgerQuery::CanHeal(account) => QueryValue::Eligibility(self.can_heal(account, now)?),
            LedgerQuery::CanResurrect(account) => QueryValue::Eligibility(self.can_resurrect(account)?),
            LedgerQuery::CanContinueFight(account) => {
                QueryValue::Eligibility(self.can_continue_fight(account)?)
            }
        };
        Ok(value)
    }
}
