//! Call execution against the ledger state.
//!
//! [`Ledger`] is the authoritative reducer: every state change flows through
//! [`Ledger::execute`], which applies a [`LedgerCall`] to a scratch copy of
//! the state and commits it only if the whole call succeeds. A failed call
//! leaves no trace beyond its error.
mod character;
pub mod checks;
mod combat;
mod query;
mod state;
mod treasury;

pub use checks::Eligibility;
pub use combat::{adjusted_drop_rate, adjusted_xp, equipment_bonus_cap};
pub use query::{LedgerQuery, QueryValue};
pub use state::{CombatSession, LedgerState};

use tracing::{debug, instrument};

use crate::action::LedgerCall;
use crate::character::{Character, PackedCharacter};
use crate::combat::EnemyRoster;
use crate::config::{ConfigError, GameConfig};
use crate::error::{ErrorCode, LedgerError};
use crate::event::LedgerEvent;
use crate::progression::settle_regeneration;
use crate::treasury::split_fee;
use crate::types::{AccountId, Amount, Timestamp};

/// Who is calling, what they attached, and the block time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CallContext {
    pub caller: AccountId,
    /// Native value attached to the call. Only fee-bearing calls consume it.
    pub value: Amount,
    pub now: Timestamp,
}

impl CallContext {
    pub fn new(caller: AccountId, now: Timestamp) -> Self {
        Self {
            caller,
            value: 0,
            now,
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: Amount) -> Self {
        self.value = value;
        self
    }
}

/// The combat and treasury ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ledger {
    state: LedgerState,
    config: GameConfig,
    roster: EnemyRoster,
    admin: AccountId,
}

impl Ledger {
    pub fn new(
        config: GameConfig,
        roster: EnemyRoster,
        admin: AccountId,
        genesis: Timestamp,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            state: LedgerState::new(genesis, config.epoch_duration, seed),
            config,
            roster,
            admin,
        })
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn roster(&self) -> &EnemyRoster {
        &self.roster
    }

    pub fn admin(&self) -> AccountId {
        self.admin
    }

    /// Mints native balance to an account. Used for genesis allocations and
    /// development faucets; not reachable through [`LedgerCall`].
    pub fn mint(&mut self, account: AccountId, amount: Amount) {
        self.state.credit(account, amount);
    }

    /// Applies `call` atomically and returns the events it emitted.
    #[instrument(level = "debug", skip(self, call), fields(caller = %ctx.caller, kind = %call.kind()))]
    pub fn execute(
        &mut self,
        ctx: &CallContext,
        call: &LedgerCall,
    ) -> Result<Vec<LedgerEvent>, LedgerError> {
        let mut scratch = self.state.clone();
        let events = {
            let mut engine = LedgerEngine {
                state: &mut scratch,
                config: &self.config,
                roster: &self.roster,
                admin: self.admin,
                ctx,
                events: Vec::new(),
            };
            engine.apply(call)?;
            engine.events
        };

        scratch.nonce = scratch.nonce.wrapping_add(1);
        self.state = scratch;
        debug!(events = events.len(), nonce = self.state.nonce, "call committed");
        Ok(events)
    }

    /// Decodes a stored character without settling regeneration.
    pub fn character(&self, account: &AccountId) -> Result<Option<Character>, LedgerError> {
        self.state
            .characters
            .get(account)
            .map(|packed| packed.decode().map_err(LedgerError::from))
            .transpose()
    }

    /// The character as it would look if touched at `now`: passive
    /// regeneration applied, nothing persisted.
    pub fn effective_character(
        &self,
        account: &AccountId,
        now: Timestamp,
    ) -> Result<Option<Character>, LedgerError> {
        let mut character = self.character(account)?;
        if let Some(character) = character.as_mut() {
            settle_regeneration(character, now, self.config.regen_window);
        }
        Ok(character)
    }

    pub fn can_fight(&self, account: &AccountId, now: Timestamp) -> Result<Eligibility, LedgerError> {
        let character = self.effective_character(account, now)?;
        Ok(checks::fight(character.as_ref()))
    }

    pub fn can_heal(&self, account: &AccountId, now: Timestamp) -> Result<Eligibility, LedgerError> {
        let character = self.effective_character(account, now)?;
        Ok(checks::heal(
            character.as_ref(),
            now,
            self.config.healing_cooldown,
        ))
    }

    pub fn can_resurrect(&self, account: &AccountId) -> Result<Eligibility, LedgerError> {
        let character = self.character(account)?;
        Ok(checks::resurrect(character.as_ref()))
    }

    pub fn can_continue_fight(&self, account: &AccountId) -> Result<Eligibility, LedgerError> {
        let character = self.character(account)?;
        let has_session = self.state.sessions.contains_key(account);
        Ok(checks::continue_fight(character.as_ref(), has_session))
    }

    #[cfg(feature = "serde")]
    pub fn to_snapshot(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    #[cfg(feature = "serde")]
    pub fn from_snapshot(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}

/// Applies a single call to a scratch state.
///
/// Split across the `character`, `combat`, and `treasury` submodules by
/// concern; each handler pushes its events onto `events`.
pub(crate) struct LedgerEngine<'a> {
    state: &'a mut LedgerState,
    config: &'a GameConfig,
    roster: &'a EnemyRoster,
    admin: AccountId,
    ctx: &'a CallContext,
    events: Vec<LedgerEvent>,
}

impl LedgerEngine<'_> {
    fn apply(&mut self, call: &LedgerCall) -> Result<(), LedgerError> {
        self.roll_epoch();

        if call.kind().is_admin() && self.ctx.caller != self.admin {
            return Err(LedgerError::new(ErrorCode::OnlyOwner).for_account(self.ctx.caller));
        }

        match call {
            LedgerCall::CreateCharacter { class } => self.create_character(*class),
            LedgerCall::FightEnemy {
                enemy_id,
                enemy_level,
            } => self.fight_enemy(*enemy_id, *enemy_level),
            LedgerCall::ContinueFight => self.continue_fight(),
            LedgerCall::FleeRound => self.flee_round(),
            LedgerCall::HealCharacter => self.heal_character(),
            LedgerCall::ResurrectCharacter => self.resurrect_character(),
            LedgerCall::ClaimReward {
                epoch,
                index,
                account,
                amount,
                proof,
            } => self.claim_reward(*epoch, *index, *account, *amount, proof),
            LedgerCall::FundEpoch { epoch, amount } => self.fund_epoch(*epoch, *amount),
            LedgerCall::PublishEpochRoot {
                epoch,
                root,
                total_allocated,
            } => self.publish_epoch_root(*epoch, *root, *total_allocated),
            LedgerCall::RollUnclaimedFunds { epoch } => self.roll_unclaimed_funds(*epoch),
            LedgerCall::ConsumeEpochReserve { epoch, amount } => {
                self.consume_epoch_reserve(*epoch, *amount)
            }
            LedgerCall::ConsumeEmergencyReserve { epoch, amount } => {
                self.consume_emergency_reserve(*epoch, *amount)
            }
        }
    }

    fn emit(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    fn caller(&self) -> AccountId {
        self.ctx.caller
    }

    fn now(&self) -> Timestamp {
        self.ctx.now
    }

    /// Lazy epoch rollover, performed before any call logic.
    fn roll_epoch(&mut self) {
        if let Some((from, to)) = self.state.epoch.advance(self.ctx.now) {
            debug!(from, to, "epoch advanced");
            self.emit(LedgerEvent::EpochAdvanced { from, to });
        }
    }

    fn load(&self, account: AccountId) -> Result<Option<Character>, LedgerError> {
        self.state
            .characters
            .get(&account)
            .map(|packed| packed.decode().map_err(|e| LedgerError::from(e).for_account(account)))
            .transpose()
    }

    /// Loads the character with passive regeneration settled at `now`.
    fn load_settled(&self, account: AccountId) -> Result<Option<Character>, LedgerError> {
        let mut character = self.load(account)?;
        if let Some(character) = character.as_mut() {
            settle_regeneration(character, self.ctx.now, self.config.regen_window);
        }
        Ok(character)
    }

    fn store(&mut self, account: AccountId, character: &Character) -> Result<(), LedgerError> {
        let packed = PackedCharacter::encode(character)
            .map_err(|e| LedgerError::from(e).for_account(account))?;
        self.state.characters.insert(account, packed);
        Ok(())
    }

    /// Takes the attached value as a fee of at least `required` and splits
    /// all of it across the pools.
    fn collect_fee(&mut self, required: Amount) -> Result<(), LedgerError> {
        let payer = self.ctx.caller;
        let value = self.ctx.value;
        if value < required {
            return Err(LedgerError::new(ErrorCode::InsufficientFee).for_account(payer));
        }
        if !self.state.debit(payer, value) {
            return Err(LedgerError::new(ErrorCode::InsufficientBalance).for_account(payer));
        }

        let shares = split_fee(value, &self.config.fee_split);
        self.state.pools.credit(&shares);
        self.emit(LedgerEvent::FeeDistributed { payer, shares });
        Ok(())
    }
}

#[cfg(test)]
mod tests;
