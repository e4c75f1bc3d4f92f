//! Multi-round fight resolution: start, continue, flee.
use tracing::{debug, info};

use super::{CombatSession, LedgerEngine, checks};
use crate::character::{Character, EquipmentBonuses};
use crate::combat::{
    Combatant, EnemyId, MatchupStats, RoundRolls, combat_index, difficulty_multiplier,
    perform_round, scale_enemy_for_level,
};
use crate::config::GameConfig;
use crate::error::{ErrorCode, LedgerError};
use crate::event::{FightOutcome, FightSummary, LedgerEvent, RoundLog, RoundRecord};
use crate::progression::apply_experience;
use crate::rng::{CallRng, RollContext};
use crate::treasury::{Pool, refund_amount};
use crate::types::{AccountId, BASIS_POINTS};

/// XP paid for a victory: the base reward scaled by the multiplier, at least 1.
pub fn adjusted_xp(base_xp: u32, multiplier_bp: u32) -> u64 {
    (base_xp as u64 * multiplier_bp as u64 / BASIS_POINTS as u64).max(1)
}

/// Drop chance after the multiplier, capped at `max_bp`.
pub fn adjusted_drop_rate(base_bp: u32, multiplier_bp: u32, max_bp: u32) -> u32 {
    let scaled = base_bp as u64 * multiplier_bp as u64 / BASIS_POINTS as u64;
    scaled.min(max_bp as u64) as u32
}

/// Largest single bonus an equipment drop from an enemy of `enemy_level` can roll.
pub fn equipment_bonus_cap(enemy_level: u32) -> u32 {
    (1 + enemy_level / 5).min(u8::MAX as u32)
}

fn matchup(character: &Character) -> MatchupStats {
    MatchupStats {
        combat: character.total_combat(),
        defense: character.total_defense(),
        luck: character.total_luck(),
    }
}

impl LedgerEngine<'_> {
    pub(super) fn fight_enemy(&mut self, enemy_id: EnemyId, enemy_level: u32) -> Result<(), LedgerError> {
        let player = self.caller();
        let character = self.load_settled(player)?;
        checks::fight(character.as_ref())
            .into_result()
            .map_err(|e| e.for_account(player))?;
        let Some(mut character) = character else {
            return Err(LedgerError::new(ErrorCode::CharacterDoesNotExist).for_account(player));
        };
        if self.state.sessions.contains_key(&player) {
            return Err(LedgerError::new(ErrorCode::CharacterInCombat).for_account(player));
        }

        let base = self
            .roster
            .get(enemy_id)
            .ok_or_else(|| LedgerError::new(ErrorCode::EnemyDoesNotExist))?;
        if enemy_level == 0 || enemy_level > GameConfig::MAX_ENEMY_LEVEL {
            return Err(LedgerError::new(ErrorCode::InvalidEnemyLevel));
        }
        let enemy = scale_enemy_for_level(base, enemy_level);

        let index = combat_index(
            matchup(&character),
            MatchupStats {
                combat: enemy.combat,
                defense: enemy.defense,
                luck: enemy.luck,
            },
        );
        let multiplier_bp = difficulty_multiplier(index);
        self.emit(LedgerEvent::DifficultyMultiplierApplied {
            player,
            enemy_id,
            enemy_level,
            combat_index: index,
            multiplier_bp,
            base_xp: enemy.xp_reward,
            adjusted_xp: adjusted_xp(enemy.xp_reward, multiplier_bp),
            base_drop_rate_bp: enemy.drop_rate_bp,
            adjusted_drop_rate_bp: adjusted_drop_rate(
                enemy.drop_rate_bp,
                multiplier_bp,
                self.config.max_drop_rate_bp,
            ),
        });

        debug!(%player, enemy_id, enemy_level, index, multiplier_bp, "fight started");
        let session = CombatSession::start(
            enemy,
            character.current_endurance,
            index,
            multiplier_bp,
            self.now(),
        );
        character.set_in_combat(true);

        let outcome = self.resolve_rounds(player, character, session)?;
        self.refund_if_concluded(player, outcome)
    }

    pub(super) fn continue_fight(&mut self) -> Result<(), LedgerError> {
        let player = self.caller();
        let (character, session) = self.load_in_combat(player)?;
        let outcome = self.resolve_rounds(player, character, session)?;
        self.refund_if_concluded(player, outcome)
    }

    pub(super) fn flee_round(&mut self) -> Result<(), LedgerError> {
        let player = self.caller();
        let (character, session) = self.load_in_combat(player)?;
        info!(%player, enemy_id = session.enemy_id, "fled from fight");
        self.conclude(player, character, session, FightOutcome::Fled, RoundLog::new())
    }

    fn load_in_combat(
        &mut self,
        player: AccountId,
    ) -> Result<(Character, CombatSession), LedgerError> {
        let character = self.load(player)?;
        let has_session = self.state.sessions.contains_key(&player);
        checks::continue_fight(character.as_ref(), has_session)
            .into_result()
            .map_err(|e| e.for_account(player))?;
        let (Some(character), Some(session)) = (character, self.state.sessions.get(&player).cloned())
        else {
            return Err(LedgerError::new(ErrorCode::NoActiveCombat).for_account(player));
        };
        Ok((character, session))
    }

    /// Runs up to the per-call round budget, then concludes or persists.
    fn resolve_rounds(
        &mut self,
        player: AccountId,
        character: Character,
        mut session: CombatSession,
    ) -> Result<FightOutcome, LedgerError> {
        let rng = CallRng::new(self.state.seed, self.state.nonce, player);
        let budget = self.config.rounds_per_call.min(GameConfig::MAX_ROUNDS_PER_CALL);
        let mut rounds = RoundLog::new();

        let player_side = Combatant {
            combat: character.total_combat(),
            defense: character.total_defense(),
            luck: character.total_luck(),
            endurance: 0,
        };
        let enemy_side = Combatant {
            combat: session.enemy.combat,
            defense: session.enemy.defense,
            luck: session.enemy.luck,
            endurance: 0,
        };

        for _ in 0..budget {
            let round = session.rounds_elapsed + 1;
            let rolls = RoundRolls {
                player_crit: rng.roll_bp(RollContext::PlayerCritical { round }),
                enemy_crit: rng.roll_bp(RollContext::EnemyCritical { round }),
            };
            let outcome = perform_round(
                &Combatant {
                    endurance: session.player_endurance,
                    ..player_side
                },
                &Combatant {
                    endurance: session.enemy_endurance,
                    ..enemy_side
                },
                rolls,
                &self.config.combat,
            );

            session.player_endurance = outcome.player_endurance;
            session.enemy_endurance = outcome.enemy_endurance;
            session.rounds_elapsed = round;
            if rounds
                .try_push(RoundRecord {
                    round,
                    player_damage: outcome.player_damage_dealt,
                    enemy_damage: outcome.enemy_damage_dealt,
                    player_critical: outcome.player_critical,
                    enemy_critical: outcome.enemy_critical,
                })
                .is_err()
            {
                break;
            }
            if outcome.fight_over {
                break;
            }
        }
        session.last_updated = self.now();

        let outcome = if session.enemy_endurance == 0 {
            FightOutcome::Victory
        } else if session.player_endurance == 0 {
            FightOutcome::Defeat
        } else {
            FightOutcome::Unresolved
        };
        self.conclude(player, character, session, outcome, rounds)?;
        Ok(outcome)
    }

    /// Writes the result of one call back into the ledger.
    fn conclude(
        &mut self,
        player: AccountId,
        mut character: Character,
        session: CombatSession,
        outcome: FightOutcome,
        rounds: RoundLog,
    ) -> Result<(), LedgerError> {
        self.emit(LedgerEvent::FightSummary(FightSummary {
            player,
            enemy_id: session.enemy_id,
            enemy_level: session.enemy_level,
            rounds_elapsed: session.rounds_elapsed,
            player_start_endurance: session.player_start_endurance,
            player_endurance: session.player_endurance,
            enemy_start_endurance: session.enemy_start_endurance,
            enemy_endurance: session.enemy_endurance,
            outcome,
            rounds,
        }));

        if outcome == FightOutcome::Unresolved {
            character.set_in_combat(true);
            self.store(player, &character)?;
            self.state.sessions.insert(player, session);
            return Ok(());
        }

        self.state.sessions.remove(&player);
        character.set_in_combat(false);
        // Session endurance only ever falls, so committing it never heals.
        let committed = session.player_endurance.min(character.current_endurance);
        character.set_endurance(committed);
        character.last_update_at = self.now();

        match outcome {
            FightOutcome::Victory => self.reward_victory(player, &mut character, &session),
            FightOutcome::Defeat => {
                character.current_endurance = 0;
                character.set_alive(false);
                info!(%player, enemy_id = session.enemy_id, "character died");
                self.record_fight(player, session.enemy_level, false, 0);
            }
            FightOutcome::Fled | FightOutcome::Unresolved => {}
        }

        self.store(player, &character)
    }

    fn reward_victory(
        &mut self,
        player: AccountId,
        character: &mut Character,
        session: &CombatSession,
    ) {
        let xp = adjusted_xp(session.enemy.xp_reward, session.multiplier_bp);
        self.emit(LedgerEvent::FightXpReward { player, xp });
        for new_level in apply_experience(character, xp) {
            info!(%player, new_level, "level up");
            self.emit(LedgerEvent::LevelUp { player, new_level });
        }
        character.total_kills = character.total_kills.saturating_add(1);

        let rng = CallRng::new(self.state.seed, self.state.nonce, player);
        let drop_rate = adjusted_drop_rate(
            session.enemy.drop_rate_bp,
            session.multiplier_bp,
            self.config.max_drop_rate_bp,
        );
        if rng.roll_bp(RollContext::DropChance) < drop_rate {
            let cap = equipment_bonus_cap(session.enemy_level);
            let bonuses = EquipmentBonuses {
                combat: rng.range(RollContext::DropBonus { slot: 0 }, 1, cap),
                endurance: rng.range(RollContext::DropBonus { slot: 1 }, 0, cap),
                defense: rng.range(RollContext::DropBonus { slot: 2 }, 0, cap),
                luck: rng.range(RollContext::DropBonus { slot: 3 }, 0, cap),
            };
            character.equipment = bonuses;
            character.clamp_endurance();
            self.emit(LedgerEvent::EquipmentDropped {
                player,
                enemy_id: session.enemy_id,
                enemy_level: session.enemy_level,
                bonuses,
            });
        }

        self.record_fight(player, session.enemy_level, true, xp);
    }

    fn record_fight(
        &mut self,
        player: AccountId,
        enemy_level: u32,
        is_kill: bool,
        fight_score: u64,
    ) {
        let epoch = self.state.epoch.current;
        let score = self.state.scores.entry((epoch, player)).or_insert(0);
        *score = score.saturating_add(fight_score);
        self.emit(LedgerEvent::FightRecorded {
            epoch,
            player,
            enemy_level,
            is_kill,
            fight_score,
        });
    }

    /// The refund is paid once per fight, on the call that ends it.
    fn refund_if_concluded(&mut self, player: AccountId, outcome: FightOutcome) -> Result<(), LedgerError> {
        if outcome == FightOutcome::Unresolved {
            return Ok(());
        }
        self.issue_gas_refund(player)
    }

    /// Pays the per-fight gas refund, if the account and pool allow one.
    fn issue_gas_refund(&mut self, player: AccountId) -> Result<(), LedgerError> {
        let Some(character) = self.load(player)? else {
            return Ok(());
        };
        let epoch = self.state.epoch.current;
        let amount = refund_amount(
            &self.config.gas_refund,
            character.level,
            self.state.refunds_used(player, epoch),
            self.state.pools.gas_refund,
        );
        if amount == 0 {
            return Ok(());
        }

        self.state.pools.withdraw(Pool::GasRefund, amount)?;
        self.state.credit(player, amount);
        let used = self.state.refunds_used.entry((epoch, player)).or_insert(0);
        *used = used.saturating_add(amount);
        self.emit(LedgerEvent::GasRefundIssued {
            player,
            epoch,
            amount,
        });
        Ok(())
    }
}
