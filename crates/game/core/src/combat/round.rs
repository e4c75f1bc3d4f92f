//! Single-round exchange between player and enemy.
use crate::config::CombatTuning;
use crate::types::BASIS_POINTS;

/// One side of an exchange.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combatant {
    pub combat: u32,
    pub defense: u32,
    pub luck: u32,
    pub endurance: u32,
}

/// Uniform rolls in `0..10000` deciding each side's critical check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoundRolls {
    pub player_crit: u32,
    pub enemy_crit: u32,
}

impl RoundRolls {
    /// Rolls that never crit.
    pub const NONE: Self = Self {
        player_crit: BASIS_POINTS,
        enemy_crit: BASIS_POINTS,
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundOutcome {
    pub player_damage_dealt: u32,
    pub enemy_damage_dealt: u32,
    pub player_endurance: u32,
    pub enemy_endurance: u32,
    pub player_critical: bool,
    pub enemy_critical: bool,
    /// Either side reached zero endurance.
    pub fight_over: bool,
}

/// Critical-hit chance for a luck value, in basis points.
pub fn critical_chance_bp(luck: u32, tuning: &CombatTuning) -> u32 {
    tuning
        .crit_base_bp
        .saturating_add(luck.saturating_mul(tuning.crit_per_luck_bp))
        .min(tuning.crit_cap_bp)
}

/// Damage of one strike.
///
/// ```text
/// raw   = combat - defense / defense_divisor   (never below zero)
/// final = max(raw, min_damage), then * crit_multiplier_pct / 100 on a crit
/// ```
pub fn strike_damage(attacker_combat: u32, defender_defense: u32, critical: bool, tuning: &CombatTuning) -> u32 {
    let reduction = defender_defense / tuning.defense_divisor.max(1);
    let damage = attacker_combat.saturating_sub(reduction).max(tuning.min_damage);
    if critical {
        damage.saturating_mul(tuning.crit_multiplier_pct) / 100
    } else {
        damage
    }
}

/// Resolves one round.
///
/// The player strikes first. An enemy brought to zero deals no damage that
/// round. Endurance never goes below zero. If either side starts the round at
/// zero nothing happens and the fight is reported as over.
pub fn perform_round(
    player: &Combatant,
    enemy: &Combatant,
    rolls: RoundRolls,
    tuning: &CombatTuning,
) -> RoundOutcome {
    if player.endurance == 0 || enemy.endurance == 0 {
        return RoundOutcome {
            player_damage_dealt: 0,
            enemy_damage_dealt: 0,
            player_endurance: player.endurance,
            enemy_endurance: enemy.endurance,
            player_critical: false,
            enemy_critical: false,
            fight_over: true,
        };
    }

    let player_critical = rolls.player_crit < critical_chance_bp(player.luck, tuning);
    let player_damage = strike_damage(player.combat, enemy.defense, player_critical, tuning);
    let enemy_endurance = enemy.endurance.saturating_sub(player_damage);

    if enemy_endurance == 0 {
        return RoundOutcome {
            player_damage_dealt: player_damage,
            enemy_damage_dealt: 0,
            player_endurance: player.endurance,
            enemy_endurance,
            player_critical,
            enemy_critical: false,
            fight_over: true,
        };
    }

    let enemy_critical = rolls.enemy_crit < critical_chance_bp(enemy.luck, tuning);
    let enemy_damage = strike_damage(enemy.combat, player.defense, enemy_critical, tuning);
    let player_endurance = player.endurance.saturating_sub(enemy_damage);

    RoundOutcome {
        player_damage_dealt: player_damage,
        enemy_damage_dealt: enemy_damage,
        player_endurance,
        enemy_endurance,
        player_critical,
        enemy_critical,
        fight_over: player_endurance == 0,
    }
}
