//! Leveling, healing, resurrection, and passive regeneration.
//!
//! These functions mutate a decoded [`Character`]; fee collection and
//! eligibility checks happen in the engine before they are called.
use crate::character::{BaseStats, Character, PackedField};
use crate::types::Timestamp;

/// XP needed to leave level 1. Each later level needs proportionally more.
pub const XP_PER_LEVEL: u64 = 100;

/// Stat increments granted on every level-up.
pub const LEVEL_UP_GROWTH: BaseStats = BaseStats::new(2, 5, 1, 1);

/// XP that must be accumulated at `level` to reach the next level.
///
/// Strictly increasing in level.
pub const fn xp_required_for_level(level: u32) -> u64 {
    let level = if level == 0 { 1 } else { level };
    XP_PER_LEVEL * level as u64
}

fn level_up(character: &mut Character) {
    character.level += 1;
    character.base_endurance += LEVEL_UP_GROWTH.endurance;
    character.base_combat += LEVEL_UP_GROWTH.combat;
    character.base_defense += LEVEL_UP_GROWTH.defense;
    character.base_luck += LEVEL_UP_GROWTH.luck;
    let raised = character.current_endurance + LEVEL_UP_GROWTH.endurance;
    character.set_endurance(raised);
}

/// Adds XP and applies every level-up it pays for.
///
/// Surplus XP carries into the next level. Returns each level reached, in
/// order. At the level cap XP keeps accruing up to the field maximum.
pub fn apply_experience(character: &mut Character, gained: u64) -> Vec<u32> {
    character.experience = character.experience.saturating_add(gained);

    let mut reached = Vec::new();
    while !character.is_max_level() {
        let needed = xp_required_for_level(character.level);
        if character.experience < needed {
            break;
        }
        character.experience -= needed;
        level_up(character);
        reached.push(character.level);
    }

    character.experience = character.experience.min(PackedField::Experience.max());
    reached
}

/// Endurance passive regeneration would add at `now`, not yet applied.
///
/// Regeneration restores the full maximum over `window` seconds, only while
/// alive and out of combat, and never beyond the maximum.
pub fn pending_regeneration(character: &Character, now: Timestamp, window: Timestamp) -> u32 {
    if !character.is_alive() || character.in_combat() || character.is_full_health() || window == 0 {
        return 0;
    }

    let elapsed = now.saturating_sub(character.last_update_at).min(window);
    let max = character.max_endurance();
    let regenerated = (max as u64 * elapsed / window) as u32;
    regenerated.min(max - character.current_endurance)
}

/// Applies pending regeneration and returns the amount added.
pub fn settle_regeneration(character: &mut Character, now: Timestamp, window: Timestamp) -> u32 {
    let amount = pending_regeneration(character, now, window);
    if amount > 0 {
        character.current_endurance += amount;
    }
    if amount > 0 || character.is_full_health() {
        character.last_update_at = now;
    }
    amount
}

/// Restores endurance to the maximum and starts the healing cooldown.
pub fn heal(character: &mut Character, now: Timestamp) -> u32 {
    character.current_endurance = character.max_endurance();
    character.last_heal_at = now;
    character.last_update_at = now;
    character.current_endurance
}

/// Revives a dead character at half its maximum endurance (rounded down).
///
/// Level, XP, kills, and equipment are untouched.
pub fn resurrect(character: &mut Character, now: Timestamp) -> u32 {
    character.set_alive(true);
    character.set_in_combat(false);
    character.current_endurance = character.max_endurance() / 2;
    character.last_update_at = now;
    character.current_endurance
}

pub fn healing_cooldown_remaining(character: &Character, now: Timestamp, cooldown: Timestamp) -> Timestamp {
    if character.last_heal_at == 0 {
        return 0;
    }
    character
        .last_heal_at
        .saturating_add(cooldown)
        .saturating_sub(now)
}
