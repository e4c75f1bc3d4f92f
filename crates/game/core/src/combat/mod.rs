//! Combat math: matchup scoring, enemy scaling, and round resolution.
//!
//! Everything here is pure. The stateful multi-call fight lives in
//! [`crate::engine`].
mod enemy;
mod math;
mod round;

pub use enemy::{
    EnemyBase, EnemyId, EnemyRoster, EnemyStats, MAX_SCALED_STAT, enemy_name,
    scale_enemy_for_level,
};
pub use math::{
    MAX_MULTIPLIER_BP, MIN_MULTIPLIER_BP, MatchupStats, combat_index, difficulty_multiplier,
};
pub use round::{
    Combatant, RoundOutcome, RoundRolls, critical_chance_bp, perform_round, strike_damage,
};
