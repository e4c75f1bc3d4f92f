//! Enemy definitions and level scaling.
use std::collections::BTreeMap;

use crate::types::BASIS_POINTS;

pub type EnemyId = u16;

/// Static level-1 definition of an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyBase {
    pub id: EnemyId,
    pub combat: u32,
    pub endurance: u32,
    pub defense: u32,
    pub luck: u32,
    pub xp_reward: u32,
    pub drop_rate_bp: u32,
}

/// An enemy scaled to a concrete level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyStats {
    pub id: EnemyId,
    pub level: u32,
    pub combat: u32,
    pub endurance: u32,
    pub defense: u32,
    pub luck: u32,
    pub xp_reward: u32,
    pub drop_rate_bp: u32,
}

/// Per-level growth applied by [`scale_enemy_for_level`], in basis points.
const COMBAT_GROWTH_BP: u64 = 1_000;
const ENDURANCE_GROWTH_BP: u64 = 1_500;
const DEFENSE_GROWTH_BP: u64 = 800;
const LUCK_GROWTH_BP: u64 = 300;
const XP_GROWTH_BP: u64 = 1_200;

/// Scaled stats never exceed this, keeping them inside the 16-bit ledger fields.
pub const MAX_SCALED_STAT: u32 = u16::MAX as u32;

fn grow(base: u32, level: u32, growth_bp: u64) -> u32 {
    let steps = level.saturating_sub(1) as u64;
    let factor = BASIS_POINTS as u64 + steps * growth_bp;
    let scaled = base as u64 * factor / BASIS_POINTS as u64;
    scaled.min(MAX_SCALED_STAT as u64) as u32
}

/// Scales a base definition to `level`.
///
/// Level 1 returns the base values; every stat is non-decreasing in level.
/// The drop rate is not scaled.
pub fn scale_enemy_for_level(base: &EnemyBase, level: u32) -> EnemyStats {
    EnemyStats {
        id: base.id,
        level,
        combat: grow(base.combat, level, COMBAT_GROWTH_BP),
        endurance: grow(base.endurance, level, ENDURANCE_GROWTH_BP),
        defense: grow(base.defense, level, DEFENSE_GROWTH_BP),
        luck: grow(base.luck, level, LUCK_GROWTH_BP),
        xp_reward: grow(base.xp_reward, level, XP_GROWTH_BP),
        drop_rate_bp: base.drop_rate_bp,
    }
}

/// `(name, combat, endurance, defense, luck, xp, drop bp)` indexed by id - 1.
const DEFAULT_ROSTER: [(&str, u32, u32, u32, u32, u32, u32); 15] = [
    ("Goblin Warrior", 6, 8, 2, 1, 25, 500),
    ("Orc Berserker", 8, 10, 3, 1, 35, 400),
    ("Shadow Assassin", 12, 12, 4, 1, 45, 300),
    ("Ice Troll", 14, 20, 6, 2, 60, 300),
    ("Fire Elemental", 18, 16, 5, 3, 75, 280),
    ("Stone Golem", 16, 30, 10, 1, 90, 260),
    ("Dark Wizard", 22, 18, 6, 4, 110, 250),
    ("Skeleton Knight", 20, 26, 9, 2, 130, 240),
    ("Dragon Whelp", 26, 28, 8, 3, 160, 220),
    ("Void Stalker", 30, 24, 7, 6, 190, 200),
    ("Ancient Dragon", 40, 60, 14, 5, 300, 150),
    ("Crystal Beast", 28, 40, 16, 3, 220, 180),
    ("Shadow Demon", 36, 36, 10, 7, 260, 170),
    ("Frost Giant", 34, 55, 15, 2, 280, 160),
    ("Lava Dragon", 44, 50, 14, 6, 340, 140),
];

/// Display name for a default-roster enemy.
pub fn enemy_name(id: EnemyId) -> Option<&'static str> {
    let index = (id as usize).checked_sub(1)?;
    DEFAULT_ROSTER.get(index).map(|row| row.0)
}

/// Set of enemies the ledger accepts fights against.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyRoster {
    enemies: BTreeMap<EnemyId, EnemyBase>,
}

impl EnemyRoster {
    pub fn empty() -> Self {
        Self {
            enemies: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_enemy(mut self, enemy: EnemyBase) -> Self {
        self.insert(enemy);
        self
    }

    pub fn insert(&mut self, enemy: EnemyBase) {
        self.enemies.insert(enemy.id, enemy);
    }

    pub fn get(&self, id: EnemyId) -> Option<&EnemyBase> {
        self.enemies.get(&id)
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnemyBase> {
        self.enemies.values()
    }
}

impl Default for EnemyRoster {
    fn default() -> Self {
        let mut roster = Self::empty();
        for (i, &(_, combat, endurance, defense, luck, xp_reward, drop_rate_bp)) in
            DEFAULT_ROSTER.iter().enumerate()
        {
            roster.insert(EnemyBase {
                id: i as EnemyId + 1,
                combat,
                endurance,
                defense,
                luck,
                xp_reward,
                drop_rate_bp,
            });
        }
        roster
    }
}
