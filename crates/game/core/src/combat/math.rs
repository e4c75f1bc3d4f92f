//! Matchup scoring: combat index and difficulty multiplier.

/// Multiplier floor (very easy fights), in basis points.
pub const MIN_MULTIPLIER_BP: u32 = 500;
/// Multiplier ceiling (very hard fights), in basis points.
pub const MAX_MULTIPLIER_BP: u32 = 100_000;

/// Anchor points `(combat index, multiplier bp)` in ascending index order.
///
/// The multiplier is linear between anchors and saturates outside them.
const MULTIPLIER_CURVE: [(i64, u32); 8] = [
    (-25, MAX_MULTIPLIER_BP),
    (-15, 50_000),
    (-10, 35_000),
    (-5, 20_000),
    (0, 8_000),
    (10, 2_000),
    (15, 1_250),
    (20, MIN_MULTIPLIER_BP),
];

/// Offensive/defensive attributes compared by [`combat_index`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchupStats {
    pub combat: u32,
    pub defense: u32,
    pub luck: u32,
}

/// Signed strength difference between player and enemy.
///
/// ```text
/// index = (player.combat - enemy.defense)
///       - (enemy.combat - player.defense)
///       + (player.luck - enemy.luck) / 2
/// ```
///
/// Positive favors the player. Swapping the sides negates the index.
pub fn combat_index(player: MatchupStats, enemy: MatchupStats) -> i64 {
    let player_edge = player.combat as i64 - enemy.defense as i64;
    let enemy_edge = enemy.combat as i64 - player.defense as i64;
    let luck_edge = (player.luck as i64 - enemy.luck as i64) / 2;
    player_edge - enemy_edge + luck_edge
}

/// Reward multiplier for a matchup: harder fights pay more.
///
/// Non-increasing in `index`, bounded to
/// [`MIN_MULTIPLIER_BP`]..=[`MAX_MULTIPLIER_BP`].
pub fn difficulty_multiplier(index: i64) -> u32 {
    let (first_index, first_bp) = MULTIPLIER_CURVE[0];
    if index <= first_index {
        return first_bp;
    }

    for pair in MULTIPLIER_CURVE.windows(2) {
        let (lo_index, lo_bp) = pair[0];
        let (hi_index, hi_bp) = pair[1];
        if index <= hi_index {
            let span = hi_index - lo_index;
            let offset = index - lo_index;
            let drop = (lo_bp as i64 - hi_bp as i64) * offset / span;
            return (lo_bp as i64 - drop) as u32;
        }
    }

    MIN_MULTIPLIER_BP
}
