//! Binary configuration loaded from `BRAWLER_*` environment variables.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use client_core::OrchestratorConfig;
use game_core::{AccountId, Amount, EnemyId, GameConfig, UNIT};
use runtime::{ClockMode, FileSnapshotRepository, RuntimeConfig};

/// Everything the demo session needs to start.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Write logs to a file in this directory as well as stderr.
    pub log_dir: Option<PathBuf>,
    pub runtime: RuntimeConfig,
    pub orchestrator: OrchestratorConfig,
    pub player: AccountId,
    /// Genesis balance for the player.
    pub faucet: Amount,
    pub enemy_id: EnemyId,
    pub enemy_level: u32,
    /// Continue calls before giving up on an unresolved fight.
    pub max_continues: usize,
    /// Fast-forward to the end of the epoch and run the reward cycle.
    pub settle_epoch: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            runtime: RuntimeConfig {
                clock: ClockMode::Manual,
                block_interval: Some(Duration::from_millis(250)),
                ..RuntimeConfig::default()
            },
            orchestrator: OrchestratorConfig {
                poll_interval: Duration::from_millis(100),
                ..OrchestratorConfig::default()
            },
            player: AccountId::from_index(1),
            faucet: 100 * UNIT,
            enemy_id: 1,
            enemy_level: 1,
            max_continues: 20,
            settle_epoch: true,
        }
    }
}

impl ClientConfig {
    /// Construct configuration from process environment variables.
    ///
    /// - `BRAWLER_LOG_DIR` / `BRAWLER_LOG_FILE`
    /// - `BRAWLER_SEED` / `BRAWLER_ROUNDS_PER_CALL`
    /// - `BRAWLER_BLOCK_INTERVAL_MS` (`0` mines only on demand)
    /// - `BRAWLER_CONFIRMATIONS` / `BRAWLER_RECEIPT_RETENTION`
    /// - `BRAWLER_SNAPSHOT_PATH` / `BRAWLER_PERSIST`
    /// - `BRAWLER_SYSTEM_CLOCK`
    /// - `BRAWLER_PLAYER` / `BRAWLER_FAUCET_UNITS`
    /// - `BRAWLER_ENEMY_ID` / `BRAWLER_ENEMY_LEVEL` / `BRAWLER_MAX_CONTINUES`
    /// - `BRAWLER_SETTLE_EPOCH`
    /// - orchestrator variables, see [`OrchestratorConfig::from_env`]
    pub fn from_env() -> Self {
        let mut config = Self {
            orchestrator: OrchestratorConfig::from_env(),
            ..Self::default()
        };

        if let Some(dir) = read_env::<PathBuf>("BRAWLER_LOG_DIR") {
            config.log_dir = Some(dir);
        } else if read_env::<bool>("BRAWLER_LOG_FILE").unwrap_or(false) {
            config.log_dir = Some(default_log_dir());
        }

        if let Some(seed) = read_env::<u64>("BRAWLER_SEED") {
            config.runtime.seed = Some(seed);
        }

        if let Some(rounds) = read_env::<usize>("BRAWLER_ROUNDS_PER_CALL") {
            config.runtime.game_config = GameConfig::default().with_rounds_per_call(rounds);
        }

        if let Some(millis) = read_env::<u64>("BRAWLER_BLOCK_INTERVAL_MS") {
            config.runtime.block_interval = (millis > 0).then(|| Duration::from_millis(millis));
        }

        if let Some(depth) = read_env::<u64>("BRAWLER_CONFIRMATIONS") {
            config.runtime.confirmation_depth = depth;
        }

        if let Some(blocks) = read_env::<u64>("BRAWLER_RECEIPT_RETENTION") {
            config.runtime.receipt_retention = blocks;
        }

        if let Some(path) = read_env::<PathBuf>("BRAWLER_SNAPSHOT_PATH") {
            config.runtime.snapshot_path = Some(path);
        } else if read_env::<bool>("BRAWLER_PERSIST").unwrap_or(false) {
            config.runtime.snapshot_path = Some(FileSnapshotRepository::default_path());
        }

        if read_env::<bool>("BRAWLER_SYSTEM_CLOCK").unwrap_or(false) {
            config.runtime.clock = ClockMode::System;
        }

        if let Some(player) = read_env::<AccountId>("BRAWLER_PLAYER") {
            config.player = player;
        }

        if let Some(units) = read_env::<u64>("BRAWLER_FAUCET_UNITS") {
            config.faucet = units as Amount * UNIT;
        }

        if let Some(enemy_id) = read_env::<EnemyId>("BRAWLER_ENEMY_ID") {
            config.enemy_id = enemy_id;
        }

        if let Some(level) = read_env::<u32>("BRAWLER_ENEMY_LEVEL") {
            config.enemy_level = level.max(1);
        }

        if let Some(continues) = read_env::<usize>("BRAWLER_MAX_CONTINUES") {
            config.max_continues = continues;
        }

        if let Some(settle) = read_env::<bool>("BRAWLER_SETTLE_EPOCH") {
            config.settle_epoch = settle;
        }

        config
    }
}

/// Platform cache directory, e.g. `~/.cache/brawler/logs` on Linux.
fn default_log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "brawler")
        .map(|dirs| dirs.cache_dir().join("logs"))
        .unwrap_or_else(|| env::temp_dir().join("brawler").join("logs"))
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
