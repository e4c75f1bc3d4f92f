//! Orchestrator configuration structures and loaders.
use std::env;
use std::time::Duration;

/// Knobs for how actions are submitted and tracked.
#[derive(Clone, Debug)]
pub struct OrchestratorConfig {
    /// How long an action may wait for its receipt before failing.
    pub confirmation_timeout: Duration,
    pub poll_interval: Duration,
    /// Ask the ledger's `can_*` checks before sending.
    pub preflight: bool,
    /// Terminal action records kept for inspection.
    pub history_capacity: usize,
    /// Capacity of the refresh broadcast.
    pub refresh_buffer: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            confirmation_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(500),
            preflight: true,
            history_capacity: 50,
            refresh_buffer: 32,
        }
    }
}

impl OrchestratorConfig {
    /// Construct configuration from process environment variables.
    ///
    /// - `BRAWLER_CONFIRM_TIMEOUT_SECS`
    /// - `BRAWLER_POLL_INTERVAL_MS`
    /// - `BRAWLER_PREFLIGHT`
    /// - `BRAWLER_HISTORY_CAPACITY`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(secs) = read_env::<u64>("BRAWLER_CONFIRM_TIMEOUT_SECS") {
            config.confirmation_timeout = Duration::from_secs(secs.max(1));
        }

        if let Some(millis) = read_env::<u64>("BRAWLER_POLL_INTERVAL_MS") {
            config.poll_interval = Duration::from_millis(millis.max(1));
        }

        if let Some(preflight) = read_env::<bool>("BRAWLER_PREFLIGHT") {
            config.preflight = preflight;
        }

        if let Some(capacity) = read_env::<usize>("BRAWLER_HISTORY_CAPACITY") {
            config.history_capacity = capacity.max(1);
        }

        config
    }
}

pub(crate) fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
