//! Ledger time source.

use game_core::Timestamp;
use serde::{Deserialize, Serialize};

/// Where block timestamps come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClockMode {
    /// Wall clock plus any manual advance.
    #[default]
    System,
    /// Frozen at genesis; only [`ChainClock::advance`] moves it.
    Manual,
}

pub(crate) fn system_now() -> Timestamp {
    chrono::Utc::now().timestamp().max(0) as Timestamp
}

#[derive(Debug, Clone)]
pub struct ChainClock {
    mode: ClockMode,
    base: Timestamp,
    offset: Timestamp,
}

impl ChainClock {
    pub fn new(mode: ClockMode, genesis: Timestamp) -> Self {
        Self {
            mode,
            base: genesis,
            offset: 0,
        }
    }

    pub fn now(&self) -> Timestamp {
        let base = match self.mode {
            ClockMode::System => system_now().max(self.base),
            ClockMode::Manual => self.base,
        };
        base.saturating_add(self.offset)
    }

    pub fn advance(&mut self, seconds: Timestamp) -> Timestamp {
        self.offset = self.offset.saturating_add(seconds);
        self.now()
    }
}
