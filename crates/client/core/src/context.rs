//! Explicit client context handed to everything that talks to the ledger.
use std::sync::Arc;

use client_blockchain_core::{GameBlockchain, Wallet};
use game_core::AccountId;

use crate::config::OrchestratorConfig;

/// Ledger connection, signing identity and settings for one player session.
///
/// Cheap to clone; all clones share the same backend and wallet.
#[derive(Clone)]
pub struct ClientContext {
    pub ledger: Arc<dyn GameBlockchain>,
    pub wallet: Arc<dyn Wallet>,
    pub config: OrchestratorConfig,
}

impl ClientContext {
    pub fn new(ledger: Arc<dyn GameBlockchain>, wallet: Arc<dyn Wallet>) -> Self {
        Self {
            ledger,
            wallet,
            config: OrchestratorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Account the wallet signs for.
    pub fn account(&self) -> AccountId {
        self.wallet.account()
    }
}

impl std::fmt::Debug for ClientContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientContext")
            .field("backend", &self.ledger.name())
            .field("network", &self.ledger.network())
            .field("account", &self.wallet.account())
            .field("config", &self.config)
            .finish()
    }
}
