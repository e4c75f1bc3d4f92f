//! High-level runtime orchestrator.
//!
//! The runtime owns the ledger worker, wires up command/event channels, and
//! exposes a builder-based API for clients to drive the chain.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use client_blockchain_core::BlockInfo;
use game_core::{AccountId, Amount, EnemyRoster, GameConfig, Ledger, Timestamp};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::EventBus;
use crate::repository::{ChainSnapshot, FileSnapshotRepository, SnapshotRepository};
use crate::workers::{ChainClock, ClockMode, Command, LedgerWorker, WorkerSettings, system_now};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub game_config: GameConfig,
    pub roster: EnemyRoster,
    /// Account allowed to administer the reward treasury.
    pub admin: AccountId,
    /// Ledger time at genesis; wall clock if unset.
    pub genesis: Option<Timestamp>,
    /// Roll seed; random if unset.
    pub seed: Option<u64>,
    pub clock: ClockMode,
    /// Automatic block production period; `None` mines only on request.
    pub block_interval: Option<Duration>,
    pub confirmation_depth: u64,
    /// Blocks a finalized receipt stays queryable before it is forgotten.
    pub receipt_retention: u64,
    /// Load from and save to this file when set.
    pub snapshot_path: Option<PathBuf>,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game_config: GameConfig::default(),
            roster: EnemyRoster::default(),
            admin: AccountId::from_index(0),
            genesis: None,
            seed: None,
            clock: ClockMode::System,
            block_interval: None,
            confirmation_depth: 0,
            receipt_retention: 1_024,
            snapshot_path: None,
            event_buffer_size: 100,
            command_buffer_size: 32,
        }
    }
}

/// Main runtime that sequences ledger transactions
///
/// Design: Runtime owns the worker task.
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Shutdown the runtime gracefully
    ///
    /// The worker stops once every outstanding handle clone is dropped.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.worker_handle.await.map_err(RuntimeError::WorkerJoin)?;

        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    funding: Vec<(AccountId, Amount)>,
    snapshots: Option<Box<dyn SnapshotRepository>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            funding: Vec::new(),
            snapshots: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Genesis balance; ignored when resuming from a snapshot.
    pub fn fund(mut self, account: AccountId, amount: Amount) -> Self {
        self.funding.push((account, amount));
        self
    }

    /// Use a custom snapshot repository instead of `snapshot_path`.
    pub fn snapshot_repository(mut self, repo: impl SnapshotRepository + 'static) -> Self {
        self.snapshots = Some(Box::new(repo));
        self
    }

    fn genesis_snapshot(&self, genesis: Timestamp) -> Result<ChainSnapshot> {
        let seed = self.config.seed.unwrap_or_else(rand::random);
        let mut ledger = Ledger::new(
            self.config.game_config.clone(),
            self.config.roster.clone(),
            self.config.admin,
            genesis,
            seed,
        )?;
        for (account, amount) in &self.funding {
            ledger.mint(*account, *amount);
        }
        info!(genesis, admin = %self.config.admin, "starting fresh ledger");
        Ok(ChainSnapshot {
            head: BlockInfo {
                height: 0,
                timestamp: genesis,
            },
            ledger,
        })
    }

    /// Build the runtime
    pub async fn build(mut self) -> Result<Runtime> {
        let snapshots = match self.snapshots.take() {
            Some(repo) => Some(repo),
            None => match &self.config.snapshot_path {
                Some(path) => Some(Box::new(FileSnapshotRepository::new(path)?) as Box<dyn SnapshotRepository>),
                None => None,
            },
        };

        let genesis = self.config.genesis.unwrap_or_else(system_now);
        let restored = match &snapshots {
            Some(repo) => repo.load()?,
            None => None,
        };
        let snapshot = match restored {
            Some(snapshot) => {
                info!(height = snapshot.head.height, "resuming ledger from snapshot");
                snapshot
            }
            None => self.genesis_snapshot(genesis)?,
        };

        let clock = ChainClock::new(self.config.clock, genesis.max(snapshot.head.timestamp));
        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let handle = RuntimeHandle::new(command_tx, event_bus.clone());

        let worker = LedgerWorker::new(
            snapshot,
            clock,
            WorkerSettings {
                block_interval: self.config.block_interval,
                confirmation_depth: self.config.confirmation_depth,
                receipt_retention: self.config.receipt_retention,
            },
            command_rx,
            event_bus,
            snapshots,
        );

        let worker_handle = tokio::spawn(async move {
            worker.run().await;
        });

        Ok(Runtime {
            handle,
            worker_handle,
        })
    }
}
