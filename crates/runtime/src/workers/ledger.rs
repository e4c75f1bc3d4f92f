//! Ledger worker that owns the authoritative [`game_core::Ledger`].
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), queues
//! submitted transactions in a mempool, executes them in blocks via
//! [`Ledger::execute`], and publishes the emitted events to the EventBus.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use client_blockchain_core::{
    BlockInfo, ChainEvent, Receipt, ReceiptOutcome, TransactionData, TransactionId,
    TransactionStatus,
};
use game_core::{AccountId, Amount, CallContext, Ledger, LedgerError, LedgerQuery, QueryValue, Timestamp};

use super::clock::ChainClock;
use crate::api::{Result, RuntimeError};
use crate::events::{BlockEvent, Event, EventBus};
use crate::repository::{ChainSnapshot, SnapshotRepository};
use crate::utils::transaction_id;

/// Commands that can be sent to the ledger worker
pub enum Command {
    /// Queue a transaction for the next block.
    Submit {
        tx: TransactionData,
        reply: oneshot::Sender<Result<TransactionId>>,
    },
    /// Look up where a transaction is; `None` if never seen.
    Status {
        id: TransactionId,
        reply: oneshot::Sender<Option<TransactionStatus>>,
    },
    /// Answer a read-only query as of the current ledger time.
    Query {
        query: LedgerQuery,
        reply: oneshot::Sender<std::result::Result<QueryValue, LedgerError>>,
    },
    LatestBlock {
        reply: oneshot::Sender<BlockInfo>,
    },
    /// Produce a block now, regardless of the block interval.
    MineBlock {
        reply: oneshot::Sender<BlockInfo>,
    },
    AdvanceTime {
        seconds: Timestamp,
        reply: oneshot::Sender<Timestamp>,
    },
    /// Credit native balance out of thin air (faucet).
    Mint {
        account: AccountId,
        amount: Amount,
        reply: oneshot::Sender<()>,
    },
    /// Clone of the current ledger (read-only).
    Snapshot { reply: oneshot::Sender<Ledger> },
}

/// Static settings the worker runs with.
pub struct WorkerSettings {
    pub block_interval: Option<Duration>,
    /// Blocks on top of the inclusion block before a receipt is final.
    pub confirmation_depth: u64,
    /// Blocks past finality a receipt is kept for status lookups.
    pub receipt_retention: u64,
}

/// Background task that sequences transactions into blocks.
///
/// Every call executes against the ledger one at a time, so mutations are
/// serialized per player and across players.
pub struct LedgerWorker {
    ledger: Ledger,
    clock: ChainClock,
    head: BlockInfo,
    mempool: VecDeque<(TransactionId, TransactionData)>,
    receipts: HashMap<TransactionId, Receipt>,
    sequence: u64,
    settings: WorkerSettings,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    snapshots: Option<Box<dyn SnapshotRepository>>,
}

impl LedgerWorker {
    pub fn new(
        snapshot: ChainSnapshot,
        clock: ChainClock,
        settings: WorkerSettings,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
        snapshots: Option<Box<dyn SnapshotRepository>>,
    ) -> Self {
        info!(
            height = snapshot.head.height,
            players = snapshot.ledger.state().players.len(),
            "LedgerWorker initialized"
        );

        Self {
            ledger: snapshot.ledger,
            clock,
            head: snapshot.head,
            mempool: VecDeque::new(),
            receipts: HashMap::new(),
            sequence: 0,
            settings,
            command_rx,
            event_bus,
            snapshots,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        let mut ticker = self.settings.block_interval.map(|period| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                _ = next_tick(&mut ticker) => {
                    self.produce_block();
                }
            }
        }
        debug!("LedgerWorker stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Submit { tx, reply } => {
                let result = self.handle_submit(tx);
                if reply.send(result).is_err() {
                    debug!("Submit reply channel closed (caller dropped)");
                }
            }
            Command::Status { id, reply } => {
                if reply.send(self.status(&id)).is_err() {
                    debug!("Status reply channel closed (caller dropped)");
                }
            }
            Command::Query { query, reply } => {
                let result = self.ledger.query(&query, self.ledger_time());
                if reply.send(result).is_err() {
                    debug!("Query reply channel closed (caller dropped)");
                }
            }
            Command::LatestBlock { reply } => {
                let _ = reply.send(self.head);
            }
            Command::MineBlock { reply } => {
                let block = self.produce_block();
                if reply.send(block).is_err() {
                    debug!("MineBlock reply channel closed (caller dropped)");
                }
            }
            Command::AdvanceTime { seconds, reply } => {
                let now = self.clock.advance(seconds);
                debug!(seconds, now, "ledger time advanced");
                let _ = reply.send(now);
            }
            Command::Mint {
                account,
                amount,
                reply,
            } => {
                self.ledger.mint(account, amount);
                info!(%account, amount, "minted");
                let _ = reply.send(());
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.ledger.clone());
            }
        }
    }

    /// Block time never runs backwards even if the clock does.
    fn ledger_time(&self) -> Timestamp {
        self.clock.now().max(self.head.timestamp)
    }

    /// Admits a transaction if the sender can cover its value on top of
    /// everything it already has waiting in the mempool.
    fn handle_submit(&mut self, tx: TransactionData) -> Result<TransactionId> {
        let queued: Amount = self
            .mempool
            .iter()
            .filter(|(_, pending)| pending.sender == tx.sender)
            .map(|(_, pending)| pending.value)
            .sum();
        let available = self.ledger.state().balance(&tx.sender).saturating_sub(queued);
        if tx.value > available {
            return Err(RuntimeError::InsufficientFunds {
                required: tx.value,
                available,
            });
        }

        self.sequence += 1;
        let id = transaction_id(&tx, self.sequence).map_err(RuntimeError::Encoding)?;
        debug!(tx = %id.short(), sender = %tx.sender, call = %tx.call.kind(), "transaction queued");
        self.mempool.push_back((id.clone(), tx));
        Ok(id)
    }

    fn status(&self, id: &TransactionId) -> Option<TransactionStatus> {
        if self.mempool.iter().any(|(queued, _)| queued == id) {
            return Some(TransactionStatus::Pending);
        }
        let receipt = self.receipts.get(id)?;
        let confirmations = self.head.height.saturating_sub(receipt.block.height);
        if confirmations >= self.settings.confirmation_depth {
            Some(TransactionStatus::Finalized(receipt.clone()))
        } else {
            Some(TransactionStatus::Confirming {
                block: receipt.block,
                confirmations,
            })
        }
    }

    /// Executes the whole mempool in one block.
    fn produce_block(&mut self) -> BlockInfo {
        let block = BlockInfo {
            height: self.head.height + 1,
            timestamp: self.ledger_time(),
        };
        let transactions: Vec<_> = self.mempool.drain(..).collect();
        let mut reverted = 0;

        for (id, tx) in &transactions {
            let ctx = CallContext::new(tx.sender, block.timestamp).with_value(tx.value);
            let outcome = match self.ledger.execute(&ctx, &tx.call) {
                Ok(events) => {
                    for event in &events {
                        self.event_bus.publish(Event::Ledger(ChainEvent {
                            block,
                            transaction_id: id.clone(),
                            event: event.clone(),
                        }));
                    }
                    ReceiptOutcome::Success { events }
                }
                Err(error) => {
                    reverted += 1;
                    debug!(tx = %id.short(), %error, "transaction reverted");
                    ReceiptOutcome::Reverted { error }
                }
            };
            self.receipts.insert(
                id.clone(),
                Receipt {
                    transaction_id: id.clone(),
                    block,
                    outcome,
                },
            );
        }

        self.head = block;
        self.prune_receipts();
        self.event_bus.publish(Event::Block(BlockEvent {
            block,
            transactions: transactions.len(),
            reverted,
        }));
        if !transactions.is_empty() {
            debug!(
                height = block.height,
                transactions = transactions.len(),
                reverted,
                "block produced"
            );
            self.persist();
        }
        block
    }

    /// Forgets receipts that finalized more than `receipt_retention` blocks ago.
    fn prune_receipts(&mut self) {
        let window = self
            .settings
            .confirmation_depth
            .saturating_add(self.settings.receipt_retention);
        let Some(oldest) = self.head.height.checked_sub(window) else {
            return;
        };
        let before = self.receipts.len();
        self.receipts.retain(|_, receipt| receipt.block.height >= oldest);
        let pruned = before - self.receipts.len();
        if pruned > 0 {
            debug!(pruned, oldest, "expired receipts pruned");
        }
    }

    fn persist(&self) {
        let Some(repo) = &self.snapshots else {
            return;
        };
        let snapshot = ChainSnapshot {
            head: self.head,
            ledger: self.ledger.clone(),
        };
        if let Err(error) = repo.save(&snapshot) {
            warn!(%error, height = self.head.height, "failed to persist snapshot");
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
