//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! submitting transactions, driving block production, and streaming events
//! from specific topics.
use std::collections::HashMap;

use tokio::sync::{broadcast, mpsc, oneshot};

use client_blockchain_core::{BlockInfo, ChainEvent, TransactionData, TransactionId, TransactionStatus};
use game_core::{AccountId, Amount, Ledger, LedgerQuery, QueryValue, Timestamp};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Queue a transaction for the next block.
    ///
    /// Rejected up front if the sender cannot cover the attached value.
    pub async fn submit(&self, tx: TransactionData) -> Result<TransactionId> {
        self.request(|reply| Command::Submit { tx, reply }).await?
    }

    /// Where a transaction is; `None` if the runtime never saw it.
    pub async fn transaction_status(&self, id: &TransactionId) -> Result<Option<TransactionStatus>> {
        let id = id.clone();
        self.request(|reply| Command::Status { id, reply }).await
    }

    /// Answer a read-only ledger query as of the current ledger time.
    pub async fn query(&self, query: LedgerQuery) -> Result<QueryValue> {
        self.request(|reply| Command::Query { query, reply })
            .await?
            .map_err(RuntimeError::Query)
    }

    pub async fn latest_block(&self) -> Result<BlockInfo> {
        self.request(|reply| Command::LatestBlock { reply }).await
    }

    /// Produce a block immediately with everything in the mempool.
    pub async fn mine_block(&self) -> Result<BlockInfo> {
        self.request(|reply| Command::MineBlock { reply }).await
    }

    /// Move ledger time forward; returns the new time.
    pub async fn advance_time(&self, seconds: Timestamp) -> Result<Timestamp> {
        self.request(|reply| Command::AdvanceTime { seconds, reply })
            .await
    }

    pub async fn mint(&self, account: AccountId, amount: Amount) -> Result<()> {
        self.request(|reply| Command::Mint {
            account,
            amount,
            reply,
        })
        .await
    }

    /// Clone of the current ledger (read-only snapshot)
    pub async fn ledger(&self) -> Result<Ledger> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Character` - creation, healing, resurrection, level-ups
    /// - `Topic::Combat` - fight summaries, rewards, drops
    /// - `Topic::Treasury` - fees, refunds, epochs, claims
    /// - `Topic::Block` - block production
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use runtime::Topic;
    ///
    /// let mut combat_rx = handle.subscribe(Topic::Combat);
    /// while let Ok(event) = combat_rx.recv().await {
    ///     // Handle combat events
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Every ledger event in emission order.
    pub fn subscribe_ledger(&self) -> broadcast::Receiver<ChainEvent> {
        self.event_bus.subscribe_ledger()
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
