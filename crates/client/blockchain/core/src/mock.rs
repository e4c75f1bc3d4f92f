//! Mock ledger transport for testing.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::broadcast;

use game_core::{ErrorCode, LedgerEvent, LedgerQuery, QueryValue, Timestamp};

use crate::traits::{GameBlockchain, LedgerTransport, TransportError};
use crate::types::{
    BlockInfo, ChainEvent, Receipt, ReceiptOutcome, TransactionData, TransactionId,
    TransactionStatus,
};

/// One scripted answer to a status poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockStep {
    Pending,
    Confirming,
    Success(Vec<LedgerEvent>),
    Revert(ErrorCode),
    /// The poll itself fails.
    Disconnect,
}

struct MockTx {
    block: BlockInfo,
    steps: VecDeque<MockStep>,
    published: bool,
}

#[derive(Default)]
struct MockState {
    height: u64,
    timestamp: Timestamp,
    txs: HashMap<TransactionId, MockTx>,
    plans: VecDeque<Vec<MockStep>>,
    submit_failures: VecDeque<TransportError>,
    submitted: Vec<TransactionData>,
    queries: Vec<(LedgerQuery, QueryValue)>,
}

/// Mock transport for testing without a ledger.
///
/// Each submitted transaction follows the next queued plan of [`MockStep`]s,
/// one step per status poll; the last step repeats. Without a plan a
/// transaction finalizes successfully on the first poll.
#[derive(Clone)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
    events: broadcast::Sender<ChainEvent>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                timestamp: 1_700_000_000,
                ..MockState::default()
            })),
            events: broadcast::channel(64).0,
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Script the status polls of the next submitted transaction.
    pub fn push_plan(&self, steps: Vec<MockStep>) {
        self.lock().plans.push_back(steps);
    }

    /// Make the next submission fail before reaching the mempool.
    pub fn fail_next_submit(&self, error: TransportError) {
        self.lock().submit_failures.push_back(error);
    }

    pub fn set_query(&self, query: LedgerQuery, value: QueryValue) {
        let mut state = self.lock();
        state.queries.retain(|(q, _)| q != &query);
        state.queries.push((query, value));
    }

    pub fn submitted(&self) -> Vec<TransactionData> {
        self.lock().submitted.clone()
    }

    /// Broadcast an event as if a transaction had emitted it.
    pub fn emit(&self, event: LedgerEvent) {
        let block = {
            let state = self.lock();
            BlockInfo {
                height: state.height,
                timestamp: state.timestamp,
            }
        };
        let _ = self.events.send(ChainEvent {
            block,
            transaction_id: TransactionId::from_bytes(vec![0; 4]),
            event,
        });
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerTransport for MockTransport {
    async fn submit_transaction(&self, tx: TransactionData) -> Result<TransactionId, TransportError> {
        let mut state = self.lock();
        if let Some(error) = state.submit_failures.pop_front() {
            return Err(error);
        }

        state.height += 1;
        state.timestamp += 12;
        let id = TransactionId::from_bytes(state.height.to_be_bytes().to_vec());
        let steps = state
            .plans
            .pop_front()
            .unwrap_or_else(|| vec![MockStep::Success(Vec::new())]);
        let block = BlockInfo {
            height: state.height,
            timestamp: state.timestamp,
        };
        state.txs.insert(
            id.clone(),
            MockTx {
                block,
                steps: steps.into(),
                published: false,
            },
        );
        state.submitted.push(tx);
        Ok(id)
    }

    async fn query_transaction(&self, tx_id: &TransactionId) -> Result<TransactionStatus, TransportError> {
        let mut state = self.lock();
        let tx = state
            .txs
            .get_mut(tx_id)
            .ok_or_else(|| TransportError::TransactionNotFound(tx_id.clone()))?;

        let step = if tx.steps.len() > 1 {
            tx.steps.pop_front()
        } else {
            tx.steps.front().cloned()
        }
        .unwrap_or(MockStep::Pending);

        let block = tx.block;
        let outcome = match step {
            MockStep::Pending => return Ok(TransactionStatus::Pending),
            MockStep::Confirming => {
                return Ok(TransactionStatus::Confirming {
                    block,
                    confirmations: 0,
                });
            }
            MockStep::Disconnect => {
                return Err(TransportError::NetworkError("connection reset".to_string()));
            }
            MockStep::Success(events) => ReceiptOutcome::Success { events },
            MockStep::Revert(code) => ReceiptOutcome::Reverted { error: code.into() },
        };

        if !tx.published {
            tx.published = true;
            for event in outcome_events(&outcome) {
                let _ = self.events.send(ChainEvent {
                    block,
                    transaction_id: tx_id.clone(),
                    event: event.clone(),
                });
            }
        }

        Ok(TransactionStatus::Finalized(Receipt {
            transaction_id: tx_id.clone(),
            block,
            outcome,
        }))
    }

    async fn query(&self, query: &LedgerQuery) -> Result<QueryValue, TransportError> {
        self.lock()
            .queries
            .iter()
            .find(|(q, _)| q == query)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| TransportError::BackendError(format!("no mock response for {}", query.name())))
    }

    async fn latest_block(&self) -> Result<BlockInfo, TransportError> {
        let state = self.lock();
        Ok(BlockInfo {
            height: state.height,
            timestamp: state.timestamp,
        })
    }

    fn subscribe_events(&self) -> broadcast::Receiver<ChainEvent> {
        self.events.subscribe()
    }

    async fn health_check(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

fn outcome_events(outcome: &ReceiptOutcome) -> &[LedgerEvent] {
    match outcome {
        ReceiptOutcome::Success { events } => events,
        ReceiptOutcome::Reverted { .. } => &[],
    }
}

impl GameBlockchain for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    fn network(&self) -> &str {
        "mock-network"
    }
}
