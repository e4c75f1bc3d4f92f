//! Session orchestrator: turns ledger calls into tracked actions.
//!
//! Each submitted call runs as its own task that walks the action through
//! preflight, wallet approval, submission, and receipt polling, reporting
//! every step on the action's status channel. Only one action per player is
//! in flight at a time; a second submission is rejected until the first one
//! reaches a terminal status.
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::sync::{OnceCell, broadcast, mpsc};
use tracing::{debug, info, warn};

use client_blockchain_core::{
    BlockInfo, GameReader, Receipt, ReceiptOutcome, TransactionData, TransactionId, TransactionStatus,
};
use game_core::{AccountId, Amount, CallKind, ErrorCode, FeeSchedule, LedgerCall, LedgerEvent};

use crate::action::{ActionHandle, ActionId, ActionOutcome, ActionRecord, ActionStatus};
use crate::context::ClientContext;
use crate::decode::decode_events;
use crate::error::{ActionFailure, OrchestratorError, Result};
use crate::refresh::{RefreshScope, RefreshSignal};
use crate::subscription::{EventFilter, EventSubscription};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Shared {
    context: ClientContext,
    next_id: AtomicU64,
    in_flight: Mutex<HashMap<AccountId, ActionId>>,
    /// Players whose fight we last saw unresolved.
    open_fights: Mutex<HashSet<AccountId>>,
    history: Mutex<VecDeque<ActionRecord>>,
    fees: OnceCell<FeeSchedule>,
    refresh_tx: broadcast::Sender<RefreshSignal>,
}

/// Client-side coordinator for ledger actions.
///
/// Cheap to clone; clones share in-flight tracking and history.
#[derive(Clone)]
pub struct SessionOrchestrator {
    shared: Arc<Shared>,
}

impl SessionOrchestrator {
    pub fn new(context: ClientContext) -> Self {
        let (refresh_tx, _) = broadcast::channel(context.config.refresh_buffer.max(1));
        Self {
            shared: Arc::new(Shared {
                context,
                next_id: AtomicU64::new(1),
                in_flight: Mutex::new(HashMap::new()),
                open_fights: Mutex::new(HashSet::new()),
                history: Mutex::new(VecDeque::new()),
                fees: OnceCell::new(),
                refresh_tx,
            }),
        }
    }

    pub fn context(&self) -> &ClientContext {
        &self.shared.context
    }

    /// Start an action for the wallet's account.
    ///
    /// The returned handle already holds `Pending`. Fee-bearing calls get the
    /// ledger's current fee attached automatically.
    pub fn submit(&self, call: LedgerCall) -> Result<ActionHandle> {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| OrchestratorError::NoAsyncRuntime)?;
        let account = self.shared.context.account();
        let kind = call.kind();
        let id = ActionId(self.shared.next_id.fetch_add(1, Ordering::Relaxed));
        let guard = InFlightGuard::acquire(&self.shared, account, id)?;

        let (status_tx, status_rx) = mpsc::unbounded_channel();
        let _ = status_tx.send(ActionStatus::Pending { action: id, kind });
        debug!(action = %id, player = %account, %kind, "action pending");

        let task = ActionTask {
            shared: Arc::clone(&self.shared),
            id,
            account,
            call,
            statuses: status_tx,
            guard: Some(guard),
            transaction_id: None,
        };
        runtime.spawn(task.run());

        Ok(ActionHandle::new(id, account, kind, status_rx))
    }

    /// Action currently in flight for `account`, if any.
    pub fn in_flight(&self, account: AccountId) -> Option<ActionId> {
        lock(&self.shared.in_flight).get(&account).copied()
    }

    /// Signals emitted after every completed action.
    pub fn subscribe_refresh(&self) -> broadcast::Receiver<RefreshSignal> {
        self.shared.refresh_tx.subscribe()
    }

    /// Long-lived stream of decoded ledger events; cancelled on drop.
    pub fn subscribe_events(&self, filter: EventFilter) -> Result<EventSubscription> {
        EventSubscription::spawn(self.shared.context.ledger.subscribe_events(), filter)
    }

    /// Terminal action records, oldest first.
    pub fn history(&self) -> Vec<ActionRecord> {
        lock(&self.shared.history).iter().cloned().collect()
    }
}

impl std::fmt::Debug for SessionOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionOrchestrator")
            .field("context", &self.shared.context)
            .field("in_flight", &lock(&self.shared.in_flight).len())
            .finish_non_exhaustive()
    }
}

/// Holds a player's in-flight slot; frees it on drop.
struct InFlightGuard {
    shared: Arc<Shared>,
    account: AccountId,
    id: ActionId,
}

impl InFlightGuard {
    fn acquire(shared: &Arc<Shared>, account: AccountId, id: ActionId) -> Result<Self> {
        let mut in_flight = lock(&shared.in_flight);
        if let Some(&action) = in_flight.get(&account) {
            return Err(OrchestratorError::ActionInFlight { account, action });
        }
        in_flight.insert(account, id);
        Ok(Self {
            shared: Arc::clone(shared),
            account,
            id,
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut in_flight = lock(&self.shared.in_flight);
        if in_flight.get(&self.account) == Some(&self.id) {
            in_flight.remove(&self.account);
        }
    }
}

struct ActionTask {
    shared: Arc<Shared>,
    id: ActionId,
    account: AccountId,
    call: LedgerCall,
    statuses: mpsc::UnboundedSender<ActionStatus>,
    guard: Option<InFlightGuard>,
    transaction_id: Option<TransactionId>,
}

impl ActionTask {
    async fn run(mut self) {
        let result = self.drive().await;
        let kind = self.call.kind();

        // Free the slot first so a caller reacting to the terminal status can
        // submit the next action right away.
        drop(self.guard.take());
        let status = match result {
            Ok(outcome) => {
                info!(
                    action = %self.id,
                    player = %self.account,
                    %kind,
                    events = outcome.events.len(),
                    already_resolved = outcome.already_resolved,
                    "action completed"
                );
                ActionStatus::Completed(outcome)
            }
            Err(failure) => {
                warn!(
                    action = %self.id,
                    player = %self.account,
                    %kind,
                    category = %failure.category,
                    code = ?failure.code,
                    "action failed: {}",
                    failure.message
                );
                ActionStatus::Failed(failure)
            }
        };

        self.record(&status);
        let signal = match &status {
            ActionStatus::Completed(outcome) if !outcome.refresh.is_empty() => Some(RefreshSignal {
                action: self.id,
                account: self.account,
                kind,
                scope: outcome.refresh,
                block: outcome.block,
            }),
            _ => None,
        };
        if self.statuses.send(status).is_err() {
            debug!(action = %self.id, "status receiver dropped");
        }
        if let Some(signal) = signal {
            let _ = self.shared.refresh_tx.send(signal);
        }
    }

    async fn drive(&mut self) -> std::result::Result<ActionOutcome, ActionFailure> {
        let shared = Arc::clone(&self.shared);
        let context = &shared.context;

        if context.config.preflight {
            if let Some(outcome) = self.preflight().await? {
                return Ok(outcome);
            }
        }

        let value = self.attached_value().await?;
        let tx = TransactionData::new(self.account, self.call.clone()).with_value(value);
        context.wallet.authorize(&tx).await?;

        let id = context.ledger.submit_transaction(tx).await?;
        debug!(action = %self.id, tx = %id.short(), "transaction submitted");
        self.transaction_id = Some(id.clone());

        let timeout = context.config.confirmation_timeout;
        let receipt = tokio::time::timeout(timeout, self.await_receipt(&id))
            .await
            .map_err(|_| ActionFailure::timeout(timeout))??;
        self.settle(receipt)
    }

    /// Read-only checks mirroring the ledger's own validation.
    ///
    /// Returns an outcome when the action is already moot.
    async fn preflight(&self) -> std::result::Result<Option<ActionOutcome>, ActionFailure> {
        let ledger = &self.shared.context.ledger;
        let eligibility = match self.call.kind() {
            CallKind::FightEnemy => ledger.can_fight(self.account).await?,
            CallKind::HealCharacter => ledger.can_heal(self.account).await?,
            CallKind::ResurrectCharacter => ledger.can_resurrect(self.account).await?,
            CallKind::ContinueFight | CallKind::FleeRound => {
                if ledger.get_combat_state(self.account).await?.is_some() {
                    self.set_fight_open(true);
                    return Ok(None);
                }
                return self.session_gone(None).map(Some);
            }
            _ => return Ok(None),
        };

        if eligibility.allowed {
            Ok(None)
        } else {
            let code = eligibility.reason.unwrap_or(ErrorCode::CharacterDoesNotExist);
            Err(ActionFailure::denied(code))
        }
    }

    /// A continue/flee found no session. Benign only if we saw one open;
    /// otherwise the fight never started.
    fn session_gone(
        &self,
        receipt: Option<&Receipt>,
    ) -> std::result::Result<ActionOutcome, ActionFailure> {
        if self.set_fight_open(false) {
            debug!(action = %self.id, player = %self.account, "fight already resolved");
            Ok(ActionOutcome {
                transaction_id: receipt.map(|r| r.transaction_id.clone()),
                block: receipt.map(|r| r.block),
                events: Vec::new(),
                fight: None,
                refresh: RefreshScope::CHARACTER | RefreshScope::COMBAT,
                already_resolved: true,
            })
        } else {
            Err(ActionFailure::denied(ErrorCode::NoActiveCombat))
        }
    }

    /// Returns whether the fight was marked open before the update.
    fn set_fight_open(&self, open: bool) -> bool {
        let mut fights = lock(&self.shared.open_fights);
        if open {
            !fights.insert(self.account)
        } else {
            fights.remove(&self.account)
        }
    }

    async fn attached_value(&self) -> std::result::Result<Amount, ActionFailure> {
        let kind = self.call.kind();
        if !matches!(
            kind,
            CallKind::CreateCharacter | CallKind::HealCharacter | CallKind::ResurrectCharacter
        ) {
            return Ok(0);
        }

        let ledger = &self.shared.context.ledger;
        let fees = self
            .shared
            .fees
            .get_or_try_init(|| async { ledger.fees().await })
            .await?;
        Ok(match kind {
            CallKind::CreateCharacter => fees.creation,
            CallKind::HealCharacter => fees.heal,
            _ => fees.resurrection,
        })
    }

    /// Polls until final, announcing `Confirming` once on inclusion.
    async fn await_receipt(&self, id: &TransactionId) -> std::result::Result<Receipt, ActionFailure> {
        let context = &self.shared.context;
        let mut announced = false;
        loop {
            match context.ledger.query_transaction(id).await? {
                TransactionStatus::Pending => {}
                TransactionStatus::Confirming { block, .. } => {
                    if !announced {
                        self.confirming(id, block);
                        announced = true;
                    }
                }
                TransactionStatus::Finalized(receipt) => {
                    if !announced {
                        self.confirming(id, receipt.block);
                    }
                    return Ok(receipt);
                }
            }
            tokio::time::sleep(context.config.poll_interval).await;
        }
    }

    fn confirming(&self, id: &TransactionId, block: BlockInfo) {
        debug!(action = %self.id, tx = %id.short(), height = block.height, "transaction included");
        let _ = self.statuses.send(ActionStatus::Confirming {
            transaction_id: id.clone(),
            block,
        });
    }

    fn settle(&self, receipt: Receipt) -> std::result::Result<ActionOutcome, ActionFailure> {
        let kind = self.call.kind();
        match &receipt.outcome {
            ReceiptOutcome::Success { events } => {
                let fight = events.iter().rev().find_map(|event| match event {
                    LedgerEvent::FightSummary(summary) if summary.player == self.account => {
                        Some(summary.clone())
                    }
                    _ => None,
                });
                if let Some(summary) = &fight {
                    self.set_fight_open(summary.unresolved());
                }
                Ok(ActionOutcome {
                    transaction_id: Some(receipt.transaction_id.clone()),
                    block: Some(receipt.block),
                    events: decode_events(receipt.block, &receipt.transaction_id, events),
                    fight,
                    refresh: RefreshScope::for_call(kind),
                    already_resolved: false,
                })
            }
            ReceiptOutcome::Reverted { error }
                if error.code == ErrorCode::NoActiveCombat
                    && matches!(kind, CallKind::ContinueFight | CallKind::FleeRound) =>
            {
                self.session_gone(Some(&receipt))
                    .map_err(|_| ActionFailure::reverted(error))
            }
            ReceiptOutcome::Reverted { error } => Err(ActionFailure::reverted(error)),
        }
    }

    fn record(&self, status: &ActionStatus) {
        let capacity = self.shared.context.config.history_capacity.max(1);
        let record = ActionRecord {
            id: self.id,
            account: self.account,
            kind: self.call.kind(),
            transaction_id: self.transaction_id.clone(),
            phase: status.phase(),
            failure: match status {
                ActionStatus::Failed(failure) => Some(failure.clone()),
                _ => None,
            },
            finished_at: Utc::now(),
        };

        let mut history = lock(&self.shared.history);
        history.push_back(record);
        while history.len() > capacity {
            history.pop_front();
        }
    }
}
