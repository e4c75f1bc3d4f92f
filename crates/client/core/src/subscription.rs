//! Long-lived ledger event subscriptions.
//!
//! A forwarding task reads the transport's broadcast, filters, decodes, and
//! hands events to the subscriber. Dropping the [`EventSubscription`] (or
//! calling [`EventSubscription::cancel`]) stops the task.
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use client_blockchain_core::ChainEvent;
use game_core::{AccountId, LedgerEventKind};

use crate::decode::{DecodedEvent, decode_chain_event};
use crate::error::{OrchestratorError, Result};
use crate::refresh::RefreshScope;

/// Which events a subscription forwards.
#[derive(Clone, Debug, Default)]
pub struct EventFilter {
    account: Option<AccountId>,
    kinds: Option<Vec<LedgerEventKind>>,
}

impl EventFilter {
    /// Everything, including events that concern no single player.
    pub fn all() -> Self {
        Self::default()
    }

    /// Only events about `account`.
    pub fn player(account: AccountId) -> Self {
        Self {
            account: Some(account),
            kinds: None,
        }
    }

    pub fn kinds(mut self, kinds: impl IntoIterator<Item = LedgerEventKind>) -> Self {
        self.kinds = Some(kinds.into_iter().collect());
        self
    }

    pub fn matches(&self, event: &ChainEvent) -> bool {
        if self.account.is_some_and(|account| event.event.player() != Some(account)) {
            return false;
        }
        match &self.kinds {
            Some(kinds) => kinds.contains(&event.event.kind()),
            None => true,
        }
    }
}

/// One forwarded event.
#[derive(Clone, Debug, PartialEq)]
pub struct ObservedEvent {
    pub event: ChainEvent,
    pub decoded: DecodedEvent,
    pub refresh: RefreshScope,
}

pub struct EventSubscription {
    events: mpsc::Receiver<ObservedEvent>,
    task: JoinHandle<()>,
}

impl EventSubscription {
    const BUFFER: usize = 64;

    pub(crate) fn spawn(source: broadcast::Receiver<ChainEvent>, filter: EventFilter) -> Result<Self> {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| OrchestratorError::NoAsyncRuntime)?;
        let (tx, events) = mpsc::channel(Self::BUFFER);
        let task = runtime.spawn(forward(source, filter, tx));
        Ok(Self { events, task })
    }

    /// Next matching event; `None` once the source closes or the
    /// subscription is cancelled.
    pub async fn next(&mut self) -> Option<ObservedEvent> {
        self.events.recv().await
    }

    /// Stop forwarding; already buffered events are discarded.
    pub fn cancel(self) {
        drop(self);
    }

    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn forward(
    mut source: broadcast::Receiver<ChainEvent>,
    filter: EventFilter,
    sink: mpsc::Sender<ObservedEvent>,
) {
    loop {
        let event = match source.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "event subscription lagged");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };
        if !filter.matches(&event) {
            continue;
        }

        let observed = ObservedEvent {
            decoded: decode_chain_event(&event),
            refresh: RefreshScope::for_event(event.event.kind()),
            event,
        };
        if sink.send(observed).await.is_err() {
            break;
        }
    }
    debug!("event subscription stopped");
}
