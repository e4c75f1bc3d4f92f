//! Topic-based event bus implementation.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use client_blockchain_core::{BlockInfo, ChainEvent};
use game_core::LedgerEventKind;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Character lifecycle (creation, healing, resurrection, level-ups)
    Character,
    /// Fight resolution and rewards
    Combat,
    /// Fees, pools, epochs, claims
    Treasury,
    /// Block production
    Block,
}

impl Topic {
    pub const ALL: [Topic; 4] = [Topic::Character, Topic::Combat, Topic::Treasury, Topic::Block];

    pub fn for_kind(kind: LedgerEventKind) -> Self {
        use LedgerEventKind as K;
        match kind {
            K::CharacterCreated | K::CharacterHealed | K::CharacterResurrected | K::LevelUp => {
                Topic::Character
            }
            K::FightSummary
            | K::DifficultyMultiplierApplied
            | K::FightXpReward
            | K::EquipmentDropped
            | K::FightRecorded => Topic::Combat,
            K::FeeDistributed
            | K::GasRefundIssued
            | K::EpochAdvanced
            | K::EpochFunded
            | K::EpochRootPublished
            | K::Claimed
            | K::UnclaimedFundsRolled
            | K::EpochReserveConsumed
            | K::EmergencyReserveConsumed => Topic::Treasury,
        }
    }
}

/// Summary of a produced block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockEvent {
    pub block: BlockInfo,
    pub transactions: usize,
    pub reverted: usize,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Ledger(ChainEvent),
    Block(BlockEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Ledger(event) => Topic::for_kind(event.event.kind()),
            Event::Block(_) => Topic::Block,
        }
    }
}

struct Channels {
    character: broadcast::Sender<Event>,
    combat: broadcast::Sender<Event>,
    treasury: broadcast::Sender<Event>,
    block: broadcast::Sender<Event>,
    /// Every ledger event regardless of topic.
    ledger: broadcast::Sender<ChainEvent>,
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Ledger events are additionally mirrored onto a
/// single untyped stream for transports.
pub struct EventBus {
    channels: Arc<Channels>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(Channels {
                character: broadcast::channel(capacity).0,
                combat: broadcast::channel(capacity).0,
                treasury: broadcast::channel(capacity).0,
                block: broadcast::channel(capacity).0,
                ledger: broadcast::channel(capacity).0,
            }),
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Character => &self.channels.character,
            Topic::Combat => &self.channels.combat,
            Topic::Treasury => &self.channels.treasury,
            Topic::Block => &self.channels.block,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if let Event::Ledger(ledger_event) = &event
            && self.channels.ledger.send(ledger_event.clone()).is_err()
        {
            tracing::trace!("No ledger stream subscribers");
        }
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }

    /// Subscribe to every ledger event in emission order.
    pub fn subscribe_ledger(&self) -> broadcast::Receiver<ChainEvent> {
        self.channels.ledger.subscribe()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            channels: Arc::clone(&self.channels),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
