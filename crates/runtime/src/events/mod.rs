//! Topic-based event bus for runtime events.
//!
//! Ledger events are published to the topic their kind belongs to, and
//! consumers subscribe only to the topics they need.

mod bus;

pub use bus::{BlockEvent, Event, EventBus, Topic};
