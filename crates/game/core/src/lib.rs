//! Deterministic combat, progression, and treasury rules for the brawler ledger.
//!
//! `game-core` defines the canonical rules (characters, fights, fee pools,
//! reward epochs) and exposes pure APIs that can be reused by both the
//! runtime and client tooling. All state mutation flows through
//! [`engine::Ledger::execute`], and supporting crates depend on the types
//! re-exported here.
pub mod action;
pub mod character;
pub mod combat;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod progression;
pub mod rng;
pub mod treasury;
pub mod types;

pub use action::{CallKind, LedgerCall};
pub use character::{
    BaseStats, Character, CharacterClass, CharacterFlags, EquipmentBonuses, PackError,
    PackedCharacter, PackedField,
};
pub use combat::{EnemyBase, EnemyId, EnemyRoster, EnemyStats};
pub use config::{CombatTuning, ConfigError, FeeSchedule, FeeSplit, GameConfig, GasRefundConfig};
pub use engine::{
    CallContext, CombatSession, Eligibility, Ledger, LedgerQuery, LedgerState, QueryValue,
};
pub use error::{ErrorCategory, ErrorCode, ErrorSeverity, GameError, LedgerError};
pub use event::{FightOutcome, FightSummary, LedgerEvent, LedgerEventKind, RoundLog, RoundRecord};
pub use treasury::{Hash32, Pool, PoolBalances};
pub use types::{AccountId, AccountParseError, Amount, BASIS_POINTS, Epoch, Timestamp, UNIT};
