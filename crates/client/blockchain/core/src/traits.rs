//! Ledger abstraction traits.
//!
//! This module defines a layered ledger abstraction:
//! - Layer 0: LedgerTransport (pure infrastructure)
//! - Layer 1: GameReader, Wallet (game domain)
//! - Layer 2: GameBlockchain (composite trait)

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use game_core::{
    AccountId, Amount, Character, CombatSession, Eligibility, Epoch, FeeSchedule, LedgerError,
    LedgerQuery, PoolBalances, QueryValue, Timestamp,
};

use crate::types::{BlockInfo, ChainEvent, Receipt, TransactionData, TransactionId, TransactionStatus};

// ============================================================================
// Error Types
// ============================================================================

/// Transport layer errors.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Amount, available: Amount },

    #[error("Query rejected: {0}")]
    Query(#[from] LedgerError),

    #[error("Unexpected response to {0} query")]
    UnexpectedResponse(&'static str),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Backend-specific error: {0}")]
    BackendError(String),
}

/// Wallet refusals.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("User rejected the request")]
    Rejected,

    #[error("Wallet is locked")]
    Locked,
}

/// Everything that can go wrong between "submit" and "the ledger has it".
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

// ============================================================================
// Layer 0: Pure Infrastructure
// ============================================================================

/// Pure ledger infrastructure layer.
///
/// Submits calls, reports their status, answers wire queries, and streams
/// emitted events. Knows nothing about what the calls mean.
#[async_trait]
pub trait LedgerTransport: Send + Sync {
    /// Submit a transaction to the mempool.
    async fn submit_transaction(&self, tx: TransactionData) -> Result<TransactionId, TransportError>;

    /// Query transaction status.
    async fn query_transaction(&self, tx_id: &TransactionId) -> Result<TransactionStatus, TransportError>;

    /// Answer a read-only ledger query against the latest state.
    async fn query(&self, query: &LedgerQuery) -> Result<QueryValue, TransportError>;

    /// Most recently produced block.
    async fn latest_block(&self) -> Result<BlockInfo, TransportError>;

    /// Subscribe to every event emitted by executed transactions.
    fn subscribe_events(&self) -> broadcast::Receiver<ChainEvent>;

    /// Health check: verify the ledger is reachable.
    async fn health_check(&self) -> Result<(), TransportError>;

    /// Poll until the transaction is final (default: fixed-interval polling).
    ///
    /// Never gives up on its own; callers bound it with a timeout.
    async fn wait_for_receipt(
        &self,
        tx_id: &TransactionId,
        poll_interval: Duration,
    ) -> Result<Receipt, TransportError> {
        loop {
            if let TransactionStatus::Finalized(receipt) = self.query_transaction(tx_id).await? {
                return Ok(receipt);
            }
            tokio::time::sleep(poll_interval).await;
        }
    }
}

// ============================================================================
// Layer 1: Game Domain Traits
// ============================================================================

macro_rules! read {
    ($self:ident, $query:expr, $variant:ident) => {{
        let query = $query;
        match $self.query(&query).await? {
            QueryValue::$variant(value) => Ok(value),
            _ => Err(TransportError::UnexpectedResponse(query.name())),
        }
    }};
}

/// Typed read surface over [`LedgerTransport::query`].
///
/// Implemented for every transport.
#[async_trait]
pub trait GameReader: LedgerTransport {
    async fn get_character(&self, account: AccountId) -> Result<Option<Character>, TransportError> {
        read!(self, LedgerQuery::Character(account), Character)
    }

    async fn get_combat_state(
        &self,
        account: AccountId,
    ) -> Result<Option<CombatSession>, TransportError> {
        read!(self, LedgerQuery::CombatState(account), CombatState)
    }

    async fn is_in_combat(&self, account: AccountId) -> Result<bool, TransportError> {
        read!(self, LedgerQuery::IsInCombat(account), Bool)
    }

    async fn can_fight(&self, account: AccountId) -> Result<Eligibility, TransportError> {
        read!(self, LedgerQuery::CanFight(account), Eligibility)
    }

    async fn can_heal(&self, account: AccountId) -> Result<Eligibility, TransportError> {
        read!(self, LedgerQuery::CanHeal(account), Eligibility)
    }

    async fn can_resurrect(&self, account: AccountId) -> Result<Eligibility, TransportError> {
        read!(self, LedgerQuery::CanResurrect(account), Eligibility)
    }

    async fn can_continue_fight(&self, account: AccountId) -> Result<Eligibility, TransportError> {
        read!(self, LedgerQuery::CanContinueFight(account), Eligibility)
    }

    async fn effective_endurance(&self, account: AccountId) -> Result<u64, TransportError> {
        read!(self, LedgerQuery::EffectiveEndurance(account), U64)
    }

    async fn healing_cooldown_remaining(&self, account: AccountId) -> Result<u64, TransportError> {
        read!(self, LedgerQuery::HealingCooldownRemaining(account), U64)
    }

    async fn fees(&self) -> Result<FeeSchedule, TransportError> {
        read!(self, LedgerQuery::Fees, Fees)
    }

    async fn pools(&self) -> Result<PoolBalances, TransportError> {
        read!(self, LedgerQuery::Pools, Pools)
    }

    async fn current_epoch(&self) -> Result<Epoch, TransportError> {
        read!(self, LedgerQuery::CurrentEpoch, U64)
    }

    async fn epoch_time_remaining(&self) -> Result<Timestamp, TransportError> {
        read!(self, LedgerQuery::EpochTimeRemaining, U64)
    }

    async fn epoch_score(&self, account: AccountId, epoch: Epoch) -> Result<u64, TransportError> {
        read!(self, LedgerQuery::EpochScore { account, epoch }, U64)
    }

    async fn total_player_count(&self) -> Result<u64, TransportError> {
        read!(self, LedgerQuery::TotalPlayerCount, U64)
    }

    async fn player_by_index(&self, index: u64) -> Result<Option<AccountId>, TransportError> {
        read!(self, LedgerQuery::PlayerByIndex(index), Account)
    }

    async fn claim_deadline(&self, epoch: Epoch) -> Result<Option<Timestamp>, TransportError> {
        read!(self, LedgerQuery::ClaimDeadline(epoch), Timestamp)
    }

    async fn is_claimed(&self, epoch: Epoch, index: u64) -> Result<bool, TransportError> {
        read!(self, LedgerQuery::IsClaimed { epoch, index }, Bool)
    }

    async fn unclaimed_amount(&self, epoch: Epoch) -> Result<Amount, TransportError> {
        read!(self, LedgerQuery::UnclaimedAmount(epoch), Amount)
    }

    async fn balance(&self, account: AccountId) -> Result<Amount, TransportError> {
        read!(self, LedgerQuery::Balance(account), Amount)
    }
}

impl<T: LedgerTransport + ?Sized> GameReader for T {}

/// Signing identity.
///
/// Only approves or refuses; the transport does the sending.
#[async_trait]
pub trait Wallet: Send + Sync {
    fn account(&self) -> AccountId;

    /// Ask the key holder to approve `tx`.
    async fn authorize(&self, tx: &TransactionData) -> Result<(), WalletError>;
}

// ============================================================================
// Layer 2: Composite Trait
// ============================================================================

/// Core game ledger operations.
///
/// All game-compatible backends must implement this trait.
pub trait GameBlockchain: GameReader + Send + Sync {
    /// Backend name (e.g., "local", "mock").
    fn name(&self) -> &str;

    /// Network name (e.g., "devnet", "in-process").
    fn network(&self) -> &str;
}
