//! [`LedgerTransport`] over the in-process runtime.
//!
//! Lets client code written against the transport traits drive a local
//! ledger exactly as it would a remote one.
use async_trait::async_trait;
use tokio::sync::broadcast;

use client_blockchain_core::{
    BlockInfo, ChainEvent, GameBlockchain, LedgerTransport, TransactionData, TransactionId,
    TransactionStatus, TransportError,
};
use game_core::{LedgerQuery, QueryValue};

use super::errors::RuntimeError;
use super::handle::RuntimeHandle;

impl From<RuntimeError> for TransportError {
    fn from(error: RuntimeError) -> Self {
        match error {
            RuntimeError::InsufficientFunds {
                required,
                available,
            } => TransportError::InsufficientFunds {
                required,
                available,
            },
            RuntimeError::Query(error) => TransportError::Query(error),
            RuntimeError::Encoding(error) => TransportError::SerializationError(error.to_string()),
            closed @ (RuntimeError::CommandChannelClosed | RuntimeError::ReplyChannelClosed(_)) => {
                TransportError::NetworkError(closed.to_string())
            }
            other => TransportError::BackendError(other.to_string()),
        }
    }
}

#[async_trait]
impl LedgerTransport for RuntimeHandle {
    async fn submit_transaction(&self, tx: TransactionData) -> Result<TransactionId, TransportError> {
        Ok(self.submit(tx).await?)
    }

    async fn query_transaction(&self, tx_id: &TransactionId) -> Result<TransactionStatus, TransportError> {
        self.transaction_status(tx_id)
            .await?
            .ok_or_else(|| TransportError::TransactionNotFound(tx_id.clone()))
    }

    async fn query(&self, query: &LedgerQuery) -> Result<QueryValue, TransportError> {
        Ok(RuntimeHandle::query(self, query.clone()).await?)
    }

    async fn latest_block(&self) -> Result<BlockInfo, TransportError> {
        Ok(RuntimeHandle::latest_block(self).await?)
    }

    fn subscribe_events(&self) -> broadcast::Receiver<ChainEvent> {
        self.subscribe_ledger()
    }

    async fn health_check(&self) -> Result<(), TransportError> {
        RuntimeHandle::latest_block(self).await?;
        Ok(())
    }
}

impl GameBlockchain for RuntimeHandle {
    fn name(&self) -> &str {
        "local"
    }

    fn network(&self) -> &str {
        "in-process"
    }
}
