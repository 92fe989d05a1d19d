//! Session store port. The concrete implementation (file-backed counter +
//! in-memory history) lives in `voicebridge-session`; this trait lets the
//! orchestrator depend only on the contract.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::ConversationTurn;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session counter io error: {0}")]
    CounterIo(String),
}

#[async_trait]
pub trait SessionStorePort: Send + Sync {
    /// Current session key for `prefix`, creating one lazily on first use.
    async fn current(&self, prefix: &str) -> String;

    /// Atomically advance the counter, reset the consecutive-empty
    /// tracker, and return the new key.
    async fn bump(&self, prefix: &str) -> Result<String, StoreError>;

    async fn history(&self, key: &str) -> Vec<ConversationTurn>;

    async fn append(&self, key: &str, turn: ConversationTurn);

    async fn reset_history(&self, key: &str);

    /// Record a `text_done` outcome for the consecutive-empty auto-reset
    /// policy (§4.8.4). Returns `true` if this call pushed the counter to
    /// the reset threshold (the caller should then call `bump`).
    async fn record_text_done(&self, prefix: &str, was_empty: bool) -> bool;
}
