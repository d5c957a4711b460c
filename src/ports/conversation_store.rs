//! Conversation Store Port - Registry of live debate conversations.
//!
//! The store exclusively owns every conversation. Callers get ids, cloned
//! snapshots or bounded history views, never references into the registry.
//!
//! # Concurrency
//!
//! Implementations must be safe to share across tasks. A full user-to-bot
//! exchange is serialised per conversation through [`ExchangeGuard`]; distinct
//! conversations never wait on each other's exchanges.

use async_trait::async_trait;
use tokio::sync::OwnedMutexGuard;

use crate::domain::debate::{Conversation, Stance, Turn};
use crate::domain::foundation::{ConversationId, ValidationError};

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Conversation not found: {0}")]
    NotFound(ConversationId),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Result of resolving a conversation at the start of an exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationOpening {
    pub id: ConversationId,
    pub topic: String,
    pub stance: Stance,
    /// True when this call created the conversation.
    pub is_new: bool,
}

/// Exclusive hold on one conversation's exchange slot.
///
/// Released on drop.
#[derive(Debug)]
pub struct ExchangeGuard {
    conversation_id: ConversationId,
    _slot: OwnedMutexGuard<()>,
}

impl ExchangeGuard {
    pub fn new(conversation_id: ConversationId, slot: OwnedMutexGuard<()>) -> Self {
        Self {
            conversation_id,
            _slot: slot,
        }
    }

    pub fn conversation_id(&self) -> ConversationId {
        self.conversation_id
    }
}

/// Port for the conversation registry.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Resolves a conversation, creating one when needed.
    ///
    /// With `None` or an id the store does not know, a new conversation is
    /// created under a fresh id with topic and stance derived from
    /// `first_message` (and `topic_hint`, when present). With a known id the
    /// existing topic and stance are returned unchanged and the message is
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` when a new conversation cannot be
    /// derived from an empty message.
    async fn get_or_create(
        &self,
        conversation_id: Option<ConversationId>,
        first_message: &str,
        topic_hint: Option<&str>,
    ) -> Result<ConversationOpening, StoreError>;

    /// Appends a turn to the end of the conversation's history.
    async fn append_turn(&self, id: ConversationId, turn: Turn) -> Result<(), StoreError>;

    /// Most recent `max_per_side` turns per role, chronological.
    async fn visible_history(
        &self,
        id: ConversationId,
        max_per_side: usize,
    ) -> Result<Vec<Turn>, StoreError>;

    /// Read-only copy of the conversation.
    async fn snapshot(&self, id: ConversationId) -> Result<Conversation, StoreError>;

    /// Returns true if the store holds a conversation with this id.
    async fn contains(&self, id: ConversationId) -> bool;

    /// Waits for, then takes, the conversation's exchange slot.
    async fn begin_exchange(&self, id: ConversationId) -> Result<ExchangeGuard, StoreError>;

    /// Number of stored conversations.
    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
