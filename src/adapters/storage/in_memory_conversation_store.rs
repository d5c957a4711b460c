//! In-Memory Conversation Store Adapter
//!
//! Holds every conversation for the lifetime of the process. The outer map
//! lock is held only for lookup and insert; each conversation has its own
//! lock and exchange slot, so unrelated conversations never contend.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::domain::debate::{Conversation, StanceExtractor, Turn};
use crate::domain::foundation::ConversationId;
use crate::ports::{ConversationOpening, ConversationStore, ExchangeGuard, StoreError};

#[derive(Debug)]
struct Slot {
    conversation: RwLock<Conversation>,
    exchange: Arc<Mutex<()>>,
}

impl Slot {
    fn new(conversation: Conversation) -> Self {
        Self {
            conversation: RwLock::new(conversation),
            exchange: Arc::new(Mutex::new(())),
        }
    }
}

/// In-memory registry of conversations.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConversationStore {
    slots: Arc<RwLock<HashMap<ConversationId, Arc<Slot>>>>,
    extractor: StanceExtractor,
}

impl InMemoryConversationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    async fn slot(&self, id: ConversationId) -> Result<Arc<Slot>, StoreError> {
        self.slots
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    /// Ids of all stored conversations, in no particular order
    pub async fn ids(&self) -> Vec<ConversationId> {
        self.slots.read().await.keys().copied().collect()
    }

    /// Remove all conversations (useful for tests)
    pub async fn clear(&self) {
        self.slots.write().await.clear();
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn get_or_create(
        &self,
        conversation_id: Option<ConversationId>,
        first_message: &str,
        topic_hint: Option<&str>,
    ) -> Result<ConversationOpening, StoreError> {
        if let Some(id) = conversation_id {
            if let Ok(slot) = self.slot(id).await {
                let conversation = slot.conversation.read().await;
                return Ok(ConversationOpening {
                    id,
                    topic: conversation.topic().to_string(),
                    stance: conversation.stance().clone(),
                    is_new: false,
                });
            }
            tracing::debug!(conversation_id = %id, "unknown conversation id, starting a new conversation");
        }

        let position = self.extractor.extract_with_hint(first_message, topic_hint)?;
        let id = ConversationId::new();
        let conversation = Conversation::start(id, position);
        let opening = ConversationOpening {
            id,
            topic: conversation.topic().to_string(),
            stance: conversation.stance().clone(),
            is_new: true,
        };

        self.slots
            .write()
            .await
            .insert(id, Arc::new(Slot::new(conversation)));

        tracing::info!(
            conversation_id = %id,
            topic = %opening.topic,
            stance = %opening.stance,
            "conversation created"
        );
        Ok(opening)
    }

    async fn append_turn(&self, id: ConversationId, turn: Turn) -> Result<(), StoreError> {
        let slot = self.slot(id).await?;
        slot.conversation.write().await.append(turn);
        Ok(())
    }

    async fn visible_history(
        &self,
        id: ConversationId,
        max_per_side: usize,
    ) -> Result<Vec<Turn>, StoreError> {
        let slot = self.slot(id).await?;
        let conversation = slot.conversation.read().await;
        Ok(conversation.visible_history(max_per_side))
    }

    async fn snapshot(&self, id: ConversationId) -> Result<Conversation, StoreError> {
        let slot = self.slot(id).await?;
        let conversation = slot.conversation.read().await;
        Ok(conversation.clone())
    }

    async fn contains(&self, id: ConversationId) -> bool {
        self.slots.read().await.contains_key(&id)
    }

    async fn begin_exchange(&self, id: ConversationId) -> Result<ExchangeGuard, StoreError> {
        let slot = self.slot(id).await?;
        let held = slot.exchange.clone().lock_owned().await;
        Ok(ExchangeGuard::new(id, held))
    }

    async fn len(&self) -> usize {
        self.slots.read().await.len()
    }
}
