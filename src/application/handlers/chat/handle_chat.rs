//! HandleChat command handler.
//!
//! Runs one user-to-bot exchange: validates the message, resolves the
//! conversation, records the user turn, generates the bot reply under the
//! conversation's fixed stance and returns the bounded history view.
//!
//! Exchanges on the same conversation are serialised through the store's
//! exchange guard, so turns always alternate user, bot, user, bot. If the
//! future is dropped after the user turn is stored, the user turn stays and
//! no bot turn is ever appended for it.

use std::sync::Arc;
use thiserror::Error;

use crate::domain::debate::{ReplyPolicy, Turn, DEFAULT_MAX_PER_SIDE};
use crate::domain::foundation::{ConversationId, DomainError, ErrorCode, ValidationError};
use crate::ports::{ConversationStore, GenerationError, ReplyBackend, StoreError};

/// Command to send one user message.
#[derive(Debug, Clone)]
pub struct HandleChatCommand {
    /// Existing conversation, or `None` to start one.
    pub conversation_id: Option<ConversationId>,
    pub message: String,
    /// Optional topic label for a new conversation.
    pub topic_hint: Option<String>,
}

impl HandleChatCommand {
    /// Starts a new conversation with this message.
    pub fn start(message: impl Into<String>) -> Self {
        Self {
            conversation_id: None,
            message: message.into(),
            topic_hint: None,
        }
    }

    /// Continues an existing conversation.
    pub fn reply(conversation_id: ConversationId, message: impl Into<String>) -> Self {
        Self {
            conversation_id: Some(conversation_id),
            message: message.into(),
            topic_hint: None,
        }
    }

    pub fn with_topic_hint(mut self, topic: impl Into<String>) -> Self {
        self.topic_hint = Some(topic.into());
        self
    }
}

/// Outcome of a completed exchange.
#[derive(Debug, Clone)]
pub struct ChatExchange {
    pub conversation_id: ConversationId,
    /// Bounded chronological view, ending with this exchange's bot turn.
    pub history: Vec<Turn>,
    /// True when this exchange created the conversation.
    pub is_new: bool,
}

/// Errors that can occur while handling a chat message.
#[derive(Debug, Clone, Error)]
pub enum ChatError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Conversation not found: {0}")]
    ConversationNotFound(ConversationId),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl ChatError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ChatError::Validation(_) => ErrorCode::ValidationFailed,
            ChatError::ConversationNotFound(_) => ErrorCode::ConversationNotFound,
            ChatError::Generation(err) => err.code(),
        }
    }
}

impl From<StoreError> for ChatError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ChatError::ConversationNotFound(id),
            StoreError::Validation(err) => ChatError::Validation(err),
        }
    }
}

impl From<ChatError> for DomainError {
    fn from(err: ChatError) -> Self {
        let message = err.to_string();
        match err {
            ChatError::Validation(inner) => DomainError::from(inner),
            ChatError::ConversationNotFound(id) => {
                DomainError::new(ErrorCode::ConversationNotFound, message)
                    .with_detail("conversation_id", id.to_string())
            }
            ChatError::Generation(inner) => {
                DomainError::new(inner.code(), message).with_detail("kind", inner.kind())
            }
        }
    }
}

/// Limits applied by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatSettings {
    pub max_per_side: usize,
    pub max_message_chars: usize,
    pub max_topic_chars: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            max_per_side: DEFAULT_MAX_PER_SIDE,
            max_message_chars: 2000,
            max_topic_chars: 200,
        }
    }
}

/// Coordinates the store, the reply policy and the reply backend.
#[derive(Clone)]
pub struct ChatOrchestrator {
    store: Arc<dyn ConversationStore>,
    backend: Arc<dyn ReplyBackend>,
    policy: ReplyPolicy,
    settings: ChatSettings,
}

impl ChatOrchestrator {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        backend: Arc<dyn ReplyBackend>,
        policy: ReplyPolicy,
        settings: ChatSettings,
    ) -> Self {
        Self {
            store,
            backend,
            policy,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    /// Handles one user message.
    ///
    /// # Errors
    ///
    /// - `Validation` for an empty or oversized message or topic hint; nothing
    ///   is stored
    /// - `ConversationNotFound` when a supplied id is unknown
    /// - `Generation` when the backend fails; the user turn stays recorded
    #[tracing::instrument(
        name = "handle_chat",
        skip(self, cmd),
        fields(conversation_id = tracing::field::Empty)
    )]
    pub async fn handle_chat(&self, cmd: HandleChatCommand) -> Result<ChatExchange, ChatError> {
        let message = self.validate_message(&cmd.message)?;
        let topic_hint = self.validate_topic_hint(cmd.topic_hint.as_deref())?;

        let opening = match cmd.conversation_id {
            Some(id) if !self.store.contains(id).await => {
                tracing::debug!(conversation_id = %id, "rejecting unknown conversation id");
                return Err(ChatError::ConversationNotFound(id));
            }
            requested => {
                self.store
                    .get_or_create(requested, message, topic_hint)
                    .await?
            }
        };
        let id = opening.id;
        tracing::Span::current().record("conversation_id", tracing::field::display(id));

        let guard = self.store.begin_exchange(id).await?;

        let conversation = self.store.snapshot(id).await?;
        self.store.append_turn(id, Turn::user(message)).await?;

        let request = self.policy.build_request(
            conversation.topic(),
            conversation.stance(),
            conversation.history(),
            message,
        );
        tracing::debug!(
            intent = ?request.intent,
            context_turns = request.context.len(),
            backend = self.backend.name(),
            "generating reply"
        );

        let reply = match self.backend.generate(&request).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(kind = err.kind(), error = %err, "reply generation failed");
                return Err(ChatError::Generation(err));
            }
        };

        self.store.append_turn(id, Turn::bot(reply)).await?;
        let history = self.store.visible_history(id, self.settings.max_per_side).await?;
        drop(guard);

        Ok(ChatExchange {
            conversation_id: id,
            history,
            is_new: opening.is_new,
        })
    }

    fn validate_message<'m>(&self, raw: &'m str) -> Result<&'m str, ValidationError> {
        let message = raw.trim();
        if message.is_empty() {
            return Err(ValidationError::empty_field("message"));
        }
        let chars = message.chars().count();
        if chars > self.settings.max_message_chars {
            return Err(ValidationError::too_long(
                "message",
                self.settings.max_message_chars,
                chars,
            ));
        }
        Ok(message)
    }

    fn validate_topic_hint<'t>(
        &self,
        raw: Option<&'t str>,
    ) -> Result<Option<&'t str>, ValidationError> {
        let Some(topic) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(None);
        };
        let chars = topic.chars().count();
        if chars > self.settings.max_topic_chars {
            return Err(ValidationError::too_long(
                "topic",
                self.settings.max_topic_chars,
                chars,
            ));
        }
        Ok(Some(topic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockReplyBackend;
    use crate::adapters::storage::InMemoryConversationStore;
    use crate::domain::debate::{GenerationRequest, Role, Side};
    use async_trait::async_trait;

    /// Backend that always fails with the given error.
    struct FailingBackend(GenerationError);

    #[async_trait]
    impl ReplyBackend for FailingBackend {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
            Err(self.0.clone())
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn orchestrator_with(
        backend: Arc<dyn ReplyBackend>,
    ) -> (ChatOrchestrator, Arc<InMemoryConversationStore>) {
        let store = Arc::new(InMemoryConversationStore::new());
        let orchestrator = ChatOrchestrator::new(
            store.clone(),
            backend,
            ReplyPolicy::default(),
            ChatSettings::default(),
        );
        (orchestrator, store)
    }

    fn orchestrator() -> (ChatOrchestrator, Arc<InMemoryConversationStore>) {
        orchestrator_with(Arc::new(MockReplyBackend::new()))
    }

    mod opening_exchange {
        use super::*;

        #[tokio::test]
        async fn flat_earth_opening_gets_opposed() {
            // Given: a fresh orchestrator
            let (orchestrator, store) = orchestrator();

            // When: the user opens with an opinion
            let exchange = orchestrator
                .handle_chat(HandleChatCommand::start("I think the Earth is flat"))
                .await
                .unwrap();

            // Then: the bot argues against it and history has both turns
            assert!(exchange.is_new);
            assert_eq!(exchange.history.len(), 2);
            assert_eq!(exchange.history[0].role(), Role::User);
            assert_eq!(exchange.history[0].content(), "I think the Earth is flat");
            assert_eq!(exchange.history[1].role(), Role::Bot);
            assert!(exchange.history[1]
                .content()
                .contains("it is wrong to claim that the Earth is flat"));

            let conversation = store.snapshot(exchange.conversation_id).await.unwrap();
            assert_eq!(conversation.topic(), "the Earth is flat");
            assert_eq!(conversation.stance().side(), Side::Con);
        }

        #[tokio::test]
        async fn topic_hint_labels_the_conversation() {
            let (orchestrator, store) = orchestrator();

            let exchange = orchestrator
                .handle_chat(
                    HandleChatCommand::start("I think the Earth is flat").with_topic_hint("Cosmology"),
                )
                .await
                .unwrap();

            let conversation = store.snapshot(exchange.conversation_id).await.unwrap();
            assert_eq!(conversation.topic(), "Cosmology");
        }
    }

    mod continuation {
        use super::*;

        #[tokio::test]
        async fn stance_survives_a_change_of_mind() {
            let (orchestrator, store) = orchestrator();
            let id = orchestrator
                .handle_chat(HandleChatCommand::start("I think the Earth is flat"))
                .await
                .unwrap()
                .conversation_id;
            let before = store.snapshot(id).await.unwrap();

            let exchange = orchestrator
                .handle_chat(HandleChatCommand::reply(id, "Fine, the Earth is round"))
                .await
                .unwrap();

            assert!(!exchange.is_new);
            assert_eq!(exchange.history.len(), 4);
            let after = store.snapshot(id).await.unwrap();
            assert_eq!(after.topic(), before.topic());
            assert_eq!(after.stance(), before.stance());
        }

        #[tokio::test]
        async fn view_is_capped_at_five_per_side() {
            let (orchestrator, store) = orchestrator();
            let id = orchestrator
                .handle_chat(HandleChatCommand::start("I think the Earth is flat"))
                .await
                .unwrap()
                .conversation_id;

            let mut last = None;
            for i in 0..6 {
                last = Some(
                    orchestrator
                        .handle_chat(HandleChatCommand::reply(
                            id,
                            format!("Point {i}: the Earth horizon looks flat"),
                        ))
                        .await
                        .unwrap(),
                );
            }

            let history = last.unwrap().history;
            assert_eq!(history.len(), 10);
            assert_eq!(history.iter().filter(|t| t.is_user()).count(), 5);
            assert_eq!(history.last().unwrap().role(), Role::Bot);
            assert_eq!(store.snapshot(id).await.unwrap().turn_count(), 14);
        }
    }

    mod validation {
        use super::*;

        #[tokio::test]
        async fn empty_message_is_rejected_without_side_effects() {
            let (orchestrator, store) = orchestrator();

            let result = orchestrator.handle_chat(HandleChatCommand::start("   ")).await;

            assert!(matches!(
                result,
                Err(ChatError::Validation(ValidationError::EmptyField { .. }))
            ));
            assert!(store.is_empty().await);
        }

        #[tokio::test]
        async fn empty_message_leaves_existing_history_alone() {
            let (orchestrator, store) = orchestrator();
            let id = orchestrator
                .handle_chat(HandleChatCommand::start("I think the Earth is flat"))
                .await
                .unwrap()
                .conversation_id;

            let result = orchestrator.handle_chat(HandleChatCommand::reply(id, "")).await;

            assert!(result.is_err());
            assert_eq!(store.snapshot(id).await.unwrap().turn_count(), 2);
        }

        #[tokio::test]
        async fn oversized_message_is_rejected() {
            let (orchestrator, _store) = orchestrator();
            let long = "a".repeat(2001);

            let result = orchestrator.handle_chat(HandleChatCommand::start(long)).await;

            assert!(matches!(
                result,
                Err(ChatError::Validation(ValidationError::TooLong { max: 2000, actual: 2001, .. }))
            ));
        }

        #[tokio::test]
        async fn oversized_topic_hint_is_rejected() {
            let (orchestrator, store) = orchestrator();

            let result = orchestrator
                .handle_chat(HandleChatCommand::start("I think X").with_topic_hint("t".repeat(201)))
                .await;

            assert!(matches!(result, Err(ChatError::Validation(_))));
            assert!(store.is_empty().await);
        }

        #[tokio::test]
        async fn unknown_id_is_not_found() {
            let (orchestrator, store) = orchestrator();
            let stale = ConversationId::new();

            let result = orchestrator
                .handle_chat(HandleChatCommand::reply(stale, "hello"))
                .await;

            assert!(matches!(result, Err(ChatError::ConversationNotFound(id)) if id == stale));
            assert!(store.is_empty().await);
        }
    }

    mod generation_failure {
        use super::*;
        use std::time::Duration;

        #[tokio::test]
        async fn user_turn_stays_and_no_bot_turn_is_added() {
            let backend = FailingBackend(GenerationError::timeout(Duration::from_secs(15)));
            let (orchestrator, store) = orchestrator_with(Arc::new(backend));

            let result = orchestrator
                .handle_chat(HandleChatCommand::start("I think the Earth is flat"))
                .await;

            let err = result.unwrap_err();
            assert_eq!(err.code(), ErrorCode::GenerationTimeout);

            assert_eq!(store.len().await, 1);
            let id = store.ids().await[0];
            let conversation = store.snapshot(id).await.unwrap();
            assert_eq!(conversation.turn_count(), 1);
            assert!(conversation.history()[0].is_user());
        }

        #[test]
        fn errors_convert_to_domain_errors() {
            let domain: DomainError = ChatError::Generation(GenerationError::quota_exceeded("x")).into();
            assert_eq!(domain.code, ErrorCode::QuotaExceeded);
            assert_eq!(domain.details.get("kind").map(String::as_str), Some("QuotaExceeded"));

            let id = ConversationId::new();
            let domain: DomainError = ChatError::ConversationNotFound(id).into();
            assert_eq!(domain.code, ErrorCode::ConversationNotFound);
            assert_eq!(domain.details.get("conversation_id"), Some(&id.to_string()));

            let domain: DomainError =
                ChatError::Validation(ValidationError::empty_field("message")).into();
            assert_eq!(domain.code, ErrorCode::ValidationFailed);
        }
    }

    mod concurrency {
        use super::*;
        use std::time::Duration;

        #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
        async fn concurrent_exchanges_alternate() {
            let backend = Arc::new(MockReplyBackend::new().with_delay(Duration::from_millis(5)));
            let (orchestrator, store) = orchestrator_with(backend.clone());
            let id = orchestrator
                .handle_chat(HandleChatCommand::start("I think the Earth is flat"))
                .await
                .unwrap()
                .conversation_id;

            const N: usize = 16;
            let mut tasks = Vec::with_capacity(N);
            for i in 0..N {
                let orchestrator = orchestrator.clone();
                tasks.push(tokio::spawn(async move {
                    orchestrator
                        .handle_chat(HandleChatCommand::reply(
                            id,
                            format!("Argument {i} that the Earth is flat"),
                        ))
                        .await
                }));
            }
            for task in tasks {
                task.await.unwrap().unwrap();
            }

            let conversation = store.snapshot(id).await.unwrap();
            let history = conversation.history();
            assert_eq!(history.len(), 2 * (N + 1));
            assert_eq!(history.iter().filter(|t| t.is_user()).count(), N + 1);
            for (index, turn) in history.iter().enumerate() {
                let expected = if index % 2 == 0 { Role::User } else { Role::Bot };
                assert_eq!(turn.role(), expected, "turn {index} out of order");
            }
            assert_eq!(backend.call_count(), N + 1);
        }

        #[tokio::test]
        async fn dropped_exchange_keeps_user_turn_only() {
            let backend = Arc::new(MockReplyBackend::new().with_delay(Duration::from_secs(5)));
            let (orchestrator, store) = orchestrator_with(backend);
            let opening = store
                .get_or_create(None, "I think the Earth is flat", None)
                .await
                .unwrap();

            let pending = orchestrator.handle_chat(HandleChatCommand::reply(
                opening.id,
                "The Earth is flat",
            ));
            let timed_out = tokio::time::timeout(Duration::from_millis(50), pending).await;
            assert!(timed_out.is_err());

            let conversation = store.snapshot(opening.id).await.unwrap();
            assert_eq!(conversation.turn_count(), 1);
            assert!(conversation.history()[0].is_user());

            // The slot was released when the future was dropped.
            let guard = tokio::time::timeout(
                Duration::from_millis(50),
                store.begin_exchange(opening.id),
            )
            .await;
            assert!(guard.is_ok());
        }
    }
}
