//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `ConversationStore` - Registry of live conversations
//! - `ReplyBackend` - Produces the bot's next message
//! - `CompletionProvider` - External chat-completion model API

mod completion_provider;
mod conversation_store;
mod reply_backend;

pub use completion_provider::{
    CompletionProvider, CompletionRequest, CompletionResponse, FinishReason, Message, MessageRole,
    ProviderConfigurationError, ProviderError, ProviderInfo, TokenUsage,
};
pub use conversation_store::{ConversationOpening, ConversationStore, ExchangeGuard, StoreError};
pub use reply_backend::{GenerationError, ReplyBackend};
