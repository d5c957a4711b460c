//! Chat command handler.

mod handle_chat;

pub use handle_chat::{ChatError, ChatExchange, ChatOrchestrator, ChatSettings, HandleChatCommand};
