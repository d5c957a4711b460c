//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod chat;

pub use chat::{ChatError, ChatExchange, ChatOrchestrator, ChatSettings, HandleChatCommand};
