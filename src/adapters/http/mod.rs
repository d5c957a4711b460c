//! HTTP adapters - REST API implementations.

pub mod chat;
mod router;

pub use chat::{chat_routes, ChatAppState};
pub use router::app_router;
