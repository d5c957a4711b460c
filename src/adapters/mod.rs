//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Reply backends and completion providers (offline templates, OpenAI)
//! - `http` - Axum routes for the chat API
//! - `storage` - Conversation store implementations (in-memory)

pub mod ai;
pub mod http;
pub mod storage;
