//! HTTP adapter for the chat endpoints.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{ChatRequest, ChatResponse, ErrorResponse, HealthResponse, MessageView};
pub use handlers::ChatAppState;
pub use routes::chat_routes;
