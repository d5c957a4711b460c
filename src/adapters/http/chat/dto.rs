//! Data Transfer Objects for the chat endpoints.
//!
//! These types define the JSON request/response shapes for the HTTP API.

use serde::{Deserialize, Serialize};

use crate::domain::debate::{Role, Turn};
use crate::domain::foundation::DomainError;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request body for `POST /chat`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatRequest {
    /// Existing conversation id, or null to start a new debate.
    #[serde(default)]
    pub conversation_id: Option<String>,
    pub message: String,
    /// Optional topic for a new conversation. Ignored when continuing.
    #[serde(default)]
    pub topic: Option<String>,
}

impl ChatRequest {
    /// The supplied conversation id, treating blank strings as absent.
    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// One utterance in a chat response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageView {
    pub role: Role,
    pub message: String,
}

impl From<&Turn> for MessageView {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role(),
            message: turn.content().to_string(),
        }
    }
}

/// Response body for `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub conversation_id: String,
    /// Recent history, oldest first, ending with the bot's latest reply.
    pub message: Vec<MessageView>,
}

impl ChatResponse {
    pub fn new(conversation_id: impl Into<String>, history: &[Turn]) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            message: history.iter().map(MessageView::from).collect(),
        }
    }
}

/// Response body for `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            message: "Chatbot Debate API is running".to_string(),
        }
    }
}

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            code: "VALIDATION_FAILED".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(resource_type: &str, id: &str) -> Self {
        Self {
            code: "CONVERSATION_NOT_FOUND".to_string(),
            message: format!("{} not found: {}", resource_type, id),
            details: Some(serde_json::json!({ "conversation_id": id })),
        }
    }
}

impl From<DomainError> for ErrorResponse {
    fn from(err: DomainError) -> Self {
        let details = if err.details.is_empty() {
            None
        } else {
            serde_json::to_value(&err.details).ok()
        };
        Self {
            code: err.code.to_string(),
            message: err.message,
            details,
        }
    }
}
