//! HTTP handlers for the chat endpoints.
//!
//! These handlers connect Axum routes to the chat orchestrator.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::{ChatError, ChatOrchestrator, HandleChatCommand};
use crate::domain::foundation::{ConversationId, DomainError, ErrorCode};

use super::dto::{ChatRequest, ChatResponse, ErrorResponse, HealthResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state for chat handlers.
#[derive(Clone)]
pub struct ChatAppState {
    pub orchestrator: ChatOrchestrator,
}

impl ChatAppState {
    pub fn new(orchestrator: ChatOrchestrator) -> Self {
        Self { orchestrator }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// GET /
// ════════════════════════════════════════════════════════════════════════════════

/// GET / - Liveness check.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse::ok()))
}

// ════════════════════════════════════════════════════════════════════════════════
// POST /chat
// ════════════════════════════════════════════════════════════════════════════════

/// POST /chat - Start or continue a debate.
///
/// Returns the conversation id and the recent history, ending with the bot's
/// reply.
///
/// # Errors
/// - 422 Unprocessable Entity: Malformed body, empty or oversized fields
/// - 404 Not Found: Unknown or unparseable conversation id
/// - 429 Too Many Requests: Provider quota exhausted
/// - 502 Bad Gateway: Provider unavailable or returned an unusable reply
/// - 504 Gateway Timeout: Provider did not answer in time
pub async fn post_chat(
    State(state): State<ChatAppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ChatApiError> {
    let Json(request) = payload.map_err(|rejection| ChatApiError::InvalidBody(rejection.body_text()))?;

    let conversation_id = request.conversation_id().map(str::to_string);
    let mut command = match conversation_id {
        Some(raw) => {
            let id: ConversationId = raw
                .parse()
                .map_err(|_| ChatApiError::UnknownConversation(raw.clone()))?;
            HandleChatCommand::reply(id, request.message)
        }
        None => HandleChatCommand::start(request.message),
    };
    if let Some(topic) = request.topic {
        command = command.with_topic_hint(topic);
    }

    let exchange = state.orchestrator.handle_chat(command).await?;

    let response = ChatResponse::new(exchange.conversation_id.to_string(), &exchange.history);
    Ok((StatusCode::OK, Json(response)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type for chat endpoints.
#[derive(Debug)]
pub enum ChatApiError {
    /// The body could not be parsed into a `ChatRequest`.
    InvalidBody(String),
    /// The supplied conversation id is not a valid id.
    UnknownConversation(String),
    Chat(ChatError),
}

impl From<ChatError> for ChatApiError {
    fn from(err: ChatError) -> Self {
        ChatApiError::Chat(err)
    }
}

/// HTTP status for each error code.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::ConversationNotFound => StatusCode::NOT_FOUND,
        ErrorCode::QuotaExceeded => StatusCode::TOO_MANY_REQUESTS,
        ErrorCode::GenerationTimeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorCode::MalformedResponse | ErrorCode::ProviderUnavailable => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ChatApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ChatApiError::InvalidBody(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse::validation(msg),
            ),
            ChatApiError::UnknownConversation(id) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::not_found("Conversation", &id),
            ),
            ChatApiError::Chat(err) => {
                let status = status_for(err.code());
                (status, ErrorResponse::from(DomainError::from(err)))
            }
        };
        (status, Json(error)).into_response()
    }
}
