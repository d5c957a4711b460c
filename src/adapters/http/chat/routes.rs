//! Axum routes for the chat endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{health, post_chat, ChatAppState};

/// Creates routes for the chat endpoints.
///
/// REST Endpoints:
/// - GET / - Liveness check
/// - POST /chat - Start or continue a debate
pub fn chat_routes() -> Router<ChatAppState> {
    Router::new()
        .route("/", get(health))
        .route("/chat", post(post_chat))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::adapters::ai::MockReplyBackend;
    use crate::adapters::http::chat::dto::{ChatResponse, ErrorResponse, HealthResponse};
    use crate::adapters::storage::InMemoryConversationStore;
    use crate::application::handlers::{ChatOrchestrator, ChatSettings};
    use crate::domain::debate::{ReplyPolicy, Role};

    fn test_app() -> Router {
        let orchestrator = ChatOrchestrator::new(
            Arc::new(InMemoryConversationStore::new()),
            Arc::new(MockReplyBackend::new()),
            ReplyPolicy::default(),
            ChatSettings::default(),
        );
        chat_routes().with_state(ChatAppState::new(orchestrator))
    }

    fn post_json(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let response = test_app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: HealthResponse = read_json(response).await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.message, "Chatbot Debate API is running");
    }

    #[tokio::test]
    async fn new_conversation_returns_user_and_bot_turns() {
        let response = test_app()
            .oneshot(post_json(serde_json::json!({
                "conversation_id": null,
                "message": "I think the Earth is flat"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: ChatResponse = read_json(response).await;
        assert!(!body.conversation_id.is_empty());
        assert_eq!(body.message.len(), 2);
        assert_eq!(body.message[0].role, Role::User);
        assert_eq!(body.message[0].message, "I think the Earth is flat");
        assert_eq!(body.message[1].role, Role::Bot);
    }

    #[tokio::test]
    async fn unparseable_conversation_id_returns_404() {
        let response = test_app()
            .oneshot(post_json(serde_json::json!({
                "conversation_id": "not-a-real-id",
                "message": "hello"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: ErrorResponse = read_json(response).await;
        assert_eq!(body.code, "CONVERSATION_NOT_FOUND");
    }

    #[tokio::test]
    async fn missing_message_returns_422() {
        let response = test_app()
            .oneshot(post_json(serde_json::json!({ "conversation_id": null })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: ErrorResponse = read_json(response).await;
        assert_eq!(body.code, "VALIDATION_FAILED");
    }

    #[tokio::test]
    async fn empty_message_returns_422() {
        let response = test_app()
            .oneshot(post_json(serde_json::json!({ "message": "   " })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn get_on_chat_is_not_allowed() {
        let response = test_app()
            .oneshot(Request::builder().uri("/chat").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
