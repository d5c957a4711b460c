//! Completion Provider Port - Interface for chat-completion model APIs.
//!
//! The model-backed reply backend talks to language models only through
//! this trait, so the provider can be swapped or mocked in tests.
//!
//! # Example
//!
//! ```ignore
//! let request = CompletionRequest::new()
//!     .with_system_prompt("You are a debate bot.")
//!     .with_message(MessageRole::User, "The Earth is flat")
//!     .with_max_tokens(400)
//!     .with_temperature(0.6);
//!
//! let response = provider.complete(request).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::reply_backend::GenerationError;

/// Port for chat-completion providers.
///
/// Implementations make a single attempt per call; retrying is the caller's
/// concern.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate a single completion.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError>;

    /// Get provider information (name, model).
    fn provider_info(&self) -> ProviderInfo;
}

/// Request for a chat completion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionRequest {
    /// Conversation messages (context + current user message).
    pub messages: Vec<Message>,
    /// System prompt to guide model behavior.
    pub system_prompt: Option<String>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Temperature for response randomness.
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a message to the conversation.
    pub fn with_message(mut self, role: MessageRole, content: impl Into<String>) -> Self {
        self.messages.push(Message::new(role, content));
        self
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Sets the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Sets the temperature.
    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }
}

/// A message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Role of the message sender, in provider terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// Response from a chat completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    /// Generated content.
    pub content: String,
    /// Model that generated the response.
    pub model: String,
    /// Why the model stopped generating.
    pub finish_reason: FinishReason,
    pub usage: TokenUsage,
}

/// Token usage reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Reason the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    Error,
}

/// Provider information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "openai").
    pub name: String,
    /// Model identifier (e.g., "gpt-4o-mini").
    pub model: String,
}

impl ProviderInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// Completion provider errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// Rate limited by provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    /// Account quota or billing limit reached.
    #[error("quota exhausted: {message}")]
    QuotaExhausted { message: String },

    /// API key rejected.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Request rejected as invalid.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Provider temporarily unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    /// Network failure before a response arrived.
    #[error("network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// Response body could not be understood.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ProviderError {
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    pub fn quota_exhausted(message: impl Into<String>) -> Self {
        Self::QuotaExhausted {
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    /// Returns true for transient failures worth another attempt.
    ///
    /// Timeouts are not retried: a slow provider would multiply the
    /// caller's wait.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimited { .. }
                | ProviderError::Unavailable { .. }
                | ProviderError::Network(_)
        )
    }
}

impl From<ProviderError> for GenerationError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Timeout { timeout } => GenerationError::timeout(timeout),
            ProviderError::RateLimited { .. } | ProviderError::QuotaExhausted { .. } => {
                GenerationError::quota_exceeded(err.to_string())
            }
            ProviderError::Malformed(message) => GenerationError::malformed(message),
            ProviderError::AuthenticationFailed
            | ProviderError::InvalidRequest(_)
            | ProviderError::Unavailable { .. }
            | ProviderError::Network(_) => GenerationError::unavailable(err.to_string()),
        }
    }
}

/// Problems constructing a provider at startup.
#[derive(Debug, thiserror::Error)]
pub enum ProviderConfigurationError {
    #[error("an API key is required when model-backed replies are enabled")]
    MissingApiKey,

    #[error("API key has an unexpected format")]
    InvalidApiKey,

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_request_builder_works() {
        let request = CompletionRequest::new()
            .with_message(MessageRole::User, "Hello")
            .with_system_prompt("Debate")
            .with_max_tokens(100)
            .with_temperature(0.7);

        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, MessageRole::User);
        assert_eq!(request.system_prompt, Some("Debate".to_string()));
        assert_eq!(request.max_tokens, Some(100));
        assert_eq!(request.temperature, Some(0.7));
    }

    #[test]
    fn token_usage_calculates_total() {
        assert_eq!(TokenUsage::new(100, 50).total_tokens, 150);
    }

    #[test]
    fn transient_errors_are_retryable() {
        assert!(ProviderError::rate_limited(1).is_retryable());
        assert!(ProviderError::network("reset").is_retryable());
        assert!(ProviderError::unavailable("503").is_retryable());
        assert!(!ProviderError::Timeout {
            timeout: Duration::from_secs(15)
        }
        .is_retryable());
        assert!(!ProviderError::AuthenticationFailed.is_retryable());
        assert!(!ProviderError::malformed("no choices").is_retryable());
        assert!(!ProviderError::quota_exhausted("billing").is_retryable());
    }

    #[test]
    fn provider_errors_map_to_generation_errors() {
        assert_eq!(
            GenerationError::from(ProviderError::Timeout {
                timeout: Duration::from_millis(1500)
            }),
            GenerationError::timeout(Duration::from_millis(1500))
        );
        assert_eq!(
            GenerationError::from(ProviderError::quota_exhausted("billing")).kind(),
            "QuotaExceeded"
        );
        assert_eq!(
            GenerationError::from(ProviderError::malformed("no choices")),
            GenerationError::malformed("no choices")
        );
        assert_eq!(
            GenerationError::from(ProviderError::AuthenticationFailed).kind(),
            "Unavailable"
        );
    }
}
