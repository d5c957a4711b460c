//! Reply Backend Port - Produces the bot's next message.
//!
//! Two implementations exist: an offline templated backend and one that
//! delegates to a [`CompletionProvider`](super::CompletionProvider). Which
//! one runs is decided once at startup.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::debate::GenerationRequest;
use crate::domain::foundation::ErrorCode;

/// Port for reply generation.
#[async_trait]
pub trait ReplyBackend: Send + Sync {
    /// Generates the bot reply for a request. Successful replies are never empty.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

/// Reply generation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("reply generation timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("reply provider quota exceeded: {message}")]
    QuotaExceeded { message: String },

    #[error("malformed reply from provider: {message}")]
    MalformedResponse { message: String },

    #[error("reply provider unavailable: {message}")]
    Unavailable { message: String },
}

impl GenerationError {
    pub fn timeout(timeout: Duration) -> Self {
        Self::Timeout { timeout }
    }

    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        Self::QuotaExceeded {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Variant name, used in logs and debug replies.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::Timeout { .. } => "Timeout",
            GenerationError::QuotaExceeded { .. } => "QuotaExceeded",
            GenerationError::MalformedResponse { .. } => "MalformedResponse",
            GenerationError::Unavailable { .. } => "Unavailable",
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            GenerationError::Timeout { .. } => ErrorCode::GenerationTimeout,
            GenerationError::QuotaExceeded { .. } => ErrorCode::QuotaExceeded,
            GenerationError::MalformedResponse { .. } => ErrorCode::MalformedResponse,
            GenerationError::Unavailable { .. } => ErrorCode::ProviderUnavailable,
        }
    }
}
