//! Model-backed reply backend.
//!
//! Delegates rebuttals and steer-backs to a [`CompletionProvider`], enforcing
//! a per-attempt timeout and retrying transient failures with exponential
//! backoff. Override attempts and repeated points get fixed answers without
//! a provider call.

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};

use super::mock_backend::{refusal, repeat_reply};
use crate::config::AppConfig;
use crate::domain::debate::{GenerationRequest, ReplyIntent, Role};
use crate::ports::{
    CompletionProvider, CompletionRequest, GenerationError, MessageRole, ProviderError,
    ReplyBackend,
};

/// Headroom left between the retry deadline and the HTTP request timeout.
pub const DEADLINE_MARGIN: Duration = Duration::from_secs(1);

/// Retry and timeout behaviour of the model-backed backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelBackedSettings {
    /// Upper bound on a single provider attempt.
    pub timeout: Duration,
    /// Extra attempts after the first for transient failures.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub initial_backoff: Duration,
    /// Upper bound on all attempts and backoff together. Must stay below the
    /// HTTP request timeout so failures reach the caller as errors.
    pub deadline: Duration,
    /// Return `[DEBUG <Kind>] <message>` instead of failing.
    pub debug_replies: bool,
}

impl ModelBackedSettings {
    /// Settings for the configured provider, with the deadline derived from
    /// the server's request timeout.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            timeout: config.ai.timeout(),
            max_retries: config.ai.max_retries,
            initial_backoff: Duration::from_secs(1),
            deadline: config
                .server
                .request_timeout()
                .saturating_sub(DEADLINE_MARGIN),
            debug_replies: config.features.debug_replies,
        }
    }
}

impl Default for ModelBackedSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Reply backend that calls an external completion provider.
#[derive(Debug)]
pub struct ModelBackedReplyBackend<P: CompletionProvider> {
    provider: P,
    settings: ModelBackedSettings,
}

impl<P: CompletionProvider> ModelBackedReplyBackend<P> {
    pub fn new(provider: P, settings: ModelBackedSettings) -> Self {
        Self { provider, settings }
    }

    async fn call_with_retries(
        &self,
        completion: CompletionRequest,
    ) -> Result<String, GenerationError> {
        let started = Instant::now();
        let mut attempt = 0u32;
        loop {
            let remaining = self.settings.deadline.saturating_sub(started.elapsed());
            let attempt_timeout = self.settings.timeout.min(remaining);
            let outcome =
                match timeout(attempt_timeout, self.provider.complete(completion.clone())).await {
                    Ok(result) => result,
                    Err(_) => Err(ProviderError::Timeout {
                        timeout: attempt_timeout,
                    }),
                };

            match outcome {
                Ok(response) => {
                    let content = response.content.trim();
                    if content.is_empty() {
                        return Err(GenerationError::malformed("provider returned an empty completion"));
                    }
                    return Ok(content.to_string());
                }
                Err(err) if err.is_retryable() && attempt < self.settings.max_retries => {
                    // Exponential backoff: 1s, 2s, 4s, ...
                    let delay = self.settings.initial_backoff * 2u32.pow(attempt);
                    let remaining = self.settings.deadline.saturating_sub(started.elapsed());
                    if delay >= remaining {
                        tracing::warn!(
                            error = %err,
                            attempt = attempt + 1,
                            "completion failed, no time left to retry"
                        );
                        return Err(err.into());
                    }
                    tracing::warn!(
                        error = %err,
                        attempt = attempt + 1,
                        retry_in_ms = delay.as_millis() as u64,
                        "completion attempt failed, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

/// Maps a generation request onto the provider's message format.
fn to_completion_request(request: &GenerationRequest) -> CompletionRequest {
    let mut completion = CompletionRequest::new()
        .with_system_prompt(request.system_prompt.clone())
        .with_max_tokens(request.constraints.max_tokens)
        .with_temperature(request.constraints.temperature);

    for turn in &request.context {
        let role = match turn.role() {
            Role::User => MessageRole::User,
            Role::Bot => MessageRole::Assistant,
        };
        completion = completion.with_message(role, turn.content());
    }

    completion.with_message(MessageRole::User, request.user_message.clone())
}

#[async_trait]
impl<P: CompletionProvider> ReplyBackend for ModelBackedReplyBackend<P> {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        match request.intent {
            ReplyIntent::RefuseOverride => return Ok(refusal(request)),
            ReplyIntent::AddressRepeat => return Ok(repeat_reply(request)),
            ReplyIntent::Rebut | ReplyIntent::SteerBack => {}
        }

        match self.call_with_retries(to_completion_request(request)).await {
            Ok(reply) => Ok(reply),
            Err(err) if self.settings.debug_replies => {
                tracing::warn!(kind = err.kind(), error = %err, "generation failed, returning debug reply");
                Ok(format!("[DEBUG {}] {}", err.kind(), err))
            }
            Err(err) => Err(err),
        }
    }

    fn name(&self) -> &'static str {
        "model"
    }
}
