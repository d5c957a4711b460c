//! Scripted completion provider for tests.
//!
//! Returns queued completions or errors in order, optionally after a delay,
//! and records every request so tests can inspect what the model-backed
//! backend sent.
//!
//! # Example
//!
//! ```ignore
//! let provider = MockCompletionProvider::new()
//!     .with_error(ProviderError::rate_limited(1))
//!     .with_response("The Earth is an oblate spheroid.");
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    CompletionProvider, CompletionRequest, CompletionResponse, FinishReason, ProviderError,
    ProviderInfo, TokenUsage,
};

const DEFAULT_CONTENT: &str = "Mock response";

/// Completion provider driven by a queue of scripted outcomes.
#[derive(Debug, Clone)]
pub struct MockCompletionProvider {
    /// Scripted outcomes, consumed in order.
    outcomes: Arc<Mutex<VecDeque<Result<String, ProviderError>>>>,
    info: ProviderInfo,
    /// Simulated latency per request.
    delay: Duration,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl Default for MockCompletionProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCompletionProvider {
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            info: ProviderInfo::new("mock", "mock-model-1"),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a successful completion.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.outcomes.lock().unwrap().push_back(Ok(content.into()));
        self
    }

    /// Queues a failure.
    pub fn with_error(self, error: ProviderError) -> Self {
        self.outcomes.lock().unwrap().push_back(Err(error));
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns all recorded requests.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    fn next_outcome(&self) -> Result<String, ProviderError> {
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(DEFAULT_CONTENT.to_string()))
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        self.calls.lock().unwrap().push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let content = self.next_outcome()?;
        Ok(CompletionResponse {
            usage: TokenUsage::new(10, (content.len() / 4) as u32),
            content,
            model: self.info.model.clone(),
            finish_reason: FinishReason::Stop,
        })
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MessageRole;

    fn test_request() -> CompletionRequest {
        CompletionRequest::new().with_message(MessageRole::User, "Hello")
    }

    #[tokio::test]
    async fn returns_outcomes_in_order_then_default() {
        let provider = MockCompletionProvider::new()
            .with_response("First")
            .with_error(ProviderError::network("reset"))
            .with_response("Third");

        assert_eq!(provider.complete(test_request()).await.unwrap().content, "First");
        assert!(matches!(
            provider.complete(test_request()).await,
            Err(ProviderError::Network(_))
        ));
        assert_eq!(provider.complete(test_request()).await.unwrap().content, "Third");
        assert_eq!(
            provider.complete(test_request()).await.unwrap().content,
            DEFAULT_CONTENT
        );
    }

    #[tokio::test]
    async fn records_calls() {
        let provider = MockCompletionProvider::new();

        provider.complete(test_request()).await.unwrap();
        provider.complete(test_request()).await.unwrap();

        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.get_calls()[0].messages[0].content, "Hello");
    }

    #[tokio::test]
    async fn delay_is_applied() {
        let provider = MockCompletionProvider::new().with_delay(Duration::from_millis(30));
        let start = tokio::time::Instant::now();

        provider.complete(test_request()).await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(30));
    }
}
