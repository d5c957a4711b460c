//! Reply backends and completion provider adapters.
//!
//! ## Available Adapters
//!
//! - `MockReplyBackend` - Offline templated replies (default)
//! - `ModelBackedReplyBackend` - Replies from a completion provider, with timeout and retries
//! - `OpenAIProvider` - OpenAI chat-completions API
//! - `MockCompletionProvider` - Scripted provider for tests

mod mock_backend;
mod mock_provider;
mod model_backed;
mod openai_provider;

pub use mock_backend::MockReplyBackend;
pub use mock_provider::MockCompletionProvider;
pub use model_backed::{ModelBackedReplyBackend, ModelBackedSettings};
pub use openai_provider::{OpenAIConfig, OpenAIProvider};

use std::sync::Arc;

use crate::config::AppConfig;
use crate::ports::{ProviderConfigurationError, ReplyBackend};

/// Chooses the reply backend once, at startup.
///
/// # Errors
///
/// Returns `ProviderConfigurationError` when model-backed replies are enabled
/// but the API key is missing or malformed, or the HTTP client cannot be built.
pub fn build_reply_backend(
    config: &AppConfig,
) -> Result<Arc<dyn ReplyBackend>, ProviderConfigurationError> {
    if !config.features.use_ai {
        tracing::info!("using offline reply backend");
        return Ok(Arc::new(MockReplyBackend::new()));
    }

    let api_key = config
        .ai
        .openai_api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or(ProviderConfigurationError::MissingApiKey)?;
    if !api_key.starts_with("sk-") {
        return Err(ProviderConfigurationError::InvalidApiKey);
    }

    let provider = OpenAIProvider::new(
        OpenAIConfig::new(api_key)
            .with_model(&config.ai.model)
            .with_base_url(&config.ai.base_url)
            .with_timeout(config.ai.timeout()),
    )?;

    let settings = ModelBackedSettings::from_config(config);

    tracing::info!(
        model = %config.ai.model,
        max_retries = settings.max_retries,
        deadline_ms = settings.deadline.as_millis() as u64,
        "using model-backed reply backend"
    );
    Ok(Arc::new(ModelBackedReplyBackend::new(provider, settings)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AiConfig, FeatureFlags};

    fn with_ai(key: Option<&str>) -> AppConfig {
        AppConfig {
            ai: AiConfig {
                openai_api_key: key.map(str::to_string),
                ..Default::default()
            },
            features: FeatureFlags {
                use_ai: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn offline_by_default() {
        let backend = build_reply_backend(&AppConfig::default()).unwrap();
        assert_eq!(backend.name(), "mock");
    }

    #[test]
    fn model_backed_when_enabled() {
        let backend = build_reply_backend(&with_ai(Some("sk-test"))).unwrap();
        assert_eq!(backend.name(), "model");
    }

    #[test]
    fn missing_key_is_fatal() {
        assert!(matches!(
            build_reply_backend(&with_ai(None)),
            Err(ProviderConfigurationError::MissingApiKey)
        ));
        assert!(matches!(
            build_reply_backend(&with_ai(Some("  "))),
            Err(ProviderConfigurationError::MissingApiKey)
        ));
    }

    #[test]
    fn malformed_key_is_fatal() {
        assert!(matches!(
            build_reply_backend(&with_ai(Some("pk-test"))),
            Err(ProviderConfigurationError::InvalidApiKey)
        ));
    }
}
