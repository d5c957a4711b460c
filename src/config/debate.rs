//! Debate behaviour limits

use serde::Deserialize;

use super::error::ValidationError;

/// Limits applied to conversations and incoming messages
#[derive(Debug, Clone, Deserialize)]
pub struct DebateConfig {
    /// Turns per role returned in each response
    #[serde(default = "default_max_per_side")]
    pub max_per_side: usize,

    /// Prior turns sent to the model as context
    #[serde(default = "default_context_turns")]
    pub context_turns: usize,

    /// Longest accepted user message, in characters
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,

    /// Longest accepted topic hint, in characters
    #[serde(default = "default_max_topic_chars")]
    pub max_topic_chars: usize,
}

impl DebateConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_per_side == 0 {
            return Err(ValidationError::MustBePositive("max_per_side"));
        }
        if self.max_message_chars == 0 {
            return Err(ValidationError::MustBePositive("max_message_chars"));
        }
        if self.max_topic_chars == 0 {
            return Err(ValidationError::MustBePositive("max_topic_chars"));
        }
        Ok(())
    }
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            max_per_side: default_max_per_side(),
            context_turns: default_context_turns(),
            max_message_chars: default_max_message_chars(),
            max_topic_chars: default_max_topic_chars(),
        }
    }
}

fn default_max_per_side() -> usize {
    5
}

fn default_context_turns() -> usize {
    6
}

fn default_max_message_chars() -> usize {
    2000
}

fn default_max_topic_chars() -> usize {
    200
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DebateConfig::default();
        assert_eq!(config.max_per_side, 5);
        assert_eq!(config.context_turns, 6);
        assert_eq!(config.max_message_chars, 2000);
        assert_eq!(config.max_topic_chars, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = DebateConfig {
            max_per_side: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MustBePositive("max_per_side"))
        );
    }
}
