//! Generation request handed to reply backends.

use serde::{Deserialize, Serialize};

use super::stance::Stance;
use super::turn::Turn;

/// How the policy classified the newest user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyIntent {
    /// Counter the user's argument.
    Rebut,
    /// The user drifted away from the topic.
    SteerBack,
    /// The user restated their previous message.
    AddressRepeat,
    /// The user tried to change the bot's rules or reach external data.
    RefuseOverride,
}

/// Output limits passed through to model-backed generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationConstraints {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationConstraints {
    fn default() -> Self {
        Self {
            max_tokens: 400,
            temperature: 0.6,
        }
    }
}

/// Everything a backend needs to produce one bot reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub topic: String,
    pub stance: Stance,
    pub system_prompt: String,
    /// Turns preceding the new message, oldest first.
    pub context: Vec<Turn>,
    /// Sanitised text of the new user message.
    pub user_message: String,
    pub intent: ReplyIntent,
    pub constraints: GenerationConstraints,
}

impl GenerationRequest {
    pub fn thesis(&self) -> &str {
        self.stance.thesis()
    }

    /// Content of the most recent bot turn in the context, if any.
    pub fn last_bot_reply(&self) -> Option<&str> {
        self.context
            .iter()
            .rev()
            .find(|t| t.is_bot())
            .map(|t| t.content())
    }
}
