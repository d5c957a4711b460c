//! Stance value objects.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of a claim the bot argues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Pro,
    Con,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Pro => write!(f, "pro"),
            Side::Con => write!(f, "con"),
        }
    }
}

/// The fixed position the bot defends for the lifetime of a conversation.
///
/// Displayed as `"<side> <subject>"`, e.g. `"con the Earth is flat"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stance {
    side: Side,
    subject: String,
    thesis: String,
}

impl Stance {
    pub fn new(side: Side, subject: impl Into<String>, thesis: impl Into<String>) -> Self {
        Self {
            side,
            subject: subject.into(),
            thesis: thesis.into(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// The claim or option the side refers to.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// One-sentence claim the bot defends.
    pub fn thesis(&self) -> &str {
        &self.thesis
    }
}

impl fmt::Display for Stance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.side, self.subject)
    }
}

/// Topic label plus stance, as derived from an opening message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebatePosition {
    pub topic: String,
    pub stance: Stance,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stance_displays_side_then_subject() {
        let stance = Stance::new(Side::Con, "the Earth is flat", "the Earth is flat is wrong");
        assert_eq!(stance.to_string(), "con the Earth is flat");
    }
}
