//! Conversation aggregate.

use serde::{Deserialize, Serialize};

use super::history::visible_history;
use super::stance::{DebatePosition, Stance};
use super::turn::Turn;
use crate::domain::foundation::ConversationId;

/// A single debate between one user and the bot.
///
/// # Invariants
///
/// - `topic` and `stance` are fixed at creation; there are no setters
/// - `history` is append-only and chronological
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    id: ConversationId,
    topic: String,
    stance: Stance,
    history: Vec<Turn>,
}

impl Conversation {
    /// Starts a conversation with an empty history.
    pub fn start(id: ConversationId, position: DebatePosition) -> Self {
        Self {
            id,
            topic: position.topic,
            stance: position.stance,
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> ConversationId {
        self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn stance(&self) -> &Stance {
        &self.stance
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Appends a turn to the end of the history.
    pub fn append(&mut self, turn: Turn) {
        self.history.push(turn);
    }

    /// Bounded chronological view of the history.
    pub fn visible_history(&self, max_per_side: usize) -> Vec<Turn> {
        visible_history(&self.history, max_per_side)
    }

    pub fn turn_count(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::debate::stance::Side;

    fn conversation() -> Conversation {
        Conversation::start(
            ConversationId::new(),
            DebatePosition {
                topic: "the Earth is flat".to_string(),
                stance: Stance::new(
                    Side::Con,
                    "the Earth is flat",
                    "it is wrong to claim that the Earth is flat",
                ),
            },
        )
    }

    #[test]
    fn starts_empty() {
        let c = conversation();
        assert_eq!(c.turn_count(), 0);
        assert_eq!(c.topic(), "the Earth is flat");
        assert_eq!(c.stance().side(), Side::Con);
    }

    #[test]
    fn append_keeps_order() {
        let mut c = conversation();
        c.append(Turn::user("first"));
        c.append(Turn::bot("second"));
        c.append(Turn::user("third"));

        let contents: Vec<&str> = c.history().iter().map(|t| t.content()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
    }

    #[test]
    fn visible_history_leaves_stored_history_intact() {
        let mut c = conversation();
        for i in 0..8 {
            c.append(Turn::user(format!("u{i}")));
            c.append(Turn::bot(format!("b{i}")));
        }
        assert_eq!(c.visible_history(5).len(), 10);
        assert_eq!(c.turn_count(), 16);
    }
}
