//! Debate domain: conversations, stances and the reply policy.

mod conversation;
mod extractor;
pub mod guard;
mod history;
mod policy;
mod request;
mod stance;
mod turn;

pub use conversation::Conversation;
pub use extractor::{topic_label, StanceExtractor, TOPIC_LABEL_MAX_CHARS};
pub use history::{last_content, recent_turns, visible_history, DEFAULT_MAX_PER_SIDE};
pub use policy::{PolicySettings, ReplyPolicy, DEFAULT_CONTEXT_TURNS};
pub use request::{GenerationConstraints, GenerationRequest, ReplyIntent};
pub use stance::{DebatePosition, Side, Stance};
pub use turn::{Role, Turn};
