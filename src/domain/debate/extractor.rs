//! Derives a topic label and a fixed stance from an opening message.
//!
//! Extraction is a fixed list of phrase heuristics tried in order. The bot
//! always ends up with a side to defend: when the message states an opinion
//! the bot opposes it, and when it names only a bare topic the side is chosen
//! from a digest of the topic so the same topic always gets the same side.

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

use super::stance::{DebatePosition, Side, Stance};
use crate::domain::foundation::ValidationError;

/// Longest topic label kept, in characters.
pub const TOPIC_LABEL_MAX_CHARS: usize = 60;

static BETTER_THAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bwhy\s+(.+?)\s+is\s+better\s+than\s+(.+)$").unwrap());

static ARGUE_AGAINST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:argue|debate|explain)\s+against\s+(.+)$").unwrap());

static WHY_WRONG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bwhy\s+(.+?)\s+is\s+wrong\b").unwrap());

static ARGUE_FOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:argue|debate|explain)\s+(?:for|in\s+favou?r\s+of)\s+(.+)$").unwrap()
});

static LABELLED_TOPIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:topic|debate)\s*:\s*(.+)$").unwrap());

static OPINION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:i\s+(?:really\s+)?(?:think|believe|feel|reckon)(?:\s+that)?|in\s+my\s+opinion,?|imo,?)\s+(.+)$",
    )
    .unwrap()
});

/// Stateless stance extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct StanceExtractor;

impl StanceExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Derives topic and stance from the first user message.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyField` when the message is empty or
    /// whitespace only.
    pub fn extract(&self, first_message: &str) -> Result<DebatePosition, ValidationError> {
        let text = trim_claim(first_message);
        if text.is_empty() {
            return Err(ValidationError::empty_field("message"));
        }

        if let Some(caps) = BETTER_THAN.captures(text) {
            let x = trim_claim(&caps[1]);
            let y = trim_claim(&caps[2]);
            if !x.is_empty() && !y.is_empty() {
                return Ok(position(
                    &format!("{x} vs {y}"),
                    Stance::new(Side::Pro, x, format!("{x} is better than {y}")),
                ));
            }
        }

        if let Some(x) = single_capture(&ARGUE_AGAINST, text) {
            return Ok(position(
                x,
                Stance::new(Side::Con, x, format!("{x} is not correct")),
            ));
        }

        if let Some(x) = single_capture(&WHY_WRONG, text) {
            return Ok(position(x, Stance::new(Side::Con, x, format!("{x} is wrong"))));
        }

        if let Some(x) = single_capture(&ARGUE_FOR, text) {
            return Ok(position(
                x,
                Stance::new(Side::Pro, x, format!("{x} is the right call")),
            ));
        }

        if let Some(x) = single_capture(&LABELLED_TOPIC, text) {
            let stance = match side_for_topic(x) {
                Side::Pro => Stance::new(Side::Pro, x, format!("{x} is right")),
                Side::Con => Stance::new(Side::Con, x, format!("{x} is wrong")),
            };
            return Ok(position(x, stance));
        }

        let claim = single_capture(&OPINION, text).unwrap_or(text);
        Ok(position(claim, opposing(claim)))
    }

    /// Like [`extract`](Self::extract), but a non-empty `topic_hint` replaces
    /// the derived topic label. The stance still comes from the message.
    pub fn extract_with_hint(
        &self,
        first_message: &str,
        topic_hint: Option<&str>,
    ) -> Result<DebatePosition, ValidationError> {
        let mut derived = self.extract(first_message)?;
        if let Some(hint) = topic_hint.map(str::trim).filter(|h| !h.is_empty()) {
            derived.topic = topic_label(hint);
        }
        Ok(derived)
    }
}

fn single_capture<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| trim_claim(m.as_str()))
        .filter(|s| !s.is_empty())
}

fn opposing(claim: &str) -> Stance {
    Stance::new(Side::Con, claim, format!("it is wrong to claim that {claim}"))
}

fn position(topic: &str, stance: Stance) -> DebatePosition {
    DebatePosition {
        topic: topic_label(topic),
        stance,
    }
}

fn trim_claim(s: &str) -> &str {
    s.trim().trim_end_matches(['.', '!', '?']).trim_end()
}

/// Caps a label at [`TOPIC_LABEL_MAX_CHARS`], cutting on a word boundary
/// when one exists.
pub fn topic_label(raw: &str) -> String {
    let raw = raw.trim();
    if raw.chars().count() <= TOPIC_LABEL_MAX_CHARS {
        return raw.to_string();
    }

    let cut: String = raw.chars().take(TOPIC_LABEL_MAX_CHARS).collect();
    match cut.rfind(char::is_whitespace) {
        Some(idx) if idx > 0 => cut[..idx].trim_end().to_string(),
        _ => cut,
    }
}

fn side_for_topic(topic: &str) -> Side {
    let digest = Sha256::digest(topic.to_lowercase().as_bytes());
    if digest[0] % 2 == 0 {
        Side::Pro
    } else {
        Side::Con
    }
}
