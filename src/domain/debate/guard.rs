//! Input screening for user messages.
//!
//! Covers prompt-injection detection, sanitisation before text reaches a
//! model, repeat detection and a keyword-based on-topic check.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

/// Similarity at or above which two messages count as the same point.
pub const REPEAT_SIMILARITY: f64 = 0.9;

static INJECTION: Lazy<Regex> = Lazy::new(|| {
    let patterns = [
        r"\bignore\s+(?:all|previous|above)\s+(?:rules|instructions)\b",
        r"\b(?:disable|bypass)\b.*\b(?:safety|guardrails|filters?)\b",
        r"\bas\s+(?:system|developer|admin)\b",
        r"\b(?:you\s+are\s+now|pretend\s+to\s+be)\b",
        r"\bdo\s+anything\s+now\b",
        r"(?-i:\bDAN\b)",
        r"\b(?:reveal|print|show)\b.*\b(?:system\s+prompt|hidden\s+instructions|secrets?)\b",
        r"\b(?:execute|run)\b.*\b(?:command|code|shell)\b",
        r"\bhttps?://",
        r"\b(?:fetch|scrape|crawl|download)\b",
    ];
    Regex::new(&format!("(?i){}", patterns.join("|"))).unwrap()
});

static CODE_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```.*?```").unwrap());

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z]{3,}").unwrap());

static SMALL_TALK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:your\s+name|who\s+are\s+you|what\s+is\s+your\s+name)\b").unwrap()
});

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "that", "this", "with", "have", "you", "but", "not", "are", "was",
    "has", "why", "better", "than", "can", "your", "about", "what", "when", "where", "which",
    "who", "would", "could", "should", "please", "explain", "tell", "more", "wrong", "claim",
    "right", "call", "correct",
];

const FOLLOW_UPS: &[&str] = &[
    "why", "how", "example", "examples", "explain", "more", "details", "prove", "evidence",
    "source", "sources", "clarify", "elaborate", "convinced", "convince", "agree", "disagree",
    "believe", "think",
];

/// Returns the matched fragment when the text looks like an attempt to
/// override instructions or reach outside the debate.
pub fn detect_prompt_injection(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    INJECTION.find(text).map(|m| m.as_str().to_string())
}

/// Replaces fenced code blocks and collapses whitespace.
pub fn sanitize_user_text(text: &str) -> String {
    let without_code = CODE_BLOCK.replace_all(text, "[code omitted]");
    WHITESPACE.replace_all(&without_code, " ").trim().to_string()
}

/// Lowercases, strips punctuation and collapses whitespace.
pub fn normalize(text: &str) -> String {
    let lower = text.to_lowercase();
    let spaced = PUNCTUATION.replace_all(&lower, " ");
    WHITESPACE.replace_all(&spaced, " ").trim().to_string()
}

/// Jaccard similarity over character bigrams of the normalised texts.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = bigrams(&normalize(a));
    let b = bigrams(&normalize(b));

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let intersection = a.intersection(&b).count();
    let union = a.union(&b).count();

    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

fn bigrams(text: &str) -> HashSet<(char, char)> {
    let chars: Vec<char> = text.chars().collect();
    chars.windows(2).map(|w| (w[0], w[1])).collect()
}

/// True when `current` restates `previous`.
pub fn is_repeat(current: &str, previous: &str) -> bool {
    let a = normalize(current);
    let b = normalize(previous);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a == b || similarity(&a, &b) >= REPEAT_SIMILARITY
}

/// Content words of at least three letters, minus stopwords.
pub fn keywords(text: &str) -> HashSet<String> {
    WORD.find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect()
}

/// True when the message shares vocabulary with the thesis or reads as a
/// follow-up question about it.
pub fn is_on_topic(message: &str, thesis: &str) -> bool {
    let from_message = keywords(message);
    let from_thesis = keywords(thesis);
    if !from_message.is_disjoint(&from_thesis) {
        return true;
    }

    let lower = message.to_lowercase();
    if SMALL_TALK.is_match(&lower) {
        return false;
    }

    lower
        .split(|c: char| !c.is_ascii_alphabetic())
        .any(|token| FOLLOW_UPS.contains(&token))
}
