//! Bounded views over a conversation's history.

use super::turn::{Role, Turn};

/// Number of turns per role returned to callers unless configured otherwise.
pub const DEFAULT_MAX_PER_SIDE: usize = 5;

/// Returns the most recent `max_per_side` user turns and the most recent
/// `max_per_side` bot turns, merged back into chronological order.
///
/// The input slice is never modified; callers get owned copies.
pub fn visible_history(turns: &[Turn], max_per_side: usize) -> Vec<Turn> {
    let mut users = 0usize;
    let mut bots = 0usize;
    let mut kept: Vec<&Turn> = Vec::with_capacity(max_per_side * 2);

    for turn in turns.iter().rev() {
        let count = match turn.role() {
            Role::User => &mut users,
            Role::Bot => &mut bots,
        };
        if *count < max_per_side {
            *count += 1;
            kept.push(turn);
        }
    }

    kept.into_iter().rev().cloned().collect()
}

/// Returns the last `n` turns in chronological order.
pub fn recent_turns(turns: &[Turn], n: usize) -> &[Turn] {
    let start = turns.len().saturating_sub(n);
    &turns[start..]
}

/// Returns the content of the most recent turn with the given role.
pub fn last_content(turns: &[Turn], role: Role) -> Option<&str> {
    turns
        .iter()
        .rev()
        .find(|t| t.role() == role)
        .map(|t| t.content())
}
