//! The per-chat conversation record.
//!
//! A record is created lazily the first time a chat is referenced and
//! lives as long as the store that holds it. Clearing history keeps the
//! configured context depth.

use crate::message::{Message, Turn};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum number of turns retained per chat.
pub const CHAT_MAX_NUM: usize = 100;

/// State associated with one chat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Number of prior turns replayed into completion requests.
    pub context_depth: u32,
    /// Retained turns, oldest first.
    history: VecDeque<Turn>,
}

impl Conversation {
    /// Creates an empty conversation with depth 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a turn, evicting the oldest turns so that at most `limit` remain.
    pub fn push_turn(&mut self, turn: Turn, limit: usize) {
        while !self.history.is_empty() && self.history.len() >= limit {
            self.history.pop_front();
        }
        if limit > 0 {
            self.history.push_back(turn);
        }
    }

    /// Empties the history and returns what it held.
    pub fn take_history(&mut self) -> Vec<Turn> {
        self.history.drain(..).collect()
    }

    /// Returns a copy of the retained turns, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<Turn> {
        self.history.iter().cloned().collect()
    }

    /// Returns the number of retained turns.
    #[must_use]
    pub fn turn_count(&self) -> usize {
        self.history.len()
    }
}

/// Expands the last `min(depth, turns.len())` turns into completion
/// messages, oldest first.
#[must_use]
pub fn context_messages(turns: &[Turn], depth: u32) -> Vec<Message> {
    let depth = usize::try_from(depth).unwrap_or(usize::MAX);
    let start = turns.len().saturating_sub(depth);
    turns[start..].iter().flat_map(Turn::to_messages).collect()
}
