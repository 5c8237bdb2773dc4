//! History store abstraction.

use crate::conversation::context_messages;
use crate::error::StoreError;
use crate::message::{Message, Turn};
use async_trait::async_trait;
use rootcause::Report;
use voice_relay_core::ChatId;

/// Trait for per-chat turn history storage.
///
/// Implementations keep at most [`CHAT_MAX_NUM`](crate::CHAT_MAX_NUM) turns
/// per chat (or whatever bound they were built with) and evict oldest first.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Returns the retained turns, oldest first. Unknown chats have none.
    async fn history(&self, chat_id: ChatId) -> Result<Vec<Turn>, Report<StoreError>>;

    /// Appends a turn, evicting the oldest when full, and returns the
    /// resulting history.
    async fn append_turn(
        &self,
        chat_id: ChatId,
        turn: Turn,
    ) -> Result<Vec<Turn>, Report<StoreError>>;

    /// Empties the history and returns the turns it held before clearing.
    ///
    /// The chat's context depth is left untouched.
    async fn clear_history(&self, chat_id: ChatId) -> Result<Vec<Turn>, Report<StoreError>>;

    /// Returns the last `min(depth, len)` turns as completion messages,
    /// user then assistant per turn, oldest first.
    async fn context_slice(
        &self,
        chat_id: ChatId,
        depth: u32,
    ) -> Result<Vec<Message>, Report<StoreError>> {
        if depth == 0 {
            return Ok(Vec::new());
        }
        let turns = self.history(chat_id).await?;
        Ok(context_messages(&turns, depth))
    }
}
