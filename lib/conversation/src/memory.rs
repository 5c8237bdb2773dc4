//! In-process conversation store.
//!
//! Holds every chat's [`Conversation`] in a shared map. State lives as long
//! as the process; nothing is persisted.

use crate::context::ContextPolicy;
use crate::conversation::{CHAT_MAX_NUM, Conversation};
use crate::error::StoreError;
use crate::history::HistoryStore;
use crate::message::Turn;
use async_trait::async_trait;
use rootcause::Report;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;
use voice_relay_core::ChatId;

type ConversationMap = HashMap<ChatId, Conversation>;

/// In-memory [`HistoryStore`] and [`ContextPolicy`].
#[derive(Debug, Clone)]
pub struct InMemoryConversationStore {
    conversations: Arc<RwLock<ConversationMap>>,
    max_turns: usize,
}

impl Default for InMemoryConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryConversationStore {
    /// Creates an empty store retaining [`CHAT_MAX_NUM`] turns per chat.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_turns(CHAT_MAX_NUM)
    }

    /// Creates an empty store with a custom per-chat turn bound.
    #[must_use]
    pub fn with_max_turns(max_turns: usize) -> Self {
        Self {
            conversations: Arc::new(RwLock::new(HashMap::new())),
            max_turns,
        }
    }

    /// Returns the number of chats that have been referenced.
    pub fn chat_count(&self) -> Result<usize, Report<StoreError>> {
        Ok(self.read()?.len())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, ConversationMap>, StoreError> {
        self.conversations
            .read()
            .map_err(|e| StoreError::ReadFailed {
                reason: e.to_string(),
            })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, ConversationMap>, StoreError> {
        self.conversations
            .write()
            .map_err(|e| StoreError::WriteFailed {
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl HistoryStore for InMemoryConversationStore {
    async fn history(&self, chat_id: ChatId) -> Result<Vec<Turn>, Report<StoreError>> {
        let conversations = self.read()?;
        Ok(conversations
            .get(&chat_id)
            .map(Conversation::history)
            .unwrap_or_default())
    }

    async fn append_turn(
        &self,
        chat_id: ChatId,
        turn: Turn,
    ) -> Result<Vec<Turn>, Report<StoreError>> {
        let mut conversations = self.write()?;
        let conversation = conversations.entry(chat_id).or_default();
        conversation.push_turn(turn, self.max_turns);
        debug!(%chat_id, turns = conversation.turn_count(), "appended turn");
        Ok(conversation.history())
    }

    async fn clear_history(&self, chat_id: ChatId) -> Result<Vec<Turn>, Report<StoreError>> {
        let mut conversations = self.write()?;
        let cleared = conversations
            .get_mut(&chat_id)
            .map(Conversation::take_history)
            .unwrap_or_default();
        debug!(%chat_id, cleared = cleared.len(), "cleared history");
        Ok(cleared)
    }
}

#[async_trait]
impl ContextPolicy for InMemoryConversationStore {
    async fn context_depth(&self, chat_id: ChatId) -> Result<u32, Report<StoreError>> {
        let conversations = self.read()?;
        Ok(conversations
            .get(&chat_id)
            .map(|c| c.context_depth)
            .unwrap_or_default())
    }

    async fn set_context_depth(
        &self,
        chat_id: ChatId,
        depth: u32,
    ) -> Result<(), Report<StoreError>> {
        let mut conversations = self.write()?;
        conversations.entry(chat_id).or_default().context_depth = depth;
        debug!(%chat_id, depth, "set context depth");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;

    const CHAT: ChatId = ChatId::new(1001);
    const OTHER_CHAT: ChatId = ChatId::new(2002);

    #[tokio::test]
    async fn unseen_chat_has_defaults() {
        let store = InMemoryConversationStore::new();

        assert_eq!(store.context_depth(CHAT).await.unwrap(), 0);
        assert!(store.history(CHAT).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_returns_resulting_history() {
        let store = InMemoryConversationStore::new();

        store.append_turn(CHAT, Turn::new("q1", "a1")).await.unwrap();
        let history = store.append_turn(CHAT, Turn::new("q2", "a2")).await.unwrap();

        assert_eq!(history, vec![Turn::new("q1", "a1"), Turn::new("q2", "a2")]);
    }

    #[tokio::test]
    async fn append_past_bound_evicts_first_turn() {
        let store = InMemoryConversationStore::new();

        for i in 0..=CHAT_MAX_NUM {
            store
                .append_turn(CHAT, Turn::new(format!("q{i}"), format!("a{i}")))
                .await
                .unwrap();
        }

        let history = store.history(CHAT).await.unwrap();
        assert_eq!(history.len(), CHAT_MAX_NUM);
        assert!(!history.contains(&Turn::new("q0", "a0")));
        assert_eq!(history[0], Turn::new("q1", "a1"));
    }

    #[tokio::test]
    async fn custom_bound_is_respected() {
        let store = InMemoryConversationStore::with_max_turns(2);

        for i in 0..5 {
            store
                .append_turn(CHAT, Turn::new(format!("q{i}"), "a"))
                .await
                .unwrap();
        }

        let users: Vec<_> = store
            .history(CHAT)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.user)
            .collect();
        assert_eq!(users, vec!["q3", "q4"]);
    }

    #[tokio::test]
    async fn clear_returns_previous_history_and_empties() {
        let store = InMemoryConversationStore::new();
        store.append_turn(CHAT, Turn::new("q1", "a1")).await.unwrap();
        store.append_turn(CHAT, Turn::new("q2", "a2")).await.unwrap();

        let cleared = store.clear_history(CHAT).await.unwrap();

        assert_eq!(cleared, vec![Turn::new("q1", "a1"), Turn::new("q2", "a2")]);
        assert!(store.history(CHAT).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_keeps_context_depth() {
        let store = InMemoryConversationStore::new();
        store.set_context_depth(CHAT, 3).await.unwrap();
        store.append_turn(CHAT, Turn::new("q", "a")).await.unwrap();

        store.clear_history(CHAT).await.unwrap();

        assert_eq!(store.context_depth(CHAT).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn clear_on_unseen_chat_is_empty() {
        let store = InMemoryConversationStore::new();
        assert!(store.clear_history(CHAT).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn depth_is_per_chat() {
        let store = InMemoryConversationStore::new();

        store.set_context_depth(CHAT, 10).await.unwrap();

        assert_eq!(store.context_depth(CHAT).await.unwrap(), 10);
        assert_eq!(store.context_depth(OTHER_CHAT).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn context_slice_is_bounded_by_history() {
        let store = InMemoryConversationStore::new();
        store.append_turn(CHAT, Turn::new("q1", "a1")).await.unwrap();
        store.append_turn(CHAT, Turn::new("q2", "a2")).await.unwrap();

        let slice = store.context_slice(CHAT, 5).await.unwrap();

        assert_eq!(
            slice,
            vec![
                Message::user("q1"),
                Message::assistant("a1"),
                Message::user("q2"),
                Message::assistant("a2"),
            ]
        );
        assert!(store.context_slice(CHAT, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn chats_are_created_lazily() {
        let store = InMemoryConversationStore::new();
        assert_eq!(store.chat_count().unwrap(), 0);

        store.history(CHAT).await.unwrap();
        assert_eq!(store.chat_count().unwrap(), 0);

        store.set_context_depth(CHAT, 1).await.unwrap();
        assert_eq!(store.chat_count().unwrap(), 1);
    }
}
