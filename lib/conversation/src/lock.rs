//! Per-chat serialization.
//!
//! Handling a message reads history, awaits several remote calls, then
//! writes history back. Two deliveries for the same chat running that
//! pipeline concurrently would lose a turn, so the dispatcher holds the
//! chat's guard for the whole pipeline. Different chats never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use voice_relay_core::ChatId;

/// Idle entries are swept once the table grows past this many chats.
const SWEEP_THRESHOLD: usize = 1024;

/// Hands out one async mutex per chat.
#[derive(Debug, Default)]
pub struct ChatLocks {
    locks: Mutex<HashMap<ChatId, Arc<AsyncMutex<()>>>>,
}

impl ChatLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `chat_id`.
    ///
    /// The returned guard releases the chat when dropped.
    pub async fn acquire(&self, chat_id: ChatId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            if locks.len() >= SWEEP_THRESHOLD {
                locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            Arc::clone(locks.entry(chat_id).or_default())
        };
        lock.lock_owned().await
    }

    /// Returns the number of chats currently tracked.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
