//! Context policy: how many prior turns to replay per chat.

use crate::error::StoreError;
use async_trait::async_trait;
use rootcause::Report;
use voice_relay_core::ChatId;

/// Trait for per-chat context depth storage.
///
/// A depth larger than the chat's history is legal; consumers read at most
/// the turns that exist.
#[async_trait]
pub trait ContextPolicy: Send + Sync {
    /// Returns the configured depth, 0 when never set.
    async fn context_depth(&self, chat_id: ChatId) -> Result<u32, Report<StoreError>>;

    /// Overwrites the configured depth.
    async fn set_context_depth(
        &self,
        chat_id: ChatId,
        depth: u32,
    ) -> Result<(), Report<StoreError>>;
}
