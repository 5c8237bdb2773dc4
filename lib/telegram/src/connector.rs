//! Outbound connector traits.
//!
//! The dispatcher reaches the chat platform only through these traits, so
//! the whole conversation pipeline can run against in-memory fakes.

use crate::error::TelegramError;
use crate::keyboard::InlineKeyboard;
use async_trait::async_trait;
use rootcause::Report;
use voice_relay_core::{CallbackId, ChatId, FileId};

/// Sends replies into a chat.
#[async_trait]
pub trait ChatSender: Send + Sync {
    /// Sends a plain text message.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform could not be reached or rejected
    /// the message.
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), Report<TelegramError>>;

    /// Sends an audio clip as a voice message.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload fails.
    async fn send_voice(
        &self,
        chat_id: ChatId,
        audio: Vec<u8>,
    ) -> Result<(), Report<TelegramError>>;

    /// Sends `prompt` with an inline keyboard of choices.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform could not be reached or rejected
    /// the message.
    async fn send_menu(
        &self,
        chat_id: ChatId,
        prompt: &str,
        keyboard: &InlineKeyboard,
    ) -> Result<(), Report<TelegramError>>;

    /// Acknowledges a button press so the client stops waiting on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform could not be reached.
    async fn answer_callback(&self, callback_id: &CallbackId)
    -> Result<(), Report<TelegramError>>;
}

/// Resolves platform file references to their contents.
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Resolves `file_id` and downloads the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be resolved or downloaded.
    async fn download(&self, file_id: &FileId) -> Result<Vec<u8>, Report<TelegramError>>;
}
