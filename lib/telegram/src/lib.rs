//! Telegram Bot API surface for the voice-relay service.
//!
//! This crate provides:
//!
//! - **Update types**: The subset of inbound webhook payloads the relay reads
//! - **Connector traits**: [`ChatSender`] and [`FileSource`], the outbound
//!   seams the dispatcher talks through
//! - **Client**: [`TelegramClient`], the HTTP implementation of both traits
//!   plus webhook registration

pub mod client;
pub mod connector;
pub mod error;
pub mod keyboard;
pub mod update;

pub use client::{TelegramClient, TelegramConfig};
pub use connector::{ChatSender, FileSource};
pub use error::TelegramError;
pub use keyboard::{InlineButton, InlineKeyboard};
pub use update::{CallbackQuery, Chat, Message, MessageEntity, Update, Voice};
