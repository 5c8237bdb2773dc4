//! Inbound webhook payloads.
//!
//! Only the fields the relay consumes are modeled; everything else in the
//! Bot API `Update` object is ignored during deserialization.

use serde::{Deserialize, Serialize};
use voice_relay_core::{CallbackId, ChatId, FileId, UpdateId};

/// One webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    pub update_id: UpdateId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_query: Option<CallbackQuery>,
}

impl Update {
    /// Returns the chat this update belongs to, if it can be determined.
    ///
    /// Callback queries carry no chat of their own; the chat comes from the
    /// message the button was attached to.
    #[must_use]
    pub fn chat_id(&self) -> Option<ChatId> {
        self.message
            .as_ref()
            .map(|m| m.chat.id)
            .or_else(|| {
                self.callback_query
                    .as_ref()
                    .and_then(|q| q.message.as_ref())
                    .map(|m| m.chat.id)
            })
    }
}

/// A conversational message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<MessageEntity>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<Voice>,
}

impl Message {
    /// Returns true when the message carries a `bot_command` entity.
    #[must_use]
    pub fn has_command(&self) -> bool {
        self.entities
            .as_deref()
            .is_some_and(|entities| entities.iter().any(MessageEntity::is_command))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: ChatId,
}

/// A formatting or semantic span inside message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntity {
    #[serde(rename = "type")]
    pub kind: String,
    pub offset: usize,
    pub length: usize,
}

impl MessageEntity {
    /// Returns true for `bot_command` entities.
    #[must_use]
    pub fn is_command(&self) -> bool {
        self.kind == "bot_command"
    }
}

/// A recorded voice note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub file_id: FileId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// An inline-keyboard button press.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackQuery {
    pub id: CallbackId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// The message the pressed keyboard was attached to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}
