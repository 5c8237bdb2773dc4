//! Update classification.
//!
//! Turns the shape of a webhook [`Update`] into one explicit [`Intent`].
//! Checks run in a fixed order: command entities win over plain text, since
//! a command message carries text too.

use std::fmt;
use voice_relay_core::{CallbackId, ChatId, FileId};
use voice_relay_telegram::Update;

/// What an inbound update asks the relay to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// A slash command.
    Command { chat_id: ChatId, text: String },
    /// Plain text for the model.
    TextMessage { chat_id: ChatId, text: String },
    /// A voice note for the model.
    VoiceMessage { chat_id: ChatId, file_id: FileId },
    /// An inline-button press.
    CallbackReplay {
        chat_id: ChatId,
        callback_id: CallbackId,
        data: String,
    },
    /// Nothing the relay understands. `chat_id` is set when a reply is
    /// still possible.
    Unknown { chat_id: Option<ChatId> },
}

impl Intent {
    /// Returns the chat a reply should go to.
    #[must_use]
    pub fn chat_id(&self) -> Option<ChatId> {
        match self {
            Self::Command { chat_id, .. }
            | Self::TextMessage { chat_id, .. }
            | Self::VoiceMessage { chat_id, .. }
            | Self::CallbackReplay { chat_id, .. } => Some(*chat_id),
            Self::Unknown { chat_id } => *chat_id,
        }
    }

    /// Returns a short label for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Command { .. } => "command",
            Self::TextMessage { .. } => "text",
            Self::VoiceMessage { .. } => "voice",
            Self::CallbackReplay { .. } => "callback",
            Self::Unknown { .. } => "unknown",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

/// Classifies an update. Pure; never fails.
#[must_use]
pub fn classify(update: &Update) -> Intent {
    if let Some(message) = &update.message {
        let chat_id = message.chat.id;
        if message.has_command() {
            return Intent::Command {
                chat_id,
                text: message.text.clone().unwrap_or_default(),
            };
        }
        if let Some(text) = &message.text {
            return Intent::TextMessage {
                chat_id,
                text: text.clone(),
            };
        }
        if let Some(voice) = &message.voice {
            return Intent::VoiceMessage {
                chat_id,
                file_id: voice.file_id.clone(),
            };
        }
        return Intent::Unknown {
            chat_id: Some(chat_id),
        };
    }

    if let Some(query) = &update.callback_query
        && let Some(origin) = &query.message
    {
        return Intent::CallbackReplay {
            chat_id: origin.chat.id,
            callback_id: query.id.clone(),
            data: query.data.clone().unwrap_or_default(),
        };
    }

    Intent::Unknown {
        chat_id: update.chat_id(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn update(value: Value) -> Update {
        serde_json::from_value(value).unwrap()
    }

    fn message(extra: Value) -> Update {
        let mut message = json!({ "message_id": 1, "chat": { "id": 42 } });
        if let (Some(m), Some(extra)) = (message.as_object_mut(), extra.as_object()) {
            m.extend(extra.clone());
        }
        update(json!({ "update_id": 1, "message": message }))
    }

    #[test]
    fn command_entities_win_over_text() {
        let intent = classify(&message(json!({
            "text": "/menu please",
            "entities": [{ "type": "bot_command", "offset": 0, "length": 5 }]
        })));

        assert_eq!(
            intent,
            Intent::Command {
                chat_id: ChatId::new(42),
                text: "/menu please".to_string(),
            }
        );
    }

    #[test]
    fn command_entity_anywhere_is_a_command() {
        let intent = classify(&message(json!({
            "text": "hello /start",
            "entities": [{ "type": "bot_command", "offset": 6, "length": 6 }]
        })));

        assert_eq!(intent.kind(), "command");
    }

    #[test]
    fn plain_text_is_text_message() {
        let intent = classify(&message(json!({ "text": "hello" })));

        assert_eq!(
            intent,
            Intent::TextMessage {
                chat_id: ChatId::new(42),
                text: "hello".to_string(),
            }
        );
    }

    #[test]
    fn text_with_non_command_entities_is_text() {
        let intent = classify(&message(json!({
            "text": "*hi*",
            "entities": [{ "type": "bold", "offset": 0, "length": 4 }]
        })));

        assert_eq!(intent.kind(), "text");
    }

    #[test]
    fn voice_note_is_voice_message() {
        let intent = classify(&message(json!({ "voice": { "file_id": "AwAC", "duration": 2 } })));

        assert_eq!(
            intent,
            Intent::VoiceMessage {
                chat_id: ChatId::new(42),
                file_id: FileId::new("AwAC"),
            }
        );
    }

    #[test]
    fn callback_takes_chat_from_attached_message() {
        let intent = classify(&update(json!({
            "update_id": 2,
            "callback_query": {
                "id": "cb",
                "data": "ct_10",
                "message": { "message_id": 9, "chat": { "id": 77 } }
            }
        })));

        assert_eq!(
            intent,
            Intent::CallbackReplay {
                chat_id: ChatId::new(77),
                callback_id: CallbackId::new("cb"),
                data: "ct_10".to_string(),
            }
        );
    }

    #[test]
    fn sticker_message_is_unknown_with_chat() {
        let intent = classify(&message(json!({ "sticker": { "file_id": "s" } })));

        assert_eq!(
            intent,
            Intent::Unknown {
                chat_id: Some(ChatId::new(42)),
            }
        );
    }

    #[test]
    fn empty_update_is_unknown_without_chat() {
        let intent = classify(&update(json!({ "update_id": 3 })));

        assert_eq!(intent, Intent::Unknown { chat_id: None });
    }

    #[test]
    fn callback_without_origin_is_unknown() {
        let intent = classify(&update(json!({
            "update_id": 4,
            "callback_query": { "id": "cb", "data": "context" }
        })));

        assert_eq!(intent, Intent::Unknown { chat_id: None });
    }
}
