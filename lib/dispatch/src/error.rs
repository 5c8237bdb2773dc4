//! Error types for the dispatch crate.
//!
//! Each variant names the pipeline step that failed and is attached as
//! context over the collaborator's own error.

use std::fmt;
use voice_relay_core::ChatId;

/// Errors that abort handling of one update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Reading or writing the chat's history failed.
    History { chat_id: ChatId },
    /// Reading or writing the chat's context depth failed.
    ContextDepth { chat_id: ChatId },
    /// The voice clip could not be fetched.
    Download { chat_id: ChatId },
    /// The voice clip could not be transcribed.
    Transcription { chat_id: ChatId },
    /// The completion backend failed outright.
    Completion { chat_id: ChatId },
    /// The reply could not be synthesized.
    Synthesis { chat_id: ChatId },
    /// A reply could not be delivered.
    Delivery { chat_id: ChatId, what: &'static str },
}

impl DispatchError {
    /// Returns the chat the failed update belonged to.
    #[must_use]
    pub fn chat_id(&self) -> ChatId {
        match self {
            Self::History { chat_id }
            | Self::ContextDepth { chat_id }
            | Self::Download { chat_id }
            | Self::Transcription { chat_id }
            | Self::Completion { chat_id }
            | Self::Synthesis { chat_id }
            | Self::Delivery { chat_id, .. } => *chat_id,
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::History { chat_id } => write!(f, "history operation failed for chat {chat_id}"),
            Self::ContextDepth { chat_id } => {
                write!(f, "context depth operation failed for chat {chat_id}")
            }
            Self::Download { chat_id } => {
                write!(f, "failed to download voice clip for chat {chat_id}")
            }
            Self::Transcription { chat_id } => {
                write!(f, "failed to transcribe voice clip for chat {chat_id}")
            }
            Self::Completion { chat_id } => write!(f, "completion failed for chat {chat_id}"),
            Self::Synthesis { chat_id } => {
                write!(f, "speech synthesis failed for chat {chat_id}")
            }
            Self::Delivery { chat_id, what } => {
                write!(f, "failed to deliver {what} to chat {chat_id}")
            }
        }
    }
}

impl std::error::Error for DispatchError {}
