//! LLM backend abstraction.
//!
//! Provides a unified interface for chat-completion providers.

use crate::error::LlmError;
use async_trait::async_trait;
use rootcause::Report;
use serde::{Deserialize, Serialize};

/// A request to an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    /// The new user input.
    pub prompt: String,
    /// System prompt, if any.
    pub system: Option<String>,
    /// Context from previous turns, oldest first.
    pub context: Vec<LlmMessage>,
}

impl LlmRequest {
    /// Creates a new simple request with just a prompt.
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            context: Vec::new(),
        }
    }

    /// Adds a system prompt.
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Adds context messages.
    #[must_use]
    pub fn with_context(mut self, context: Vec<LlmMessage>) -> Self {
        self.context = context;
        self
    }

    /// Flattens the request into the ordered message list sent to the model:
    /// system prompt, prior context, then the new user input.
    #[must_use]
    pub fn messages(&self) -> Vec<LlmMessage> {
        let mut messages = Vec::with_capacity(self.context.len() + 2);
        if let Some(system) = &self.system {
            messages.push(LlmMessage::system(system.clone()));
        }
        messages.extend(self.context.iter().cloned());
        messages.push(LlmMessage::user(self.prompt.clone()));
        messages
    }
}

/// A message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmMessage {
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub content: String,
}

impl LlmMessage {
    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    /// Creates a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }
}

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User/human message.
    User,
    /// Assistant/AI message.
    Assistant,
    /// System message.
    System,
}

/// A response from an LLM.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmResponse {
    /// The generated content, `None` when the provider answered without a
    /// usable choice.
    pub content: Option<String>,
}

impl LlmResponse {
    /// Returns the generated content, or `fallback` when there is none.
    #[must_use]
    pub fn text_or(self, fallback: &str) -> String {
        self.content.unwrap_or_else(|| fallback.to_string())
    }
}

/// Trait for LLM backends.
///
/// This trait defines the interface that all completion providers must
/// implement. A response without content is not an error; callers decide
/// how to degrade.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generates a response for the given request.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider could not be reached or answered
    /// with something other than JSON.
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, Report<LlmError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn llm_request_builder() {
        let request = LlmRequest::new("Hello, world!")
            .with_system("You are a helpful assistant.");

        assert_eq!(request.prompt, "Hello, world!");
        assert_eq!(
            request.system,
            Some("You are a helpful assistant.".to_string())
        );
        assert!(request.context.is_empty());
    }

    #[test]
    fn messages_order_system_context_prompt() {
        let request = LlmRequest::new("third")
            .with_system("sys")
            .with_context(vec![LlmMessage::user("first"), LlmMessage::assistant("second")]);

        let messages = request.messages();

        assert_eq!(
            messages,
            vec![
                LlmMessage::system("sys"),
                LlmMessage::user("first"),
                LlmMessage::assistant("second"),
                LlmMessage::user("third"),
            ]
        );
    }

    #[test]
    fn messages_without_system_prompt() {
        let messages = LlmRequest::new("hi").messages();
        assert_eq!(messages, vec![LlmMessage::user("hi")]);
    }

    #[test]
    fn text_or_substitutes_fallback() {
        assert_eq!(LlmResponse::default().text_or("sorry"), "sorry");

        let response = LlmResponse {
            content: Some("hello".to_string()),
        };
        assert_eq!(response.text_or("sorry"), "hello");
    }
}
