//! OpenAI chat-completions backend.

use crate::backend::{LlmBackend, LlmMessage, LlmRequest, LlmResponse};
use crate::error::LlmError;
use async_trait::async_trait;
use rootcause::Report;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, instrument, warn};

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_system_prompt() -> String {
    "The following is a conversation with an AI assistant. \
     The AI assistant response with Japanese."
        .to_string()
}

/// Configuration for [`OpenAiBackend`].
#[derive(Clone, Deserialize)]
pub struct OpenAiConfig {
    /// Bearer key sent with every request.
    pub api_key: String,
    /// API root, without the trailing `/chat/completions`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Sent as the first message of every request.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl OpenAiConfig {
    /// Creates a config with default endpoint, model and system prompt.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            model: default_model(),
            system_prompt: default_system_prompt(),
        }
    }

    /// Overrides the API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"[redacted]")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("system_prompt", &self.system_prompt)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<LlmMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// [`LlmBackend`] backed by the OpenAI chat-completions API.
///
/// The configured system prompt is applied to every request that does not
/// carry its own. A JSON body without a usable first choice yields a
/// response with no content rather than an error.
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiBackend {
    /// Creates a backend sharing the given HTTP client.
    #[must_use]
    pub fn new(client: reqwest::Client, config: OpenAiConfig) -> Self {
        Self { client, config }
    }

    fn build_request<'a>(&'a self, request: &LlmRequest) -> ChatCompletionRequest<'a> {
        let messages = if request.system.is_some() {
            request.messages()
        } else {
            request
                .clone()
                .with_system(self.config.system_prompt.clone())
                .messages()
        };
        ChatCompletionRequest {
            model: &self.config.model,
            messages,
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    #[instrument(skip(self, request), fields(model = %self.config.model, context = request.context.len()))]
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, Report<LlmError>> {
        if self.config.api_key.trim().is_empty() {
            return Err(LlmError::InvalidConfig {
                reason: "missing OpenAI API key".to_string(),
            }
            .into());
        }

        let body = self.build_request(request);
        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed {
                reason: e.to_string(),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| LlmError::RequestFailed {
            reason: e.to_string(),
        })?;

        let parsed: ChatCompletionResponse =
            serde_json::from_str(&text).map_err(|e| LlmError::ResponseParseFailed {
                reason: e.to_string(),
            })?;

        let content = parsed
            .choices
            .and_then(|choices| choices.into_iter().next())
            .and_then(|choice| choice.message)
            .and_then(|message| message.content);

        if content.is_none() {
            warn!(status = status.as_u16(), "completion returned no choices");
        } else {
            debug!(status = status.as_u16(), "completion succeeded");
        }

        Ok(LlmResponse { content })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(server: &MockServer) -> OpenAiBackend {
        let config = OpenAiConfig::new("sk-test").with_base_url(server.uri());
        OpenAiBackend::new(reqwest::Client::new(), config)
    }

    #[test]
    fn config_defaults() {
        let config: OpenAiConfig = serde_json::from_value(json!({ "api_key": "k" })).unwrap();
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert!(config.system_prompt.contains("Japanese"));
    }

    #[test]
    fn debug_redacts_key() {
        let rendered = format!("{:?}", OpenAiConfig::new("sk-secret"));
        assert!(!rendered.contains("sk-secret"));
    }

    #[test]
    fn completions_url_tolerates_trailing_slash() {
        let config = OpenAiConfig::new("k").with_base_url("http://localhost:9/v1/");
        assert_eq!(config.completions_url(), "http://localhost:9/v1/chat/completions");
    }

    #[tokio::test]
    async fn generate_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "gpt-3.5-turbo-0613",
                "choices": [{ "message": { "role": "assistant", "content": "こんにちは" } }],
                "usage": { "prompt_tokens": 12, "completion_tokens": 3 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = backend(&server)
            .generate(&LlmRequest::new("hello"))
            .await
            .unwrap();

        assert_eq!(response.content.as_deref(), Some("こんにちは"));
    }

    #[tokio::test]
    async fn generate_sends_system_context_then_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "model": "gpt-3.5-turbo",
                "messages": [
                    { "role": "system", "content": default_system_prompt() },
                    { "role": "user", "content": "q1" },
                    { "role": "assistant", "content": "a1" },
                    { "role": "user", "content": "q2" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "a2" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = LlmRequest::new("q2").with_context(vec![
            LlmMessage::user("q1"),
            LlmMessage::assistant("a1"),
        ]);
        let response = backend(&server).generate(&request).await.unwrap();

        assert_eq!(response.content.as_deref(), Some("a2"));
    }

    #[tokio::test]
    async fn missing_choices_yields_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": { "message": "rate limited" }
            })))
            .mount(&server)
            .await;

        let response = backend(&server)
            .generate(&LlmRequest::new("hello"))
            .await
            .unwrap();

        assert!(response.content.is_none());
        assert_eq!(response.text_or("sorry"), "sorry");
    }

    #[tokio::test]
    async fn non_json_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&server)
            .await;

        let result = backend(&server).generate(&LlmRequest::new("hello")).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn empty_key_is_rejected_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let config = OpenAiConfig::new(" ").with_base_url(server.uri());
        let result = OpenAiBackend::new(reqwest::Client::new(), config)
            .generate(&LlmRequest::new("hello"))
            .await;

        assert!(result.is_err());
    }
}
