//! HTTP client for the Telegram Bot API.

use crate::connector::{ChatSender, FileSource};
use crate::error::TelegramError;
use crate::keyboard::InlineKeyboard;
use async_trait::async_trait;
use constant_time_eq::constant_time_eq;
use reqwest::multipart::{Form, Part};
use rootcause::Report;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};
use std::fmt;
use tracing::{debug, instrument, warn};
use voice_relay_core::{CallbackId, ChatId, FileId};

fn default_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}

/// Configuration for [`TelegramClient`].
#[derive(Clone, Deserialize)]
pub struct TelegramConfig {
    /// Token issued by BotFather.
    pub bot_token: String,
    /// Shared secret Telegram echoes in `X-Telegram-Bot-Api-Secret-Token`.
    pub secret_token: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl TelegramConfig {
    #[must_use]
    pub fn new(bot_token: impl Into<String>, secret_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            secret_token: secret_token.into(),
            api_base_url: default_api_base_url(),
        }
    }

    /// Overrides the Bot API root.
    #[must_use]
    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into();
        self
    }

    fn base(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.base(), self.bot_token)
    }

    fn file_url(&self, file_path: &str) -> String {
        format!("{}/file/bot{}/{file_path}", self.base(), self.bot_token)
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"[redacted]")
            .field("secret_token", &"[redacted]")
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

/// Bot API response envelope.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct FileInfo {
    #[serde(default)]
    file_path: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: ChatId,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a InlineKeyboard>,
}

// Bot URLs embed the token, so it must not reach error messages or logs.
/// Longest text Telegram accepts in one `sendMessage`.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Splits `text` into parts of at most `limit` characters, breaking at the
/// last newline inside each window when there is one.
fn split_message(text: &str, limit: usize) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = text;
    while rest.chars().count() > limit {
        let window_end = rest
            .char_indices()
            .nth(limit)
            .map_or(rest.len(), |(i, _)| i);
        let cut = match rest[..window_end].rfind('\n') {
            Some(i) if i > 0 => i,
            _ => window_end,
        };
        parts.push(&rest[..cut]);
        rest = rest[cut..].strip_prefix('\n').unwrap_or(&rest[cut..]);
    }
    if !rest.is_empty() || parts.is_empty() {
        parts.push(rest);
    }
    parts
}

fn request_failed(method: &str, e: reqwest::Error) -> TelegramError {
    TelegramError::RequestFailed {
        method: method.to_string(),
        reason: e.without_url().to_string(),
    }
}

/// Telegram Bot API client implementing [`ChatSender`] and [`FileSource`].
#[derive(Debug, Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    config: TelegramConfig,
}

impl TelegramClient {
    /// Creates a client sharing the given HTTP client.
    #[must_use]
    pub fn new(http: reqwest::Client, config: TelegramConfig) -> Self {
        Self { http, config }
    }

    /// Returns true when `candidate` matches the configured webhook secret.
    #[must_use]
    pub fn verify_secret(&self, candidate: Option<&str>) -> bool {
        candidate.is_some_and(|c| {
            !c.is_empty() && constant_time_eq(c.as_bytes(), self.config.secret_token.as_bytes())
        })
    }

    /// Points the bot's webhook at `url`, registering the shared secret.
    ///
    /// Returns the Bot API response body.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or Telegram rejects it.
    #[instrument(skip(self))]
    pub async fn set_webhook(&self, url: &str) -> Result<JsonValue, Report<TelegramError>> {
        self.call(
            "setWebhook",
            &json!({ "url": url, "secret_token": self.config.secret_token }),
        )
        .await
    }

    /// Removes the bot's webhook by registering an empty url.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or Telegram rejects it.
    #[instrument(skip(self))]
    pub async fn delete_webhook(&self) -> Result<JsonValue, Report<TelegramError>> {
        self.call("setWebhook", &json!({ "url": "" })).await
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Report<TelegramError>> {
        let response = self
            .http
            .post(self.config.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| request_failed(method, e))?;
        Self::read_result(method, response).await
    }

    async fn read_result<T: DeserializeOwned>(
        method: &str,
        response: reqwest::Response,
    ) -> Result<T, Report<TelegramError>> {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| request_failed(method, e))?;

        let envelope: ApiResponse<T> =
            serde_json::from_str(&text).map_err(|e| TelegramError::ResponseParseFailed {
                method: method.to_string(),
                reason: e.to_string(),
            })?;

        if !envelope.ok {
            let description = envelope.description.unwrap_or_default();
            warn!(method, status, %description, "bot api rejected call");
            return Err(TelegramError::ApiRejected {
                method: method.to_string(),
                status,
                description,
            }
            .into());
        }

        envelope.result.ok_or_else(|| {
            TelegramError::ResponseParseFailed {
                method: method.to_string(),
                reason: "missing result".to_string(),
            }
            .into()
        })
    }

    async fn resolve_file_path(&self, file_id: &FileId) -> Result<String, Report<TelegramError>> {
        let info: FileInfo = self
            .call("getFile", &json!({ "file_id": file_id }))
            .await?;
        info.file_path.ok_or_else(|| {
            TelegramError::FileUnavailable {
                file_id: file_id.to_string(),
            }
            .into()
        })
    }
}

#[async_trait]
impl ChatSender for TelegramClient {
    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), Report<TelegramError>> {
        let chunks = split_message(text, MAX_MESSAGE_CHARS);
        for chunk in &chunks {
            let _: JsonValue = self
                .call(
                    "sendMessage",
                    &SendMessage {
                        chat_id,
                        text: chunk,
                        reply_markup: None,
                    },
                )
                .await?;
        }
        debug!(parts = chunks.len(), "sent text");
        Ok(())
    }

    #[instrument(skip(self, audio), fields(bytes = audio.len()))]
    async fn send_voice(
        &self,
        chat_id: ChatId,
        audio: Vec<u8>,
    ) -> Result<(), Report<TelegramError>> {
        let voice = Part::bytes(audio)
            .file_name("voice.ogg")
            .mime_str("audio/ogg")
            .map_err(|e| TelegramError::InvalidRequest {
                method: "sendVoice".to_string(),
                reason: e.to_string(),
            })?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("voice", voice);

        let response = self
            .http
            .post(self.config.method_url("sendVoice"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| request_failed("sendVoice", e))?;
        let _: JsonValue = Self::read_result("sendVoice", response).await?;
        debug!("sent voice");
        Ok(())
    }

    #[instrument(skip(self, prompt, keyboard))]
    async fn send_menu(
        &self,
        chat_id: ChatId,
        prompt: &str,
        keyboard: &InlineKeyboard,
    ) -> Result<(), Report<TelegramError>> {
        let _: JsonValue = self
            .call(
                "sendMessage",
                &SendMessage {
                    chat_id,
                    text: prompt,
                    reply_markup: Some(keyboard),
                },
            )
            .await?;
        debug!("sent menu");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn answer_callback(
        &self,
        callback_id: &CallbackId,
    ) -> Result<(), Report<TelegramError>> {
        let _: JsonValue = self
            .call(
                "answerCallbackQuery",
                &json!({ "callback_query_id": callback_id }),
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl FileSource for TelegramClient {
    #[instrument(skip(self))]
    async fn download(&self, file_id: &FileId) -> Result<Vec<u8>, Report<TelegramError>> {
        let file_path = self.resolve_file_path(file_id).await?;

        let response = self
            .http
            .get(self.config.file_url(&file_path))
            .send()
            .await
            .map_err(|e| request_failed("download", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TelegramError::ApiRejected {
                method: "download".to_string(),
                status: status.as_u16(),
                description: status.canonical_reason().unwrap_or_default().to_string(),
            }
            .into());
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| request_failed("download", e))?;
        debug!(bytes = bytes.len(), "downloaded file");
        Ok(bytes.to_vec())
    }
}
