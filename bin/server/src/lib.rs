//! voice-relay webhook server.
//!
//! This crate hosts the Telegram webhook, wires the conversation pipeline
//! to its real collaborators, and exposes webhook registration routes.

pub mod config;
pub mod error;
pub mod routes;

use crate::config::ServerConfig;
use crate::error::StartupError;
use axum::{
    Router,
    routing::{get, post},
};
use rootcause::Report;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use voice_relay_ai::{AzureSpeechClient, OpenAiBackend};
use voice_relay_conversation::InMemoryConversationStore;
use voice_relay_dispatch::{Collaborators, Relay};
use voice_relay_telegram::TelegramClient;

/// Shared application state.
pub struct AppState {
    /// Conversation pipeline.
    pub relay: Relay,
    /// Bot API client, used directly for webhook management.
    pub telegram: TelegramClient,
    /// Configured public base URL, if any.
    pub public_url: Option<String>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(relay: Relay, telegram: TelegramClient, public_url: Option<String>) -> Self {
        Self {
            relay,
            telegram,
            public_url,
        }
    }

    /// Builds the production collaborators from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the outbound HTTP client cannot be built.
    pub fn from_config(config: &ServerConfig) -> Result<Self, Report<StartupError>> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_seconds))
            .build()
            .map_err(|e| StartupError::HttpClient {
                details: e.to_string(),
            })?;

        let store = Arc::new(InMemoryConversationStore::new());
        let telegram = TelegramClient::new(http.clone(), config.telegram.clone());
        let speech = Arc::new(AzureSpeechClient::new(http.clone(), config.speech.clone()));

        let collaborators = Collaborators {
            history: store.clone(),
            context: store,
            completion: Arc::new(OpenAiBackend::new(http, config.openai.clone())),
            transcriber: speech.clone(),
            synthesizer: speech,
            files: Arc::new(telegram.clone()),
            sender: Arc::new(telegram.clone()),
        };
        let relay = Relay::new(collaborators, config.replies.clone())
            .with_ledger_capacity(config.dedup_capacity);

        Ok(Self::new(relay, telegram, config.public_url.clone()))
    }
}

/// Builds the HTTP router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/bot", post(routes::webhook))
        .route("/registerWebhook", get(routes::register_webhook))
        .route("/unRegisterWebhook", get(routes::unregister_webhook))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
