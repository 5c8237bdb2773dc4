//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables. Nested keys
//! use a double underscore, e.g. `TELEGRAM__BOT_TOKEN`.

use serde::Deserialize;
use voice_relay_ai::{AzureSpeechConfig, OpenAiConfig};
use voice_relay_dispatch::Replies;
use voice_relay_telegram::TelegramConfig;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Externally reachable base URL used when registering the webhook.
    /// Falls back to `https://<Host header>` when unset.
    #[serde(default)]
    pub public_url: Option<String>,

    /// Timeout applied to every outbound HTTP call, in seconds.
    #[serde(default = "default_http_timeout_seconds")]
    pub http_timeout_seconds: u64,

    /// Number of recent update ids remembered to drop redeliveries.
    #[serde(default = "default_dedup_capacity")]
    pub dedup_capacity: usize,

    pub telegram: TelegramConfig,

    pub openai: OpenAiConfig,

    pub speech: AzureSpeechConfig,

    #[serde(default)]
    pub replies: Replies,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_http_timeout_seconds() -> u64 {
    60
}

fn default_dedup_capacity() -> usize {
    1024
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_environment(config::Environment::default())
    }

    fn from_environment(environment: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(environment.separator("__").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
