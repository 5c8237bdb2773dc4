//! HTTP handlers for the webhook and its registration.

use crate::AppState;
use crate::error::WebhookError;
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header::HOST},
    response::{IntoResponse, Response},
};
use serde_json::{Value as JsonValue, json};
use std::sync::Arc;
use tracing::{info, warn};

/// Header Telegram uses to echo the webhook secret.
pub const SECRET_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

/// Path the webhook is registered under.
pub const WEBHOOK_PATH: &str = "/bot";

/// Receives one Telegram update.
///
/// Authenticated deliveries are always acknowledged with 200 so Telegram
/// does not retry; failures are logged by the relay.
pub async fn webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(e) = authorize(&state, &headers) {
        return e.into_response();
    }

    let outcome = state.relay.handle_inbound_update(&body).await;
    info!(?outcome, "webhook handled");
    StatusCode::OK.into_response()
}

/// Registers `<public url>/bot` as the bot's webhook.
///
/// Requires the shared secret in the same header Telegram uses.
pub async fn register_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<JsonValue>, WebhookError> {
    authorize(&state, &headers)?;
    let base = public_base(state.public_url.as_deref(), &headers)?;
    let url = format!("{base}{WEBHOOK_PATH}");

    let result = state
        .telegram
        .set_webhook(&url)
        .await
        .map_err(|e| WebhookError::Registration {
            details: e.to_string(),
        })?;

    info!(%url, "webhook registered");
    Ok(Json(json!({ "ok": true, "result": result, "url": url })))
}

/// Removes the bot's webhook. Requires the shared secret.
pub async fn unregister_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<JsonValue>, WebhookError> {
    authorize(&state, &headers)?;
    let result = state
        .telegram
        .delete_webhook()
        .await
        .map_err(|e| WebhookError::Registration {
            details: e.to_string(),
        })?;

    info!("webhook removed");
    Ok(Json(json!({ "ok": true, "result": result })))
}

/// Liveness probe.
pub async fn health() -> &'static str {
    "ok"
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), WebhookError> {
    let secret = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
    if state.telegram.verify_secret(secret) {
        Ok(())
    } else {
        warn!("rejecting call with bad secret");
        Err(WebhookError::Unauthorized)
    }
}

fn public_base(configured: Option<&str>, headers: &HeaderMap) -> Result<String, WebhookError> {
    if let Some(url) = configured.filter(|u| !u.is_empty()) {
        return Ok(url.trim_end_matches('/').to_string());
    }
    headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty())
        .map(|host| format!("https://{host}"))
        .ok_or(WebhookError::PublicUrlUnknown)
}
