//! Domain error types for server operations.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

/// Errors raised while building application state.
#[derive(Debug)]
pub enum StartupError {
    /// The shared HTTP client could not be built.
    HttpClient { details: String },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpClient { details } => {
                write!(f, "failed to build HTTP client: {details}")
            }
        }
    }
}

impl std::error::Error for StartupError {}

/// Errors from the webhook management routes.
#[derive(Debug)]
pub enum WebhookError {
    /// The request did not carry the shared webhook secret.
    Unauthorized,
    /// No public URL is configured and the request carried no `Host`.
    PublicUrlUnknown,
    /// Telegram refused or failed the `setWebhook` call.
    Registration { details: String },
}

impl fmt::Display for WebhookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "missing or wrong webhook secret"),
            Self::PublicUrlUnknown => write!(f, "public URL is not configured"),
            Self::Registration { details } => {
                write!(f, "webhook registration failed: {details}")
            }
        }
    }
}

impl std::error::Error for WebhookError {}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Unauthorized => (StatusCode::FORBIDDEN, "Unauthorized"),
            Self::PublicUrlUnknown => (
                StatusCode::BAD_REQUEST,
                "Cannot determine public URL; set PUBLIC_URL",
            ),
            Self::Registration { details } => {
                tracing::error!(error = %details, "webhook registration failed");
                (StatusCode::BAD_GATEWAY, "Webhook registration failed")
            }
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_error_maps_to_bad_gateway() {
        let response = WebhookError::Registration {
            details: "401 Unauthorized".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn unauthorized_is_forbidden() {
        let response = WebhookError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn missing_public_url_is_bad_request() {
        let response = WebhookError::PublicUrlUnknown.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
