//! Error types for the Telegram crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `TelegramError`: Errors from Bot API calls and file downloads

use std::fmt;

/// Errors from Bot API operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelegramError {
    /// The request could not be sent or the response body not read.
    RequestFailed { method: String, reason: String },
    /// The Bot API answered `ok: false` or a non-success status.
    ApiRejected {
        method: String,
        status: u16,
        description: String,
    },
    /// The response body did not match the expected shape.
    ResponseParseFailed { method: String, reason: String },
    /// `getFile` succeeded but returned no downloadable path.
    FileUnavailable { file_id: String },
    /// A request payload could not be built.
    InvalidRequest { method: String, reason: String },
}

impl fmt::Display for TelegramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestFailed { method, reason } => {
                write!(f, "telegram '{method}' request failed: {reason}")
            }
            Self::ApiRejected {
                method,
                status,
                description,
            } => {
                write!(
                    f,
                    "telegram '{method}' rejected (status {status}): {description}"
                )
            }
            Self::ResponseParseFailed { method, reason } => {
                write!(f, "failed to parse telegram '{method}' response: {reason}")
            }
            Self::FileUnavailable { file_id } => {
                write!(f, "file '{file_id}' has no download path")
            }
            Self::InvalidRequest { method, reason } => {
                write!(f, "invalid telegram '{method}' request: {reason}")
            }
        }
    }
}

impl std::error::Error for TelegramError {}
