//! Error types for the AI crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `LlmError`: Completion backend operations
//! - `SpeechError`: Transcription and synthesis operations

use std::fmt;

/// Errors from LLM backend operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// The request could not be sent or the response body not read.
    RequestFailed { reason: String },
    /// The response body was not valid JSON.
    ResponseParseFailed { reason: String },
    /// Invalid configuration.
    InvalidConfig { reason: String },
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestFailed { reason } => {
                write!(f, "LLM request failed: {reason}")
            }
            Self::ResponseParseFailed { reason } => {
                write!(f, "failed to parse LLM response: {reason}")
            }
            Self::InvalidConfig { reason } => {
                write!(f, "invalid LLM configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for LlmError {}

/// Errors from speech operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechError {
    /// The request could not be sent or the response body not read.
    RequestFailed { reason: String },
    /// The service answered with a non-success status.
    Rejected { status: u16, body: String },
    /// Transcription finished without recognized text.
    NotRecognized { status: String },
    /// The transcription response body was not valid JSON.
    ResponseParseFailed { reason: String },
    /// Synthesis returned no audio.
    EmptyAudio,
    /// Invalid input or configuration.
    InvalidInput { reason: String },
}

impl fmt::Display for SpeechError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestFailed { reason } => write!(f, "speech request failed: {reason}"),
            Self::Rejected { status, body } => {
                write!(f, "speech service rejected request (status {status}): {body}")
            }
            Self::NotRecognized { status } => {
                write!(f, "speech was not recognized (status {status})")
            }
            Self::ResponseParseFailed { reason } => {
                write!(f, "failed to parse speech response: {reason}")
            }
            Self::EmptyAudio => write!(f, "speech synthesis returned no audio"),
            Self::InvalidInput { reason } => write!(f, "invalid speech input: {reason}"),
        }
    }
}

impl std::error::Error for SpeechError {}
