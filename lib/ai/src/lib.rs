//! AI collaborators for the voice-relay service.
//!
//! This crate provides the three remote capabilities a conversation turn
//! needs, each behind a trait so the dispatcher can be tested with fakes:
//!
//! - **Completion**: [`LlmBackend`], implemented for OpenAI chat completions
//! - **Transcription**: [`Transcriber`], implemented for Azure speech-to-text
//! - **Synthesis**: [`SpeechSynthesizer`], implemented for Azure text-to-speech

pub mod azure;
pub mod backend;
pub mod error;
pub mod openai;
pub mod speech;

pub use azure::{AzureSpeechClient, AzureSpeechConfig};
pub use backend::{LlmBackend, LlmMessage, LlmRequest, LlmResponse, MessageRole};
pub use error::{LlmError, SpeechError};
pub use openai::{OpenAiBackend, OpenAiConfig};
pub use speech::{SpeechSynthesizer, Transcriber};
