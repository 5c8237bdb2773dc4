//! Speech capability traits.

use crate::error::SpeechError;
use async_trait::async_trait;
use rootcause::Report;

/// Converts recorded audio into text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribes `audio` and returns the recognized text.
    ///
    /// # Errors
    ///
    /// Returns an error if the service is unreachable, rejects the request,
    /// or recognizes nothing.
    async fn transcribe(&self, audio: &[u8]) -> Result<String, Report<SpeechError>>;
}

/// Converts text into playable audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesizes `text` and returns the encoded audio bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the service is unreachable, rejects the request,
    /// or returns no audio.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, Report<SpeechError>>;
}
