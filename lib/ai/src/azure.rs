//! Azure Cognitive Services speech client.
//!
//! Synthesis posts SSML to the regional text-to-speech endpoint; recognition
//! posts raw audio to the short-audio conversation endpoint and reads
//! `DisplayText` from the JSON result.

use crate::error::SpeechError;
use crate::speech::{SpeechSynthesizer, Transcriber};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use rootcause::Report;
use serde::Deserialize;
use std::fmt;
use tracing::{debug, instrument, warn};

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const OUTPUT_FORMAT_HEADER: &str = "X-Microsoft-OutputFormat";

fn default_language() -> String {
    "ja-JP".to_string()
}

fn default_voice_name() -> String {
    "ja-JP-MayuNeural".to_string()
}

fn default_voice_gender() -> String {
    "Female".to_string()
}

fn default_output_format() -> String {
    "audio-16khz-128kbitrate-mono-mp3".to_string()
}

fn default_input_content_type() -> String {
    "audio/ogg; codecs=opus".to_string()
}

fn default_user_agent() -> String {
    "voice-relay".to_string()
}

/// Configuration for [`AzureSpeechClient`].
#[derive(Clone, Deserialize)]
pub struct AzureSpeechConfig {
    /// Subscription key.
    pub key: String,
    /// Azure region, e.g. `japaneast`.
    pub region: String,
    /// Locale used for recognition and synthesis.
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_voice_name")]
    pub voice_name: String,
    #[serde(default = "default_voice_gender")]
    pub voice_gender: String,
    #[serde(default = "default_output_format")]
    pub output_format: String,
    /// Content type of audio handed to recognition.
    #[serde(default = "default_input_content_type")]
    pub input_content_type: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Full synthesis URL; derived from `region` when unset.
    #[serde(default)]
    pub tts_endpoint: Option<String>,
    /// Full recognition URL without query; derived from `region` when unset.
    #[serde(default)]
    pub stt_endpoint: Option<String>,
}

impl AzureSpeechConfig {
    /// Creates a config with default locale and voice.
    #[must_use]
    pub fn new(key: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            region: region.into(),
            language: default_language(),
            voice_name: default_voice_name(),
            voice_gender: default_voice_gender(),
            output_format: default_output_format(),
            input_content_type: default_input_content_type(),
            user_agent: default_user_agent(),
            tts_endpoint: None,
            stt_endpoint: None,
        }
    }

    /// Points both endpoints at `base`, e.g. a local mock server.
    #[must_use]
    pub fn with_base_url(mut self, base: impl AsRef<str>) -> Self {
        let base = base.as_ref().trim_end_matches('/');
        self.tts_endpoint = Some(format!("{base}/cognitiveservices/v1"));
        self.stt_endpoint = Some(format!(
            "{base}/speech/recognition/conversation/cognitiveservices/v1"
        ));
        self
    }

    /// Returns the synthesis URL.
    #[must_use]
    pub fn tts_url(&self) -> String {
        self.tts_endpoint.clone().unwrap_or_else(|| {
            format!(
                "https://{}.tts.speech.microsoft.com/cognitiveservices/v1",
                self.region
            )
        })
    }

    /// Returns the recognition URL, without the language query.
    #[must_use]
    pub fn stt_url(&self) -> String {
        self.stt_endpoint.clone().unwrap_or_else(|| {
            format!(
                "https://{}.stt.speech.microsoft.com/speech/recognition/conversation/cognitiveservices/v1",
                self.region
            )
        })
    }

    /// Builds the SSML document for `text`.
    #[must_use]
    pub fn ssml(&self, text: &str) -> String {
        format!(
            r#"<speak version="1.0" xml:lang="{lang}"><voice xml:lang="{lang}" xml:gender="{gender}" name="{name}">{text}</voice></speak>"#,
            lang = xml_escape(&self.language),
            gender = xml_escape(&self.voice_gender),
            name = xml_escape(&self.voice_name),
            text = xml_escape(text),
        )
    }
}

impl fmt::Debug for AzureSpeechConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureSpeechConfig")
            .field("key", &"[redacted]")
            .field("region", &self.region)
            .field("language", &self.language)
            .field("voice_name", &self.voice_name)
            .field("voice_gender", &self.voice_gender)
            .field("output_format", &self.output_format)
            .field("input_content_type", &self.input_content_type)
            .field("tts_endpoint", &self.tts_endpoint)
            .field("stt_endpoint", &self.stt_endpoint)
            .finish()
    }
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RecognitionResult {
    #[serde(default)]
    recognition_status: Option<String>,
    #[serde(default)]
    display_text: Option<String>,
}

/// Azure speech client implementing [`Transcriber`] and [`SpeechSynthesizer`].
#[derive(Debug, Clone)]
pub struct AzureSpeechClient {
    client: reqwest::Client,
    config: AzureSpeechConfig,
}

impl AzureSpeechClient {
    /// Creates a client sharing the given HTTP client.
    #[must_use]
    pub fn new(client: reqwest::Client, config: AzureSpeechConfig) -> Self {
        Self { client, config }
    }

    /// Returns the client configuration.
    #[must_use]
    pub fn config(&self) -> &AzureSpeechConfig {
        &self.config
    }
}

fn request_failed(e: reqwest::Error) -> SpeechError {
    SpeechError::RequestFailed {
        reason: e.to_string(),
    }
}

async fn reject(response: reqwest::Response) -> Report<SpeechError> {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    warn!(status, "speech service rejected request");
    SpeechError::Rejected { status, body }.into()
}

#[async_trait]
impl Transcriber for AzureSpeechClient {
    #[instrument(skip(self, audio), fields(bytes = audio.len(), language = %self.config.language))]
    async fn transcribe(&self, audio: &[u8]) -> Result<String, Report<SpeechError>> {
        if audio.is_empty() {
            return Err(SpeechError::InvalidInput {
                reason: "audio payload is empty".to_string(),
            }
            .into());
        }

        let response = self
            .client
            .post(self.config.stt_url())
            .query(&[("language", self.config.language.as_str())])
            .header(SUBSCRIPTION_KEY_HEADER, &self.config.key)
            .header(CONTENT_TYPE, &self.config.input_content_type)
            .header(ACCEPT, "application/json")
            .body(audio.to_vec())
            .send()
            .await
            .map_err(request_failed)?;

        if !response.status().is_success() {
            return Err(reject(response).await);
        }

        let text = response.text().await.map_err(request_failed)?;
        let result: RecognitionResult =
            serde_json::from_str(&text).map_err(|e| SpeechError::ResponseParseFailed {
                reason: e.to_string(),
            })?;

        let status = result
            .recognition_status
            .unwrap_or_else(|| "Unknown".to_string());
        match result.display_text {
            Some(recognized) if status == "Success" => {
                debug!(chars = recognized.chars().count(), "transcribed audio");
                Ok(recognized)
            }
            _ => Err(SpeechError::NotRecognized { status }.into()),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for AzureSpeechClient {
    #[instrument(skip(self, text), fields(chars = text.chars().count(), voice = %self.config.voice_name))]
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, Report<SpeechError>> {
        let response = self
            .client
            .post(self.config.tts_url())
            .header(SUBSCRIPTION_KEY_HEADER, &self.config.key)
            .header(CONTENT_TYPE, "application/ssml+xml")
            .header(OUTPUT_FORMAT_HEADER, &self.config.output_format)
            .header(USER_AGENT, &self.config.user_agent)
            .body(self.config.ssml(text))
            .send()
            .await
            .map_err(request_failed)?;

        if !response.status().is_success() {
            return Err(reject(response).await);
        }

        let audio = response.bytes().await.map_err(request_failed)?;
        if audio.is_empty() {
            return Err(SpeechError::EmptyAudio.into());
        }

        debug!(bytes = audio.len(), "synthesized speech");
        Ok(audio.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> AzureSpeechClient {
        let config = AzureSpeechConfig::new("speech-key", "japaneast").with_base_url(server.uri());
        AzureSpeechClient::new(reqwest::Client::new(), config)
    }

    #[test]
    fn regional_urls() {
        let config = AzureSpeechConfig::new("k", "japaneast");
        assert_eq!(
            config.tts_url(),
            "https://japaneast.tts.speech.microsoft.com/cognitiveservices/v1"
        );
        assert_eq!(
            config.stt_url(),
            "https://japaneast.stt.speech.microsoft.com/speech/recognition/conversation/cognitiveservices/v1"
        );
    }

    #[test]
    fn ssml_uses_configured_voice() {
        let ssml = AzureSpeechConfig::new("k", "r").ssml("こんにちは");
        assert_eq!(
            ssml,
            r#"<speak version="1.0" xml:lang="ja-JP"><voice xml:lang="ja-JP" xml:gender="Female" name="ja-JP-MayuNeural">こんにちは</voice></speak>"#
        );
    }

    #[test]
    fn ssml_escapes_markup_in_text() {
        let ssml = AzureSpeechConfig::new("k", "r").ssml("a < b & \"c\"");
        assert!(ssml.contains(">a &lt; b &amp; &quot;c&quot;</voice>"));
    }

    #[test]
    fn debug_redacts_key() {
        let rendered = format!("{:?}", AzureSpeechConfig::new("very-secret", "r"));
        assert!(!rendered.contains("very-secret"));
    }

    #[tokio::test]
    async fn synthesize_posts_ssml_and_returns_audio() {
        let server = MockServer::start().await;
        let expected = AzureSpeechConfig::new("k", "r").ssml("hello");
        Mock::given(method("POST"))
            .and(path("/cognitiveservices/v1"))
            .and(header("Ocp-Apim-Subscription-Key", "speech-key"))
            .and(header("content-type", "application/ssml+xml"))
            .and(header(
                "X-Microsoft-OutputFormat",
                "audio-16khz-128kbitrate-mono-mp3",
            ))
            .and(body_string(expected))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
            .expect(1)
            .mount(&server)
            .await;

        let audio = client(&server).synthesize("hello").await.unwrap();

        assert_eq!(audio, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn synthesize_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("denied"))
            .mount(&server)
            .await;

        let result = client(&server).synthesize("hello").await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn synthesize_rejects_empty_audio() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        assert!(client(&server).synthesize("hello").await.is_err());
    }

    #[tokio::test]
    async fn transcribe_returns_display_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(
                "/speech/recognition/conversation/cognitiveservices/v1",
            ))
            .and(query_param("language", "ja-JP"))
            .and(header("Ocp-Apim-Subscription-Key", "speech-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "RecognitionStatus": "Success",
                "DisplayText": "こんにちは。",
                "Offset": 0,
                "Duration": 1000
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server).transcribe(&[0u8; 16]).await.unwrap();

        assert_eq!(text, "こんにちは。");
    }

    #[tokio::test]
    async fn transcribe_without_match_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "RecognitionStatus": "NoMatch"
            })))
            .mount(&server)
            .await;

        assert!(client(&server).transcribe(&[0u8; 16]).await.is_err());
    }

    #[tokio::test]
    async fn transcribe_rejects_empty_audio_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        assert!(client(&server).transcribe(&[]).await.is_err());
    }
}
