pub mod voices;

pub use voices::{VoiceCatalog, VoiceError, VoiceSelector};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

const MURF_API_URL: &str = "https://api.murf.ai/v1/speech/generate";

// Fixed audio contract with the provider
const AUDIO_FORMAT: &str = "mp3";
const SAMPLE_RATE: u32 = 44_100;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech request failed: {0}")]
    Request(String),

    #[error("speech API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("speech API response contained no audio URL")]
    MissingAudioUrl,
}

/// Text-to-speech backend. Object-safe so the pipeline can be exercised
/// with a stub backend in tests. Returns the URL of the synthesized audio.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    async fn synthesize(&self, text: &str, voice: &VoiceSelector) -> Result<String, SpeechError>;
}

/// Client for the Murf `speech/generate` endpoint.
pub struct MurfClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesisRequest<'a> {
    text: &'a str,
    voice_id: &'a str,
    style: &'a str,
    format: &'a str,
    sample_rate: u32,
}

/// The audio URL field has moved across Murf API revisions; accept every
/// spelling observed in the wild.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesisResponse {
    audio_file: Option<String>,
    audio_url: Option<String>,
    audio_file_url: Option<String>,
}

impl SynthesisResponse {
    fn into_url(self) -> Option<String> {
        self.audio_file.or(self.audio_url).or(self.audio_file_url)
    }
}

impl MurfClient {
    pub fn new(
        api_key: String,
        endpoint: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            endpoint: endpoint.unwrap_or_else(|| MURF_API_URL.to_string()),
        })
    }
}

#[async_trait]
impl SpeechBackend for MurfClient {
    #[instrument(skip(self, text), fields(voice = %voice.voice_id, style = %voice.style, text_chars = text.len()))]
    async fn synthesize(&self, text: &str, voice: &VoiceSelector) -> Result<String, SpeechError> {
        let request = SynthesisRequest {
            text,
            voice_id: &voice.voice_id,
            style: &voice.style,
            format: AUDIO_FORMAT,
            sample_rate: SAMPLE_RATE,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| SpeechError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(SpeechError::Api { status, message });
        }

        let synthesis: SynthesisResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::Request(e.to_string()))?;

        let url = synthesis.into_url().ok_or(SpeechError::MissingAudioUrl)?;
        debug!(audio_url = %url, "audio synthesized");
        Ok(url)
    }
}
