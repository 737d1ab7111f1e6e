//! HTTP client for the external speech-to-text collaborator.

use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::capture::AudioBlob;
use crate::error::TranscribeError;

#[derive(Clone, Debug)]
pub struct TranscriberConfig {
    pub endpoint: String,
    pub api_key: String,
}

impl TranscriberConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("SCREEN_TRANSCRIBE_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let endpoint = env::var("SCREEN_TRANSCRIBE_URL")
            .unwrap_or_else(|_| "https://api.elevenlabs.io/v1/speech-to-text".into());
        Some(Self { endpoint, api_key })
    }
}

/// External speech-to-text collaborator.
///
/// The capture pipeline tolerates any failure here by falling back to an
/// untranscribed attempt, so implementations are free to error.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe one audio blob to text.
    ///
    /// # Errors
    ///
    /// Returns `TranscribeError` when the service is disabled, the request
    /// fails, or the response carries no text.
    async fn transcribe(&self, audio: &AudioBlob) -> Result<String, TranscribeError>;
}

#[derive(Clone)]
pub struct HttpTranscriber {
    client: Client,
    config: Option<TranscriberConfig>,
}

impl HttpTranscriber {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(TranscriberConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<TranscriberConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }
}

#[async_trait]
impl Transcriber for HttpTranscriber {
    async fn transcribe(&self, audio: &AudioBlob) -> Result<String, TranscribeError> {
        let config = self.config.as_ref().ok_or(TranscribeError::Disabled)?;

        let response = self
            .client
            .post(&config.endpoint)
            .bearer_auth(&config.api_key)
            .header(reqwest::header::CONTENT_TYPE, audio.mime_type.clone())
            .body(audio.bytes.clone())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TranscribeError::HttpStatus(response.status()));
        }

        let body: TranscriptionResponse = response.json().await?;
        let text = body.text.ok_or(TranscribeError::EmptyResponse)?;

        Ok(text.trim().to_string())
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: Option<String>,
}
