use crate::config::OpenAiConfig;
use crate::error::VoiceError;
use crate::http::{build_http_client, check_status};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

/// Maximum audio upload accepted by the transcription endpoint (25 MiB).
const MAX_STT_INPUT_BYTES: usize = 25 * 1024 * 1024;

/// Speech-to-text over a complete utterance.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribes an encoded audio clip. `file_name` carries the container
    /// format (`.wav`, `.mp3`, ...).
    async fn transcribe(&self, audio: Vec<u8>, file_name: &str) -> Result<String, VoiceError>;
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Debug, Clone)]
pub struct OpenAiTranscriber {
    config: OpenAiConfig,
    http: reqwest::Client,
}

impl OpenAiTranscriber {
    pub fn new(config: OpenAiConfig) -> Self {
        let http = build_http_client(&config);
        Self { config, http }
    }
}

#[async_trait]
impl Transcriber for OpenAiTranscriber {
    async fn transcribe(&self, audio: Vec<u8>, file_name: &str) -> Result<String, VoiceError> {
        if audio.len() > MAX_STT_INPUT_BYTES {
            return Err(VoiceError::Stt(format!(
                "audio data exceeds maximum size: {} bytes (limit: {} bytes)",
                audio.len(),
                MAX_STT_INPUT_BYTES
            )));
        }
        if audio.is_empty() {
            return Err(VoiceError::Stt("audio data is empty".to_string()));
        }

        let form = Form::new()
            .text("model", self.config.stt_model.clone())
            .text("response_format", "json")
            .part("file", Part::bytes(audio).file_name(file_name.to_string()));

        let resp = self
            .http
            .post(self.config.endpoint("audio/transcriptions"))
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await?;
        let resp: TranscriptionResponse = check_status(resp).await?.json().await?;

        Ok(resp.text.trim().to_string())
    }
}
