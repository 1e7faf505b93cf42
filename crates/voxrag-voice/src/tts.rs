use crate::config::OpenAiConfig;
use crate::error::VoiceError;
use crate::http::{build_http_client, check_status};
use async_trait::async_trait;
use serde::Serialize;

/// Maximum text input per synthesis request (characters).
const MAX_TTS_INPUT_CHARS: usize = 4096;

/// Text-to-speech for agent replies.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Returns raw PCM audio (s16le, 24 kHz, mono).
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, VoiceError>;
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'static str,
}

#[derive(Debug, Clone)]
pub struct OpenAiSpeech {
    config: OpenAiConfig,
    http: reqwest::Client,
}

impl OpenAiSpeech {
    pub fn new(config: OpenAiConfig) -> Self {
        let http = build_http_client(&config);
        Self { config, http }
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, VoiceError> {
        let chars = text.chars().count();
        if chars > MAX_TTS_INPUT_CHARS {
            return Err(VoiceError::Tts(format!(
                "text exceeds maximum size: {} characters (limit: {} characters)",
                chars, MAX_TTS_INPUT_CHARS
            )));
        }

        let body = SpeechRequest {
            model: &self.config.tts_model,
            voice: &self.config.tts_voice,
            input: text,
            response_format: "pcm",
        };

        let resp = self
            .http
            .post(self.config.endpoint("audio/speech"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;
        let audio = check_status(resp).await?.bytes().await?;

        Ok(audio.to_vec())
    }
}
