use crate::config::OpenAiConfig;
use crate::error::VoiceError;
use crate::http::{build_http_client, check_status};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use voxrag_types::ChatMessage;

/// Request/response chat completion.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generates the next assistant reply for `messages`.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, VoiceError>;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat completion client for the hosted LLM.
#[derive(Debug, Clone)]
pub struct OpenAiChat {
    config: OpenAiConfig,
    http: reqwest::Client,
}

impl OpenAiChat {
    pub fn new(config: OpenAiConfig) -> Self {
        let http = build_http_client(&config);
        Self { config, http }
    }

    pub fn model(&self) -> &str {
        &self.config.llm_model
    }
}

#[async_trait]
impl LanguageModel for OpenAiChat {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, VoiceError> {
        let body = CompletionRequest {
            model: &self.config.llm_model,
            messages,
        };

        let resp = self
            .http
            .post(self.config.endpoint("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;
        let resp: CompletionResponse = check_status(resp).await?.json().await?;

        resp.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| VoiceError::Llm("completion returned no content".to_string()))
    }
}
