//! Query embedding.

use crate::config::EmbeddingConfig;
use crate::error::RetrievalError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A text embedding model.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds a single query string.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RetrievalError>;
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Hosted embedding client.
#[derive(Debug, Clone)]
pub struct OpenAiEmbedder {
    config: EmbeddingConfig,
    http: reqwest::Client,
}

impl OpenAiEmbedder {
    pub fn new(config: EmbeddingConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "http client builder failed, using default client");
                reqwest::Client::new()
            });
        Self { config, http }
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        let url = format!("{}/embeddings", self.config.base_url.trim_end_matches('/'));
        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&EmbeddingRequest {
                model: &self.config.model,
                input: text,
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RetrievalError::Provider {
                service: "embeddings",
                status: status.as_u16(),
                message: resp.text().await.unwrap_or_default(),
            });
        }

        let body: EmbeddingResponse = resp.json().await?;
        body.data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| RetrievalError::Embedding("provider returned no embedding".to_string()))
    }
}
