//! Retrieval policy and vector-store connection settings.

use serde::{Deserialize, Serialize};
use std::fmt;

fn default_top_k() -> usize {
    4
}

fn default_score_threshold() -> f32 {
    1.0
}

fn default_filter_field() -> String {
    "userId".to_string()
}

fn default_text_key() -> String {
    "text".to_string()
}

fn default_control_plane_url() -> String {
    "https://api.pinecone.io".to_string()
}

fn default_api_version() -> String {
    "2024-07".to_string()
}

fn default_embedding_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}

fn default_request_timeout_seconds() -> u64 {
    30
}

/// Policy applied to every query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of nearest neighbours requested.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Results are kept only when `score < score_threshold`.
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f32,

    /// Metadata field matched against the user id.
    #[serde(default = "default_filter_field")]
    pub filter_field: String,

    /// Metadata field holding the passage text.
    #[serde(default = "default_text_key")]
    pub text_key: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            score_threshold: default_score_threshold(),
            filter_field: default_filter_field(),
            text_key: default_text_key(),
        }
    }
}

/// Pinecone index connection.
#[derive(Clone, Serialize, Deserialize)]
pub struct PineconeConfig {
    #[serde(default, skip_serializing)]
    pub api_key: String,

    /// Index name, resolved to a data-plane host through the control plane.
    #[serde(default)]
    pub index: String,

    /// Data-plane host. Skips control-plane resolution when set.
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default = "default_control_plane_url")]
    pub control_plane_url: String,

    /// Index namespace. Empty selects the default namespace.
    #[serde(default)]
    pub namespace: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

impl Default for PineconeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            index: String::new(),
            host: None,
            control_plane_url: default_control_plane_url(),
            namespace: String::new(),
            api_version: default_api_version(),
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

impl fmt::Debug for PineconeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PineconeConfig")
            .field("api_key", &"[REDACTED]")
            .field("index", &self.index)
            .field("host", &self.host)
            .field("control_plane_url", &self.control_plane_url)
            .field("namespace", &self.namespace)
            .field("api_version", &self.api_version)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .finish()
    }
}

impl PineconeConfig {
    pub fn new(api_key: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            index: index.into(),
            ..Default::default()
        }
    }
}

/// Embedding provider settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default, skip_serializing)]
    pub api_key: String,
    #[serde(default = "default_embedding_base_url")]
    pub base_url: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_embedding_base_url(),
            model: default_embedding_model(),
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

impl fmt::Debug for EmbeddingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .finish()
    }
}

impl EmbeddingConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }
}
