//! Vector store access.

use crate::config::PineconeConfig;
use crate::embed::Embedder;
use crate::error::RetrievalError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use voxrag_types::{Document, ScoredDocument};

/// Metadata equality constraints applied server-side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataFilter {
    equals: BTreeMap<String, String>,
}

impl MetadataFilter {
    /// A filter matching documents whose `field` equals `value`.
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        let mut equals = BTreeMap::new();
        equals.insert(field.into(), value.into());
        Self { equals }
    }

    pub fn is_empty(&self) -> bool {
        self.equals.is_empty()
    }

    /// Renders the filter in the vector store's query language:
    /// `{"field": {"$eq": "value"}, ...}`.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .equals
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::json!({ "$eq": v })))
            .collect();
        Value::Object(map)
    }
}

/// Similarity search over a hosted index.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Returns up to `k` documents nearest to `query`, ranked, each paired
    /// with the score reported by the index.
    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
        filter: &MetadataFilter,
    ) -> Result<Vec<ScoredDocument>, RetrievalError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: Vec<f32>,
    top_k: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<Value>,
    include_metadata: bool,
    include_values: bool,
    #[serde(skip_serializing_if = "str::is_empty")]
    namespace: &'a str,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    #[serde(default)]
    id: String,
    score: f32,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
struct DescribeIndexResponse {
    host: String,
}

/// Pinecone-backed store. Queries are embedded with the configured
/// [`Embedder`] and the passage text is read from `text_key` in each match's
/// metadata.
pub struct PineconeStore {
    config: PineconeConfig,
    embedder: Arc<dyn Embedder>,
    text_key: String,
    http: reqwest::Client,
    host: OnceCell<String>,
}

impl PineconeStore {
    pub fn new(config: PineconeConfig, embedder: Arc<dyn Embedder>, text_key: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "http client builder failed, using default client");
                reqwest::Client::new()
            });
        let host = match config.host.as_deref().filter(|h| !h.trim().is_empty()) {
            Some(h) => OnceCell::new_with(Some(normalize_host(h))),
            None => OnceCell::new(),
        };
        Self {
            config,
            embedder,
            text_key: text_key.into(),
            http,
            host,
        }
    }

    /// Data-plane base URL, resolved through the control plane on first use.
    async fn data_plane(&self) -> Result<&str, RetrievalError> {
        let host = self
            .host
            .get_or_try_init(|| async {
                let url = format!(
                    "{}/indexes/{}",
                    self.config.control_plane_url.trim_end_matches('/'),
                    self.config.index
                );
                let resp = self
                    .http
                    .get(url)
                    .header("Api-Key", &self.config.api_key)
                    .header("X-Pinecone-API-Version", &self.config.api_version)
                    .send()
                    .await?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(RetrievalError::Provider {
                        service: "pinecone control plane",
                        status: status.as_u16(),
                        message: resp.text().await.unwrap_or_default(),
                    });
                }
                let described: DescribeIndexResponse = resp.json().await?;
                tracing::info!(index = %self.config.index, host = %described.host, "resolved index host");
                Ok(normalize_host(&described.host))
            })
            .await?;
        Ok(host.as_str())
    }
}

impl std::fmt::Debug for PineconeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PineconeStore")
            .field("config", &self.config)
            .field("text_key", &self.text_key)
            .field("host", &self.host.get())
            .finish()
    }
}

#[async_trait]
impl VectorStore for PineconeStore {
    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
        filter: &MetadataFilter,
    ) -> Result<Vec<ScoredDocument>, RetrievalError> {
        let vector = self.embedder.embed_query(query).await?;
        let base = self.data_plane().await?;

        let body = QueryRequest {
            vector,
            top_k: k,
            filter: (!filter.is_empty()).then(|| filter.to_json()),
            include_metadata: true,
            include_values: false,
            namespace: &self.config.namespace,
        };

        let resp = self
            .http
            .post(format!("{}/query", base))
            .header("Api-Key", &self.config.api_key)
            .header("X-Pinecone-API-Version", &self.config.api_version)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RetrievalError::Provider {
                service: "pinecone",
                status: status.as_u16(),
                message: resp.text().await.unwrap_or_default(),
            });
        }

        let resp: QueryResponse = resp.json().await?;
        Ok(resp
            .matches
            .into_iter()
            .filter_map(|m| to_scored_document(m, &self.text_key))
            .collect())
    }
}

fn to_scored_document(m: QueryMatch, text_key: &str) -> Option<ScoredDocument> {
    let mut metadata = m.metadata.unwrap_or_default();
    match metadata.remove(text_key) {
        Some(Value::String(text)) => Some(ScoredDocument::new(
            Document {
                page_content: text,
                metadata,
            },
            m.score,
        )),
        _ => {
            tracing::warn!(id = %m.id, text_key, "match has no text under the text key, skipping");
            None
        }
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}
