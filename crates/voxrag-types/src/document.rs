//! Documents returned by vector search.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A passage stored in the vector index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Passage text.
    pub page_content: String,
    /// Remaining metadata stored alongside the vector (text key removed).
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Document {
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: Map::new(),
        }
    }
}

/// A document paired with its distance score. Lower is a closer match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub document: Document,
    pub score: f32,
}

impl ScoredDocument {
    pub fn new(document: Document, score: f32) -> Self {
        Self { document, score }
    }
}
