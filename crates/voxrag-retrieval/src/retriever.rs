//! Per-user retrieval policy over a [`VectorStore`].

use crate::config::RetrievalConfig;
use crate::error::RetrievalError;
use crate::stats::RetrievalStats;
use crate::store::{MetadataFilter, VectorStore};
use std::sync::Arc;
use voxrag_types::{Document, ScoredDocument};

/// Result of one retrieval attempt.
///
/// Only [`RetrievalOutcome::Matches`] carries passages. The other variants
/// all read as "nothing found" to the conversation but stay distinct for
/// logging and counters.
#[derive(Debug)]
pub enum RetrievalOutcome {
    /// At least one result scored under the threshold. Order is the order the
    /// store returned.
    Matches(Vec<Document>),
    /// The query ran but no result scored under the threshold.
    NoMatches { candidates: usize },
    /// The query text was empty; the store was not contacted.
    SkippedEmptyQuery,
    /// The embedding or vector store call failed.
    Failed(RetrievalError),
}

impl RetrievalOutcome {
    /// Qualifying documents, empty for every non-match outcome.
    pub fn documents(&self) -> &[Document] {
        match self {
            Self::Matches(docs) => docs,
            _ => &[],
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matches(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Matches(_) => "matches",
            Self::NoMatches { .. } => "no_matches",
            Self::SkippedEmptyQuery => "skipped",
            Self::Failed(_) => "failed",
        }
    }
}

/// Keeps results with `score < threshold`, preserving order.
pub fn filter_by_threshold(results: Vec<ScoredDocument>, threshold: f32) -> Vec<Document> {
    results
        .into_iter()
        .filter(|r| r.score < threshold)
        .map(|r| r.document)
        .collect()
}

/// Queries a vector store on behalf of one user at a time.
///
/// Constructed once per process and shared by reference across sessions.
#[derive(Clone)]
pub struct Retriever {
    store: Arc<dyn VectorStore>,
    config: RetrievalConfig,
    stats: Arc<RetrievalStats>,
}

impl Retriever {
    pub fn new(store: Arc<dyn VectorStore>, config: RetrievalConfig) -> Self {
        Self {
            store,
            config,
            stats: Arc::new(RetrievalStats::new()),
        }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn stats(&self) -> &RetrievalStats {
        &self.stats
    }

    /// Searches the documents belonging to `user_id` for `query`.
    ///
    /// Never returns an error: failures come back as
    /// [`RetrievalOutcome::Failed`].
    pub async fn retrieve(&self, query: &str, user_id: &str) -> RetrievalOutcome {
        if query.trim().is_empty() {
            self.stats.record_skipped();
            tracing::debug!(user_id, "empty query, skipping vector search");
            return RetrievalOutcome::SkippedEmptyQuery;
        }

        tracing::info!(user_id, query, "querying vector store");

        let filter = MetadataFilter::eq(&self.config.filter_field, user_id);
        let results = match self
            .store
            .similarity_search_with_score(query, self.config.top_k, &filter)
            .await
        {
            Ok(results) => results,
            Err(e) => {
                self.stats.record_failed();
                tracing::warn!(user_id, error = %e, "vector search failed");
                return RetrievalOutcome::Failed(e);
            }
        };

        let candidates = results.len();
        let docs = filter_by_threshold(results, self.config.score_threshold);
        tracing::info!(
            user_id,
            candidates,
            retained = docs.len(),
            threshold = self.config.score_threshold,
            "vector search complete"
        );

        if docs.is_empty() {
            self.stats.record_no_match();
            RetrievalOutcome::NoMatches { candidates }
        } else {
            self.stats.record_matched();
            RetrievalOutcome::Matches(docs)
        }
    }
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("config", &self.config)
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(text: &str, score: f32) -> ScoredDocument {
        ScoredDocument::new(Document::new(text), score)
    }

    #[test]
    fn threshold_is_strict_and_order_preserving() {
        let results = vec![
            scored("docA", 0.3),
            scored("docB", 0.95),
            scored("docC", 1.2),
            scored("docD", 1.0),
        ];
        let kept: Vec<String> = filter_by_threshold(results, 1.0)
            .into_iter()
            .map(|d| d.page_content)
            .collect();
        assert_eq!(kept, vec!["docA", "docB"]);
    }

    #[test]
    fn documents_empty_for_non_matches() {
        assert!(RetrievalOutcome::SkippedEmptyQuery.documents().is_empty());
        assert!(RetrievalOutcome::NoMatches { candidates: 3 }.documents().is_empty());
        let failed = RetrievalOutcome::Failed(RetrievalError::VectorStore("down".into()));
        assert!(failed.documents().is_empty());
        assert_eq!(failed.label(), "failed");
    }
}
