use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use voxrag_retrieval::{
    MetadataFilter, RetrievalConfig, RetrievalError, RetrievalOutcome, Retriever, VectorStore,
};
use voxrag_types::{Document, ScoredDocument};

/// Store double that returns canned results and records each call.
struct FakeStore {
    results: Result<Vec<(&'static str, f32)>, &'static str>,
    calls: Mutex<Vec<(String, usize, MetadataFilter)>>,
}

impl FakeStore {
    fn returning(results: Vec<(&'static str, f32)>) -> Arc<Self> {
        Arc::new(Self {
            results: Ok(results),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: &'static str) -> Arc<Self> {
        Arc::new(Self {
            results: Err(message),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl VectorStore for FakeStore {
    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
        filter: &MetadataFilter,
    ) -> Result<Vec<ScoredDocument>, RetrievalError> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), k, filter.clone()));
        match &self.results {
            Ok(results) => Ok(results
                .iter()
                .map(|(text, score)| ScoredDocument::new(Document::new(*text), *score))
                .collect()),
            Err(msg) => Err(RetrievalError::VectorStore(msg.to_string())),
        }
    }
}

fn texts(outcome: &RetrievalOutcome) -> Vec<&str> {
    outcome
        .documents()
        .iter()
        .map(|d| d.page_content.as_str())
        .collect()
}

#[tokio::test]
async fn test_keeps_only_scores_below_threshold_in_order() {
    let store = FakeStore::returning(vec![("docA", 0.3), ("docB", 0.95), ("docC", 1.2)]);
    let retriever = Retriever::new(store.clone(), RetrievalConfig::default());

    let outcome = retriever.retrieve("what is my plan?", "alice").await;

    assert!(outcome.is_match());
    assert_eq!(texts(&outcome), vec!["docA", "docB"]);
}

#[tokio::test]
async fn test_query_is_scoped_to_user_with_top_k() {
    let store = FakeStore::returning(vec![]);
    let retriever = Retriever::new(store.clone(), RetrievalConfig::default());

    retriever.retrieve("billing question", "alice").await;

    let calls = store.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (query, k, filter) = &calls[0];
    assert_eq!(query, "billing question");
    assert_eq!(*k, 4);
    assert_eq!(*filter, MetadataFilter::eq("userId", "alice"));
}

#[tokio::test]
async fn test_all_scores_at_or_above_threshold_is_no_match() {
    let store = FakeStore::returning(vec![("docA", 1.0), ("docB", 1.7)]);
    let retriever = Retriever::new(store, RetrievalConfig::default());

    let outcome = retriever.retrieve("anything", "alice").await;

    match outcome {
        RetrievalOutcome::NoMatches { candidates } => assert_eq!(candidates, 2),
        other => panic!("Expected NoMatches, got {:?}", other),
    }
}

#[tokio::test]
async fn test_store_failure_is_captured_not_raised() {
    let store = FakeStore::failing("connection reset");
    let retriever = Retriever::new(store, RetrievalConfig::default());

    let outcome = retriever.retrieve("anything", "alice").await;

    match &outcome {
        RetrievalOutcome::Failed(e) => assert!(e.to_string().contains("connection reset")),
        other => panic!("Expected Failed, got {:?}", other),
    }
    assert!(outcome.documents().is_empty());
}

#[tokio::test]
async fn test_empty_query_skips_store() {
    let store = FakeStore::returning(vec![("docA", 0.1)]);
    let retriever = Retriever::new(store.clone(), RetrievalConfig::default());

    let outcome = retriever.retrieve("", "alice").await;
    assert!(matches!(outcome, RetrievalOutcome::SkippedEmptyQuery));

    let outcome = retriever.retrieve("   ", "alice").await;
    assert!(matches!(outcome, RetrievalOutcome::SkippedEmptyQuery));

    assert_eq!(store.call_count(), 0);
}

#[tokio::test]
async fn test_configured_threshold_and_top_k() {
    let store = FakeStore::returning(vec![("docA", 0.3), ("docB", 0.6)]);
    let config = RetrievalConfig {
        top_k: 2,
        score_threshold: 0.5,
        ..Default::default()
    };
    let retriever = Retriever::new(store.clone(), config);

    let outcome = retriever.retrieve("q", "bob").await;

    assert_eq!(texts(&outcome), vec!["docA"]);
    assert_eq!(store.calls.lock().unwrap()[0].1, 2);
}

#[tokio::test]
async fn test_stats_count_each_outcome() {
    let store = FakeStore::returning(vec![("docA", 0.3)]);
    let retriever = Retriever::new(store, RetrievalConfig::default());
    retriever.retrieve("q1", "alice").await;
    retriever.retrieve("", "alice").await;

    let failing = Retriever::new(FakeStore::failing("boom"), RetrievalConfig::default());
    failing.retrieve("q", "alice").await;

    let snap = retriever.stats().snapshot();
    assert_eq!(snap.queries, 2);
    assert_eq!(snap.matched, 1);
    assert_eq!(snap.skipped, 1);
    assert_eq!(snap.failed, 0);

    let snap = failing.stats().snapshot();
    assert_eq!(snap.queries, 1);
    assert_eq!(snap.failed, 1);
}

#[test]
fn test_retrieval_config_from_toml() {
    let config: RetrievalConfig = toml::from_str("score_threshold = 0.8").unwrap();
    assert_eq!(config.top_k, 4);
    assert!((config.score_threshold - 0.8).abs() < f32::EPSILON);
    assert_eq!(config.filter_field, "userId");
    assert_eq!(config.text_key, "text");
}
