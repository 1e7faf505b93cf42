use serde_json::json;
use std::sync::Arc;
use voxrag_retrieval::{
    Embedder, EmbeddingConfig, MetadataFilter, OpenAiEmbedder, PineconeConfig, PineconeStore,
    RetrievalConfig, RetrievalOutcome, Retriever, VectorStore,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_embeddings(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "embedding": [0.1, 0.2, 0.3], "index": 0 }]
        })))
        .mount(server)
        .await;
}

fn store_for(openai: &MockServer, pinecone: PineconeConfig) -> PineconeStore {
    let embedder = Arc::new(OpenAiEmbedder::new(EmbeddingConfig {
        base_url: openai.uri(),
        ..EmbeddingConfig::new("sk-test")
    }));
    PineconeStore::new(pinecone, embedder, "text")
}

#[tokio::test]
async fn test_query_sends_vector_filter_and_reads_text() {
    let openai = MockServer::start().await;
    let pinecone = MockServer::start().await;
    mount_embeddings(&openai).await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(header("Api-Key", "pc-test"))
        .and(body_partial_json(json!({
            "vector": [0.1, 0.2, 0.3],
            "topK": 4,
            "filter": { "userId": { "$eq": "alice" } },
            "includeMetadata": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "matches": [
                { "id": "a", "score": 0.3, "metadata": { "text": "Plan renews in May.", "userId": "alice" } },
                { "id": "b", "score": 0.95, "metadata": { "text": "Support is 24/7.", "userId": "alice" } },
                { "id": "c", "score": 1.2, "metadata": { "text": "Unrelated.", "userId": "alice" } }
            ],
            "namespace": ""
        })))
        .expect(1)
        .mount(&pinecone)
        .await;

    let config = PineconeConfig {
        host: Some(pinecone.uri()),
        ..PineconeConfig::new("pc-test", "kb")
    };
    let store = store_for(&openai, config);

    let results = store
        .similarity_search_with_score("when does my plan renew?", 4, &MetadataFilter::eq("userId", "alice"))
        .await
        .expect("query should succeed");

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].document.page_content, "Plan renews in May.");
    assert!((results[2].score - 1.2).abs() < 1e-6);
    assert_eq!(results[1].document.metadata["userId"], "alice");
}

#[tokio::test]
async fn test_host_is_resolved_through_control_plane_once() {
    let openai = MockServer::start().await;
    let pinecone = MockServer::start().await;
    mount_embeddings(&openai).await;

    Mock::given(method("GET"))
        .and(path("/indexes/kb"))
        .and(header("Api-Key", "pc-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "kb",
            "host": pinecone.uri()
        })))
        .expect(1)
        .mount(&pinecone)
        .await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "matches": [] })))
        .expect(2)
        .mount(&pinecone)
        .await;

    let config = PineconeConfig {
        control_plane_url: pinecone.uri(),
        ..PineconeConfig::new("pc-test", "kb")
    };
    let store = store_for(&openai, config);
    let filter = MetadataFilter::eq("userId", "alice");

    assert!(store.similarity_search_with_score("q1", 4, &filter).await.unwrap().is_empty());
    assert!(store.similarity_search_with_score("q2", 4, &filter).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_service_error_degrades_to_failed_outcome() {
    let openai = MockServer::start().await;
    let pinecone = MockServer::start().await;
    mount_embeddings(&openai).await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&pinecone)
        .await;

    let config = PineconeConfig {
        host: Some(pinecone.uri()),
        ..PineconeConfig::new("pc-test", "kb")
    };
    let retriever = Retriever::new(Arc::new(store_for(&openai, config)), RetrievalConfig::default());

    let outcome = retriever.retrieve("anything", "alice").await;
    assert!(matches!(outcome, RetrievalOutcome::Failed(_)), "got {:?}", outcome);
}

#[tokio::test]
async fn test_embedding_failure_skips_vector_query() {
    let openai = MockServer::start().await;
    let pinecone = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&openai)
        .await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "matches": [] })))
        .expect(0)
        .mount(&pinecone)
        .await;

    let config = PineconeConfig {
        host: Some(pinecone.uri()),
        ..PineconeConfig::new("pc-test", "kb")
    };
    let store = store_for(&openai, config);

    let result = store
        .similarity_search_with_score("q", 4, &MetadataFilter::eq("userId", "alice"))
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_embedder_honors_request_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": [{ "embedding": [0.1], "index": 0 }] }))
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let embedder = OpenAiEmbedder::new(EmbeddingConfig {
        base_url: server.uri(),
        request_timeout_seconds: 1,
        ..EmbeddingConfig::new("sk-test")
    });
    let result = embedder.embed_query("hello").await;

    match result {
        Err(voxrag_retrieval::RetrievalError::Http(e)) => assert!(e.is_timeout(), "got {:?}", e),
        other => panic!("Expected timeout, got {:?}", other),
    }
}
