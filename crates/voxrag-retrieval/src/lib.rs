//! Knowledge-base retrieval for voxrag.
//!
//! A [`Retriever`] embeds the user's utterance, asks the vector store for the
//! nearest passages belonging to that user, and keeps the ones that score
//! strictly under the configured threshold. Scores are distances: lower is a
//! closer match.
//!
//! The store sits behind the [`VectorStore`] trait. [`PineconeStore`] is the
//! production implementation; tests substitute their own.
//!
//! ```rust,ignore
//! let embedder = Arc::new(OpenAiEmbedder::new(EmbeddingConfig::new(key)));
//! let store = Arc::new(PineconeStore::new(pinecone, embedder, "text"));
//! let retriever = Retriever::new(store, RetrievalConfig::default());
//!
//! match retriever.retrieve("what is my plan?", "alice").await {
//!     RetrievalOutcome::Matches(docs) => { /* inject */ }
//!     _ => { /* nothing found */ }
//! }
//! ```

pub mod config;
pub mod embed;
pub mod error;
pub mod retriever;
pub mod stats;
pub mod store;

pub use config::{EmbeddingConfig, PineconeConfig, RetrievalConfig};
pub use embed::{Embedder, OpenAiEmbedder};
pub use error::RetrievalError;
pub use retriever::{filter_by_threshold, RetrievalOutcome, Retriever};
pub use stats::{RetrievalStats, StatsSnapshot};
pub use store::{MetadataFilter, PineconeStore, VectorStore};
