use thiserror::Error;

/// Errors from the embedding provider or the vector store.
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned {status}: {message}")]
    Provider {
        service: &'static str,
        status: u16,
        message: String,
    },
}
