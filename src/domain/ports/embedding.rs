//! Embedding provider port.
//!
//! Converts text into dense vectors for similarity search.

use async_trait::async_trait;

use crate::domain::errors::{DomainError, DomainResult};

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Provider name (e.g., "ollama", "mock").
    fn name(&self) -> &'static str;

    /// Embedding dimension for this provider/model.
    fn dimension(&self) -> usize;

    /// Embed every text, preserving input order.
    ///
    /// An empty slice returns an empty result without any request. The first
    /// failing request aborts the whole batch; no partial results are returned.
    async fn embed(&self, texts: &[String]) -> DomainResult<Vec<Vec<f32>>>;

    /// Embed a single text.
    async fn embed_one(&self, text: &str) -> DomainResult<Vec<f32>> {
        self.embed(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| DomainError::UpstreamFailed("no embedding returned".to_string()))
    }
}
