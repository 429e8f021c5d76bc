use async_trait::async_trait;

use crate::domain::{errors::DomainError, Embedding};

#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError>;
    /// One vector per input, in input order, resolved in a single upstream
    /// round trip where the provider supports it.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError>;
    fn dimension(&self) -> usize;
}
