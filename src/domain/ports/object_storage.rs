use async_trait::async_trait;

use crate::domain::errors::DomainError;

/// Durable storage for uploaded document bytes, addressed by key.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), DomainError>;
    async fn fetch_text(&self, key: &str) -> Result<String, DomainError>;
    async fn delete(&self, key: &str) -> Result<(), DomainError>;
    /// URL a client can use to retrieve the stored object.
    fn retrieval_url(&self, key: &str) -> String;
}
