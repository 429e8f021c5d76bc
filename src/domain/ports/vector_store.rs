use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    errors::DomainError, Embedding, VectorMatch, VectorNamespace, VectorRecord,
};

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Upsert is keyed by record id; re-upserting an id replaces the record.
    async fn upsert(
        &self,
        namespace: VectorNamespace,
        records: Vec<VectorRecord>,
    ) -> Result<(), DomainError>;

    /// Ranked top-k similarity query, optionally filtered to one document.
    async fn query(
        &self,
        namespace: VectorNamespace,
        vector: &Embedding,
        top_k: usize,
        document_id: Option<Uuid>,
    ) -> Result<Vec<VectorMatch>, DomainError>;

    async fn fetch(
        &self,
        namespace: VectorNamespace,
        id: &str,
    ) -> Result<Option<VectorRecord>, DomainError>;

    async fn delete_by_document(
        &self,
        namespace: VectorNamespace,
        document_id: Uuid,
    ) -> Result<(), DomainError>;
}
