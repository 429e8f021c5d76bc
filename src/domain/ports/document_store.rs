use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{errors::DomainError, Document, IngestionStatus};

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn save(&self, document: &Document) -> Result<(), DomainError>;
    async fn find(&self, id: Uuid) -> Result<Option<Document>, DomainError>;
    async fn find_by_filename(
        &self,
        owner: Uuid,
        filename: &str,
    ) -> Result<Option<Document>, DomainError>;
    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Document>, DomainError>;
    /// Applies the forward-only transition rule; a stale update is a no-op.
    async fn update_status(&self, id: Uuid, status: IngestionStatus) -> Result<(), DomainError>;
    async fn delete(&self, id: Uuid) -> Result<(), DomainError>;
}
