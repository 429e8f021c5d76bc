use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{errors::DomainError, InterviewSession};

/// Transcript persistence. `save` overwrites the whole session keyed by its
/// id, which is idempotent under the single-writer-per-session assumption.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save(&self, session: &InterviewSession) -> Result<(), DomainError>;
    async fn find(&self, id: Uuid) -> Result<Option<InterviewSession>, DomainError>;
    async fn list_completed_by_owner(
        &self,
        owner: Uuid,
    ) -> Result<Vec<InterviewSession>, DomainError>;
    async fn delete(&self, id: Uuid) -> Result<(), DomainError>;
}
