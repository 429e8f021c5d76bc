use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainError;

/// Resolves an opaque credential to a verified principal id.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<Uuid, DomainError>;
}
