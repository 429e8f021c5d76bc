use std::collections::HashMap;

use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Pool};
use uuid::Uuid;

use crate::domain::{ports::CredentialVerifier, DomainError};

/// Looks API keys up in Redis (`apikey:{key}` -> principal uuid), the same
/// store the rest of the system already runs on.
pub struct RedisApiKeyVerifier {
    pool: Pool,
}

impl RedisApiKeyVerifier {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    fn key(credential: &str) -> String {
        format!("apikey:{credential}")
    }
}

#[async_trait]
impl CredentialVerifier for RedisApiKeyVerifier {
    async fn verify(&self, credential: &str) -> Result<Uuid, DomainError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| DomainError::internal(format!("redis pool: {e}")))?;

        let principal: Option<String> = conn
            .get(Self::key(credential))
            .await
            .map_err(|e| DomainError::internal(e.to_string()))?;

        principal
            .and_then(|p| p.parse().ok())
            .ok_or_else(|| DomainError::auth("unknown API key"))
    }
}

/// Fixed key-to-principal map, parsed from `API_KEYS` style configuration.
/// Useful for tests and single-tenant deployments.
pub struct StaticApiKeyVerifier {
    keys: HashMap<String, Uuid>,
}

impl StaticApiKeyVerifier {
    pub fn new(keys: HashMap<String, Uuid>) -> Self {
        Self { keys }
    }

    /// Parses `key1:uuid1,key2:uuid2`; malformed entries are skipped.
    pub fn from_spec(spec: &str) -> Self {
        let keys = spec
            .split(',')
            .filter_map(|entry| {
                let (key, principal) = entry.split_once(':')?;
                let principal: Uuid = principal.trim().parse().ok()?;
                Some((key.trim().to_string(), principal))
            })
            .collect();
        Self { keys }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[async_trait]
impl CredentialVerifier for StaticApiKeyVerifier {
    async fn verify(&self, credential: &str) -> Result<Uuid, DomainError> {
        self.keys
            .get(credential)
            .copied()
            .ok_or_else(|| DomainError::auth("unknown API key"))
    }
}
