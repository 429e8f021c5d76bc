use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::{ports::ObjectStorage, DomainError};

pub struct InMemoryObjectStorage {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryObjectStorage {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryObjectStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), DomainError> {
        let mut objects = self
            .objects
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        objects.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn fetch_text(&self, key: &str) -> Result<String, DomainError> {
        let objects = self
            .objects
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        let bytes = objects
            .get(key)
            .ok_or_else(|| DomainError::not_found(format!("object {key}")))?;
        String::from_utf8(bytes.clone())
            .map_err(|_| DomainError::invalid_input("object is not valid UTF-8 text"))
    }

    async fn delete(&self, key: &str) -> Result<(), DomainError> {
        let mut objects = self
            .objects
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        objects.remove(key);
        Ok(())
    }

    fn retrieval_url(&self, key: &str) -> String {
        format!("memory://{key}")
    }
}
