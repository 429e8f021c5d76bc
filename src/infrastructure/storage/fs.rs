use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::domain::{ports::ObjectStorage, DomainError};

/// Filesystem-backed object storage: each key is a file under the root.
pub struct FsObjectStorage {
    root: PathBuf,
}

impl FsObjectStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl ObjectStorage for FsObjectStorage {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), DomainError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| DomainError::internal(e.to_string()))?;
        fs::write(self.path_for(key), bytes)
            .await
            .map_err(|e| DomainError::internal(e.to_string()))
    }

    async fn fetch_text(&self, key: &str) -> Result<String, DomainError> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(DomainError::not_found(format!("object {key}")))
            }
            Err(e) => Err(DomainError::internal(e.to_string())),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), DomainError> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::internal(e.to_string())),
        }
    }

    fn retrieval_url(&self, key: &str) -> String {
        format!("file://{}", self.path_for(key).display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_fetch_delete_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsObjectStorage::new(dir.path());

        storage.put("cv.txt", b"Rust engineer").await.unwrap();
        assert_eq!(storage.fetch_text("cv.txt").await.unwrap(), "Rust engineer");

        storage.delete("cv.txt").await.unwrap();
        assert!(matches!(
            storage.fetch_text("cv.txt").await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_object_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsObjectStorage::new(dir.path());
        assert!(matches!(
            storage.fetch_text("nope").await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsObjectStorage::new(dir.path());
        storage.delete("missing").await.unwrap();
    }
}
