use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    ports::VectorStore, DomainError, Embedding, VectorMatch, VectorNamespace, VectorRecord,
};

/// Namespaced in-memory vector index for tests and local development.
pub struct InMemoryVectorStore {
    namespaces: RwLock<HashMap<VectorNamespace, Vec<VectorRecord>>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            namespaces: RwLock::new(HashMap::new()),
        }
    }

    /// Every record id currently held in `namespace`, for assertions.
    pub fn ids(&self, namespace: VectorNamespace) -> Vec<String> {
        let namespaces = self.namespaces.read().expect("store lock poisoned");
        namespaces
            .get(&namespace)
            .map(|records| records.iter().map(|r| r.id.clone()).collect())
            .unwrap_or_default()
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(
        &self,
        namespace: VectorNamespace,
        records: Vec<VectorRecord>,
    ) -> Result<(), DomainError> {
        let mut namespaces = self
            .namespaces
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        let store = namespaces.entry(namespace).or_default();

        for record in records {
            store.retain(|r| r.id != record.id);
            store.push(record);
        }
        Ok(())
    }

    async fn query(
        &self,
        namespace: VectorNamespace,
        vector: &Embedding,
        top_k: usize,
        document_id: Option<Uuid>,
    ) -> Result<Vec<VectorMatch>, DomainError> {
        let namespaces = self
            .namespaces
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        let Some(store) = namespaces.get(&namespace) else {
            return Ok(Vec::new());
        };

        let mut matches: Vec<VectorMatch> = store
            .iter()
            .filter(|r| document_id.map_or(true, |id| r.metadata.document_id == id))
            .map(|r| {
                let score = vector.cosine_similarity(&r.vector)?;
                Ok(VectorMatch {
                    id: r.id.clone(),
                    score,
                    metadata: r.metadata.clone(),
                })
            })
            .collect::<Result<_, DomainError>>()?;

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(top_k);
        Ok(matches)
    }

    async fn fetch(
        &self,
        namespace: VectorNamespace,
        id: &str,
    ) -> Result<Option<VectorRecord>, DomainError> {
        let namespaces = self
            .namespaces
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        Ok(namespaces
            .get(&namespace)
            .and_then(|store| store.iter().find(|r| r.id == id).cloned()))
    }

    async fn delete_by_document(
        &self,
        namespace: VectorNamespace,
        document_id: Uuid,
    ) -> Result<(), DomainError> {
        let mut namespaces = self
            .namespaces
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        if let Some(store) = namespaces.get_mut(&namespace) {
            store.retain(|r| r.metadata.document_id != document_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(document_id: Uuid, index: usize, text: &str, vector: Vec<f32>) -> VectorRecord {
        VectorRecord::chunk(document_id, index, text.to_string(), Embedding::new(vector))
    }

    #[tokio::test]
    async fn test_upsert_and_query() {
        let store = InMemoryVectorStore::new();
        let doc = Uuid::new_v4();

        store
            .upsert(
                VectorNamespace::Chunks,
                vec![record(doc, 0, "rust", vec![1.0, 0.0, 0.0])],
            )
            .await
            .unwrap();

        let results = store
            .query(
                VectorNamespace::Chunks,
                &Embedding::new(vec![1.0, 0.0, 0.0]),
                1,
                None,
            )
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert!((results[0].score - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let store = InMemoryVectorStore::new();
        let doc = Uuid::new_v4();

        store
            .upsert(
                VectorNamespace::Chunks,
                vec![record(doc, 0, "old", vec![1.0, 0.0])],
            )
            .await
            .unwrap();
        store
            .upsert(
                VectorNamespace::Chunks,
                vec![record(doc, 0, "new", vec![0.0, 1.0])],
            )
            .await
            .unwrap();

        assert_eq!(store.ids(VectorNamespace::Chunks).len(), 1);
        let fetched = store
            .fetch(VectorNamespace::Chunks, &format!("{doc}-chunk-0"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.metadata.text, "new");
    }

    #[tokio::test]
    async fn test_namespaces_are_isolated() {
        let store = InMemoryVectorStore::new();
        let doc = Uuid::new_v4();

        store
            .upsert(
                VectorNamespace::Chunks,
                vec![record(doc, 0, "chunk", vec![1.0])],
            )
            .await
            .unwrap();

        let results = store
            .query(VectorNamespace::Summaries, &Embedding::new(vec![1.0]), 5, None)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_query_filters_by_document() {
        let store = InMemoryVectorStore::new();
        let doc_a = Uuid::new_v4();
        let doc_b = Uuid::new_v4();

        store
            .upsert(
                VectorNamespace::Chunks,
                vec![
                    record(doc_a, 0, "a", vec![1.0, 0.0]),
                    record(doc_b, 0, "b", vec![1.0, 0.0]),
                ],
            )
            .await
            .unwrap();

        let results = store
            .query(
                VectorNamespace::Chunks,
                &Embedding::new(vec![1.0, 0.0]),
                10,
                Some(doc_a),
            )
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metadata.document_id, doc_a);
    }

    #[tokio::test]
    async fn test_delete_by_document() {
        let store = InMemoryVectorStore::new();
        let doc = Uuid::new_v4();

        store
            .upsert(
                VectorNamespace::Chunks,
                vec![
                    record(doc, 0, "one", vec![1.0]),
                    record(doc, 1, "two", vec![1.0]),
                ],
            )
            .await
            .unwrap();
        store
            .delete_by_document(VectorNamespace::Chunks, doc)
            .await
            .unwrap();

        assert!(store.ids(VectorNamespace::Chunks).is_empty());
    }
}
