use std::time::Duration;

use async_trait::async_trait;
use qdrant_client::qdrant::{
    vectors_output::VectorsOptions, CollectionStatus, Condition, CreateCollectionBuilder,
    DeletePointsBuilder, Distance, Filter, GetPointsBuilder, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use uuid::Uuid;

use crate::domain::{
    ports::VectorStore, DomainError, Embedding, VectorMatch, VectorMetadata, VectorNamespace,
    VectorRecord,
};

/// Qdrant-backed vector index, one collection per namespace.
///
/// Qdrant point ids are numeric or UUID, so the string record ids from the
/// domain (`{document_id}-chunk-{i}`, `{kind}-{document_id}`) map to
/// deterministic UUIDv5 point ids; the logical id travels in the payload so
/// `fetch` can return it.
pub struct QdrantVectorStore {
    client: Qdrant,
    dimension: usize,
}

impl QdrantVectorStore {
    /// Connects and ensures both collections exist and report ready within
    /// the wait budget. Exhausting the budget is a startup failure, not
    /// something retried per request.
    pub async fn new(
        url: &str,
        dimension: usize,
        ready_checks: u32,
        check_interval: Duration,
    ) -> Result<Self, DomainError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| DomainError::upstream(e.to_string()))?;

        let store = Self { client, dimension };
        for namespace in [VectorNamespace::Chunks, VectorNamespace::Summaries] {
            store
                .ensure_collection(namespace, ready_checks, check_interval)
                .await?;
        }

        Ok(store)
    }

    async fn ensure_collection(
        &self,
        namespace: VectorNamespace,
        ready_checks: u32,
        check_interval: Duration,
    ) -> Result<(), DomainError> {
        let name = namespace.as_str();
        let collections = self
            .client
            .list_collections()
            .await
            .map_err(|e| DomainError::upstream(e.to_string()))?;

        let exists = collections.collections.iter().any(|c| c.name == name);
        if !exists {
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(name).vectors_config(VectorParamsBuilder::new(
                        self.dimension as u64,
                        Distance::Cosine,
                    )),
                )
                .await
                .map_err(|e| DomainError::upstream(e.to_string()))?;
        }

        for _ in 0..ready_checks {
            let info = self
                .client
                .collection_info(name)
                .await
                .map_err(|e| DomainError::upstream(e.to_string()))?;
            let ready = info
                .result
                .map(|r| r.status() == CollectionStatus::Green)
                .unwrap_or(false);
            if ready {
                return Ok(());
            }
            tracing::info!(collection = name, "waiting for collection to be ready");
            tokio::time::sleep(check_interval).await;
        }

        Err(DomainError::upstream(format!(
            "collection {name} did not become ready in time"
        )))
    }

    fn point_id(logical_id: &str) -> String {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, logical_id.as_bytes()).to_string()
    }

    fn payload(record: &VectorRecord) -> Result<Payload, DomainError> {
        serde_json::json!({
            "vector_id": record.id,
            "document_id": record.metadata.document_id.to_string(),
            "text": record.metadata.text,
            "chunk_index": record.metadata.chunk_index,
        })
        .try_into()
        .map_err(|_| DomainError::internal("failed to build point payload"))
    }

    fn metadata_from_payload(
        payload: &std::collections::HashMap<String, qdrant_client::qdrant::Value>,
    ) -> Option<(String, VectorMetadata)> {
        let vector_id = payload.get("vector_id")?.as_str()?.to_string();
        let document_id: Uuid = payload.get("document_id")?.as_str()?.parse().ok()?;
        let text = payload.get("text")?.as_str()?.to_string();
        let chunk_index = payload
            .get("chunk_index")
            .and_then(|v| v.as_integer())
            .map(|i| i as usize);

        Some((
            vector_id,
            VectorMetadata {
                document_id,
                text,
                chunk_index,
            },
        ))
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn upsert(
        &self,
        namespace: VectorNamespace,
        records: Vec<VectorRecord>,
    ) -> Result<(), DomainError> {
        if records.is_empty() {
            return Ok(());
        }

        let points: Vec<PointStruct> = records
            .iter()
            .map(|record| {
                Ok(PointStruct::new(
                    Self::point_id(&record.id),
                    record.vector.as_slice().to_vec(),
                    Self::payload(record)?,
                ))
            })
            .collect::<Result<_, DomainError>>()?;

        self.client
            .upsert_points(UpsertPointsBuilder::new(namespace.as_str(), points))
            .await
            .map_err(|e| DomainError::upstream(e.to_string()))?;

        Ok(())
    }

    async fn query(
        &self,
        namespace: VectorNamespace,
        vector: &Embedding,
        top_k: usize,
        document_id: Option<Uuid>,
    ) -> Result<Vec<VectorMatch>, DomainError> {
        let mut search = SearchPointsBuilder::new(
            namespace.as_str(),
            vector.as_slice().to_vec(),
            top_k as u64,
        )
        .with_payload(true);

        if let Some(document_id) = document_id {
            search = search.filter(Filter::must([Condition::matches(
                "document_id",
                document_id.to_string(),
            )]));
        }

        let results = self
            .client
            .search_points(search)
            .await
            .map_err(|e| DomainError::upstream(e.to_string()))?;

        Ok(results
            .result
            .into_iter()
            .filter_map(|point| {
                let (id, metadata) = Self::metadata_from_payload(&point.payload)?;
                Some(VectorMatch {
                    id,
                    score: point.score,
                    metadata,
                })
            })
            .collect())
    }

    async fn fetch(
        &self,
        namespace: VectorNamespace,
        id: &str,
    ) -> Result<Option<VectorRecord>, DomainError> {
        let response = self
            .client
            .get_points(
                GetPointsBuilder::new(namespace.as_str(), vec![Self::point_id(id).into()])
                    .with_payload(true)
                    .with_vectors(true),
            )
            .await
            .map_err(|e| DomainError::upstream(e.to_string()))?;

        let Some(point) = response.result.into_iter().next() else {
            return Ok(None);
        };

        let Some((logical_id, metadata)) = Self::metadata_from_payload(&point.payload) else {
            return Ok(None);
        };

        let data = point
            .vectors
            .and_then(|v| v.vectors_options)
            .and_then(|options| match options {
                VectorsOptions::Vector(vector) => Some(vector.data),
                VectorsOptions::Vectors(_) => None,
            })
            .ok_or_else(|| DomainError::internal("point returned without vector data"))?;

        Ok(Some(VectorRecord {
            id: logical_id,
            vector: Embedding::new(data),
            metadata,
        }))
    }

    async fn delete_by_document(
        &self,
        namespace: VectorNamespace,
        document_id: Uuid,
    ) -> Result<(), DomainError> {
        let filter = Filter::must([Condition::matches(
            "document_id",
            document_id.to_string(),
        )]);

        self.client
            .delete_points(DeletePointsBuilder::new(namespace.as_str()).points(filter))
            .await
            .map_err(|e| DomainError::upstream(e.to_string()))?;

        Ok(())
    }
}
