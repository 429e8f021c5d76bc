use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::domain::{
    chunker::split_into_chunks,
    ports::{EmbeddingService, VectorStore},
    DocumentKind, DomainError, VectorNamespace, VectorRecord,
};

/// Grounds interview questions in the candidate's own document: ingestion
/// chunk-embeds a document into the chunk namespace, retrieval answers a
/// natural-language query with the top-k chunks of that document only.
pub struct RetrievalService {
    embedding: Arc<dyn EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
    chunk_max_tokens: usize,
    top_k: usize,
}

impl RetrievalService {
    pub fn new(
        embedding: Arc<dyn EmbeddingService>,
        vector_store: Arc<dyn VectorStore>,
        chunk_max_tokens: usize,
        top_k: usize,
    ) -> Self {
        Self {
            embedding,
            vector_store,
            chunk_max_tokens,
            top_k,
        }
    }

    /// Concatenated top-k chunk texts for `document_id`, ranked, joined with
    /// blank lines. An empty string means "no context available" and is not
    /// an error.
    #[instrument(skip(self, query))]
    pub async fn relevant_context(
        &self,
        document_id: Uuid,
        query: &str,
    ) -> Result<String, DomainError> {
        let query_vector = self.embedding.embed(query).await?;
        let matches = self
            .vector_store
            .query(
                VectorNamespace::Chunks,
                &query_vector,
                self.top_k,
                Some(document_id),
            )
            .await?;

        Ok(matches
            .into_iter()
            .map(|m| m.metadata.text)
            .collect::<Vec<_>>()
            .join("\n\n"))
    }

    /// Chunks and embeds `full_text` under `document_id`. Idempotent: the
    /// document's previous chunk vectors are deleted first, so a re-ingestion
    /// with fewer chunks leaves no orphaned higher-index ids behind.
    #[instrument(skip(self, full_text), fields(bytes = full_text.len()))]
    pub async fn ingest(&self, document_id: Uuid, full_text: &str) -> Result<usize, DomainError> {
        let chunks = split_into_chunks(full_text, self.chunk_max_tokens)?;
        tracing::debug!(document_id = %document_id, chunks = chunks.len(), "chunked document");

        let texts: Vec<&str> = chunks.iter().map(String::as_str).collect();
        let vectors = self.embedding.embed_batch(&texts).await?;
        if vectors.len() != chunks.len() {
            return Err(DomainError::internal(format!(
                "embedding batch returned {} vectors for {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }

        let records: Vec<VectorRecord> = chunks
            .into_iter()
            .zip(vectors)
            .enumerate()
            .map(|(index, (chunk, vector))| VectorRecord::chunk(document_id, index, chunk, vector))
            .collect();

        self.vector_store
            .delete_by_document(VectorNamespace::Chunks, document_id)
            .await?;
        let count = records.len();
        self.vector_store
            .upsert(VectorNamespace::Chunks, records)
            .await?;

        Ok(count)
    }

    /// Embeds the whole document once and upserts a single summary vector
    /// keyed by `{kind}-{document_id}`, raw text in metadata. Safe under
    /// duplicate delivery: the id-keyed upsert overwrites.
    #[instrument(skip(self, full_text))]
    pub async fn embed_summary(
        &self,
        kind: DocumentKind,
        document_id: Uuid,
        full_text: &str,
    ) -> Result<(), DomainError> {
        let vector = self.embedding.embed(full_text).await?;
        let record = VectorRecord::summary(
            kind.summary_vector_id(document_id),
            document_id,
            full_text.to_string(),
            vector,
        );

        self.vector_store
            .upsert(VectorNamespace::Summaries, vec![record])
            .await
    }
}
