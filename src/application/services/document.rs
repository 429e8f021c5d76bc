use std::path::Path;
use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::application::services::RetrievalService;
use crate::domain::{
    ports::{DocumentStore, ObjectStorage, VectorStore},
    Document, DocumentKind, DomainError, IngestionStatus, VectorNamespace,
};

/// Upload-side orchestration: stores document bytes, creates or reuses the
/// record, and runs the synchronous resume summary embedding. Job
/// description embedding goes through the background queue instead and is
/// triggered by the API layer.
pub struct DocumentService {
    documents: Arc<dyn DocumentStore>,
    storage: Arc<dyn ObjectStorage>,
    vector_store: Arc<dyn VectorStore>,
    retrieval: Arc<RetrievalService>,
}

impl DocumentService {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        storage: Arc<dyn ObjectStorage>,
        vector_store: Arc<dyn VectorStore>,
        retrieval: Arc<RetrievalService>,
    ) -> Self {
        Self {
            documents,
            storage,
            vector_store,
            retrieval,
        }
    }

    /// Stores the upload and returns its record together with the decoded
    /// text. Re-uploading the same filename for the same owner overwrites
    /// the stored object and reuses the existing record.
    #[instrument(skip(self, bytes), fields(owner = %owner, ?kind, filename))]
    pub async fn upload(
        &self,
        owner: Uuid,
        kind: DocumentKind,
        filename: &str,
        bytes: &[u8],
        linked_resume_id: Option<Uuid>,
    ) -> Result<(Document, String), DomainError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| DomainError::invalid_input("document is not valid UTF-8 text"))?
            .trim()
            .to_string();
        if text.is_empty() {
            return Err(DomainError::invalid_input("document is empty"));
        }

        let document = match self.documents.find_by_filename(owner, filename).await? {
            Some(mut existing) => {
                tracing::info!(document_id = %existing.id, "replacing existing upload");
                self.storage.put(&existing.storage_key, bytes).await?;
                // A replaced upload restarts the embedding pipeline, so the
                // forward-only transition rule starts over from Uploaded.
                existing.status = IngestionStatus::Uploaded;
                if let Some(resume_id) = linked_resume_id {
                    existing.linked_resume_id = Some(resume_id);
                }
                self.documents.save(&existing).await?;
                existing
            }
            None => {
                let extension = Path::new(filename)
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| format!(".{e}"))
                    .unwrap_or_default();
                let storage_key = format!("{}{extension}", Uuid::new_v4());
                self.storage.put(&storage_key, bytes).await?;

                let mut document = Document::new(owner, kind, filename, storage_key);
                if let Some(resume_id) = linked_resume_id {
                    document = document.with_linked_resume(resume_id);
                }
                self.documents.save(&document).await?;
                document
            }
        };

        Ok((document, text))
    }

    /// Resume path: embed the whole-document summary vector before the
    /// upload call returns.
    #[instrument(skip(self, text), fields(document_id = %document.id))]
    pub async fn embed_resume_summary(
        &self,
        document: &Document,
        text: &str,
    ) -> Result<(), DomainError> {
        self.documents
            .update_status(document.id, IngestionStatus::Processing)
            .await?;

        match self
            .retrieval
            .embed_summary(DocumentKind::Resume, document.id, text)
            .await
        {
            Ok(()) => {
                self.documents
                    .update_status(document.id, IngestionStatus::Embedded)
                    .await
            }
            Err(e) => {
                self.documents
                    .update_status(document.id, IngestionStatus::Error)
                    .await?;
                Err(e)
            }
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Document>, DomainError> {
        self.documents.find(id).await
    }

    pub async fn list(&self, owner: Uuid) -> Result<Vec<Document>, DomainError> {
        self.documents.list_by_owner(owner).await
    }

    pub fn retrieval_url(&self, document: &Document) -> String {
        self.storage.retrieval_url(&document.storage_key)
    }

    /// Removes the record, the stored object, and every vector derived from
    /// the document in both namespaces.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let document = self
            .documents
            .find(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("document {id}")))?;

        self.storage.delete(&document.storage_key).await?;
        self.vector_store
            .delete_by_document(VectorNamespace::Chunks, id)
            .await?;
        self.vector_store
            .delete_by_document(VectorNamespace::Summaries, id)
            .await?;
        self.documents.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::domain::ports::EmbeddingService;
    use crate::domain::Embedding;
    use crate::infrastructure::{
        InMemoryDocumentStore, InMemoryObjectStorage, InMemoryVectorStore,
    };

    struct HistogramEmbedding;

    #[async_trait]
    impl EmbeddingService for HistogramEmbedding {
        async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
            let mut v = vec![0.0f32; 8];
            for b in text.bytes() {
                v[(b as usize) % 8] += 1.0;
            }
            Ok(Embedding::new(v))
        }

        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
            let mut vectors = Vec::with_capacity(texts.len());
            for text in texts {
                vectors.push(self.embed(text).await?);
            }
            Ok(vectors)
        }

        fn dimension(&self) -> usize {
            8
        }
    }

    fn service() -> (
        DocumentService,
        Arc<InMemoryDocumentStore>,
        Arc<InMemoryVectorStore>,
    ) {
        let documents = Arc::new(InMemoryDocumentStore::new());
        let storage = Arc::new(InMemoryObjectStorage::new());
        let vector_store = Arc::new(InMemoryVectorStore::new());
        let retrieval = Arc::new(RetrievalService::new(
            Arc::new(HistogramEmbedding),
            vector_store.clone(),
            50,
            3,
        ));
        (
            DocumentService::new(documents.clone(), storage, vector_store.clone(), retrieval),
            documents,
            vector_store,
        )
    }

    #[tokio::test]
    async fn test_upload_creates_record_and_text() {
        let (svc, documents, _) = service();
        let owner = Uuid::new_v4();

        let (doc, text) = svc
            .upload(owner, DocumentKind::Resume, "cv.txt", b"Rust engineer.", None)
            .await
            .unwrap();
        assert_eq!(text, "Rust engineer.");
        assert_eq!(doc.status, IngestionStatus::Uploaded);
        assert!(documents.find(doc.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_reupload_same_filename_reuses_record() {
        let (svc, documents, _) = service();
        let owner = Uuid::new_v4();

        let (first, _) = svc
            .upload(owner, DocumentKind::Resume, "cv.txt", b"v1", None)
            .await
            .unwrap();
        let (second, text) = svc
            .upload(owner, DocumentKind::Resume, "cv.txt", b"v2 content", None)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(text, "v2 content");
        assert_eq!(documents.list_by_owner(owner).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reupload_resets_status_for_reembedding() {
        let (svc, documents, _) = service();
        let owner = Uuid::new_v4();

        let (doc, text) = svc
            .upload(owner, DocumentKind::Resume, "cv.txt", b"v1", None)
            .await
            .unwrap();
        svc.embed_resume_summary(&doc, &text).await.unwrap();
        assert_eq!(
            documents.find(doc.id).await.unwrap().unwrap().status,
            IngestionStatus::Embedded
        );

        let (again, _) = svc
            .upload(owner, DocumentKind::Resume, "cv.txt", b"v2", None)
            .await
            .unwrap();
        assert_eq!(again.status, IngestionStatus::Uploaded);
        assert_eq!(
            documents.find(doc.id).await.unwrap().unwrap().status,
            IngestionStatus::Uploaded
        );
    }

    #[tokio::test]
    async fn test_non_utf8_upload_rejected() {
        let (svc, _, _) = service();
        let result = svc
            .upload(
                Uuid::new_v4(),
                DocumentKind::Resume,
                "cv.bin",
                &[0xff, 0xfe, 0x00],
                None,
            )
            .await;
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_resume_summary_advances_status() {
        let (svc, documents, vectors) = service();
        let owner = Uuid::new_v4();

        let (doc, text) = svc
            .upload(owner, DocumentKind::Resume, "cv.txt", b"Rust engineer.", None)
            .await
            .unwrap();
        svc.embed_resume_summary(&doc, &text).await.unwrap();

        let stored = documents.find(doc.id).await.unwrap().unwrap();
        assert_eq!(stored.status, IngestionStatus::Embedded);
        assert_eq!(
            vectors.ids(VectorNamespace::Summaries),
            vec![format!("resume-{}", doc.id)]
        );
    }

    #[tokio::test]
    async fn test_delete_removes_record_and_vectors() {
        let (svc, documents, vectors) = service();
        let owner = Uuid::new_v4();

        let (doc, text) = svc
            .upload(owner, DocumentKind::Resume, "cv.txt", b"Rust engineer.", None)
            .await
            .unwrap();
        svc.embed_resume_summary(&doc, &text).await.unwrap();

        svc.delete(doc.id).await.unwrap();
        assert!(documents.find(doc.id).await.unwrap().is_none());
        assert!(vectors.ids(VectorNamespace::Summaries).is_empty());
    }
}
