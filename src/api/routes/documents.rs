use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::api::middleware::Principal;
use crate::api::routes::status_for;
use crate::api::state::AppState;
use crate::domain::{Document, DocumentKind, DomainError, IngestionStatus};
use crate::infrastructure::EmbedJdJob;

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub kind: DocumentKind,
    pub filename: String,
    pub status: IngestionStatus,
    pub linked_resume_id: Option<Uuid>,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieval_url: Option<String>,
}

impl DocumentResponse {
    fn from_document(doc: Document) -> Self {
        Self {
            id: doc.id,
            kind: doc.kind,
            filename: doc.filename,
            status: doc.status,
            linked_resume_id: doc.linked_resume_id,
            uploaded_at: doc.uploaded_at,
            retrieval_url: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    #[serde(flatten)]
    pub document: DocumentResponse,
    /// Present only for the asynchronous job-description path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<Uuid>,
}

struct UploadForm {
    filename: String,
    bytes: Vec<u8>,
    kind: DocumentKind,
    resume_id: Option<Uuid>,
}

async fn read_upload(mut multipart: Multipart) -> Result<UploadForm, DomainError> {
    let mut filename = None;
    let mut bytes = None;
    let mut kind = None;
    let mut resume_id = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| DomainError::invalid_input(e.to_string()))?
    {
        match field.name() {
            Some("file") => {
                filename = field.file_name().map(String::from);
                bytes = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| DomainError::invalid_input(e.to_string()))?
                        .to_vec(),
                );
            }
            Some("kind") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| DomainError::invalid_input(e.to_string()))?;
                kind = Some(value.parse().map_err(DomainError::InvalidInput)?);
            }
            Some("resume_id") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| DomainError::invalid_input(e.to_string()))?;
                resume_id = Some(
                    value
                        .parse()
                        .map_err(|_| DomainError::invalid_input("resume_id is not a uuid"))?,
                );
            }
            _ => {}
        }
    }

    Ok(UploadForm {
        filename: filename.ok_or_else(|| DomainError::invalid_input("missing file name"))?,
        bytes: bytes.ok_or_else(|| DomainError::invalid_input("missing file field"))?,
        kind: kind.ok_or_else(|| DomainError::invalid_input("missing kind field"))?,
        resume_id,
    })
}

pub async fn upload_document(
    State(state): State<AppState>,
    Extension(Principal(principal)): Extension<Principal>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), StatusCode> {
    let form = read_upload(multipart).await.map_err(|e| status_for(&e))?;

    if form.kind == DocumentKind::JobDescription && form.resume_id.is_none() {
        tracing::warn!("job description upload without resume_id");
        return Err(StatusCode::BAD_REQUEST);
    }

    let (document, text) = state
        .documents
        .upload(
            principal,
            form.kind,
            &form.filename,
            &form.bytes,
            form.resume_id,
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "upload failed");
            status_for(&e)
        })?;

    let job_id = match form.kind {
        DocumentKind::Resume => {
            state
                .documents
                .embed_resume_summary(&document, &text)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "resume embedding failed");
                    status_for(&e)
                })?;
            None
        }
        DocumentKind::JobDescription => {
            let job = EmbedJdJob::new(document.id, text);
            let job_id = state.job_producer.push_embed_job(&job).await.map_err(|e| {
                tracing::error!(error = %e, "failed to queue embed job");
                StatusCode::INTERNAL_SERVER_ERROR
            })?;
            Some(job_id)
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            document: DocumentResponse::from_document(document),
            job_id,
        }),
    ))
}

pub async fn list_documents(
    State(state): State<AppState>,
    Extension(Principal(principal)): Extension<Principal>,
) -> Result<Json<Vec<DocumentResponse>>, StatusCode> {
    let documents = state.documents.list(principal).await.map_err(|e| {
        tracing::error!(error = %e, "failed to list documents");
        status_for(&e)
    })?;

    Ok(Json(
        documents
            .into_iter()
            .map(DocumentResponse::from_document)
            .collect(),
    ))
}

pub async fn get_document(
    State(state): State<AppState>,
    Extension(Principal(principal)): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentResponse>, StatusCode> {
    let document = state
        .documents
        .get(id)
        .await
        .map_err(|e| status_for(&e))?
        .filter(|d| d.owner == principal)
        .ok_or(StatusCode::NOT_FOUND)?;

    let retrieval_url = state.documents.retrieval_url(&document);
    let mut response = DocumentResponse::from_document(document);
    response.retrieval_url = Some(retrieval_url);
    Ok(Json(response))
}

pub async fn delete_document(
    State(state): State<AppState>,
    Extension(Principal(principal)): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    let document = state
        .documents
        .get(id)
        .await
        .map_err(|e| status_for(&e))?
        .filter(|d| d.owner == principal)
        .ok_or(StatusCode::NOT_FOUND)?;

    state.documents.delete(document.id).await.map_err(|e| {
        tracing::error!(error = %e, "failed to delete document");
        status_for(&e)
    })?;
    Ok(StatusCode::NO_CONTENT)
}
