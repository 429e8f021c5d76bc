use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::api::middleware::Principal;
use crate::api::routes::status_for;
use crate::api::state::AppState;
use crate::domain::{InterviewSession, QuestionRecord, SessionStatus};

#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub score: f32,
    pub status: SessionStatus,
    pub questions: usize,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<&InterviewSession> for SessionSummary {
    fn from(session: &InterviewSession) -> Self {
        Self {
            id: session.id,
            score: session.score,
            status: session.status,
            questions: session.questions.len(),
            started_at: session.started_at,
            completed_at: session.completed_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DocumentSessions {
    pub document_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    pub sessions: Vec<SessionSummary>,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub id: Uuid,
    pub document_id: Uuid,
    pub status: SessionStatus,
    pub score: f32,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub questions: Vec<QuestionRecord>,
}

/// Completed sessions grouped by the document they interviewed against.
pub async fn list_interviews(
    State(state): State<AppState>,
    Extension(Principal(principal)): Extension<Principal>,
) -> Result<Json<Vec<DocumentSessions>>, StatusCode> {
    let sessions = state
        .sessions
        .list_completed_by_owner(principal)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to list sessions");
            status_for(&e)
        })?;

    let mut grouped: BTreeMap<Uuid, Vec<SessionSummary>> = BTreeMap::new();
    for session in &sessions {
        grouped
            .entry(session.document_id)
            .or_default()
            .push(session.into());
    }

    let mut response = Vec::with_capacity(grouped.len());
    for (document_id, sessions) in grouped {
        let filename = state
            .documents
            .get(document_id)
            .await
            .ok()
            .flatten()
            .map(|d| d.filename);
        response.push(DocumentSessions {
            document_id,
            filename,
            sessions,
        });
    }

    Ok(Json(response))
}

pub async fn get_interview(
    State(state): State<AppState>,
    Extension(Principal(principal)): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<TranscriptResponse>, StatusCode> {
    let session = state
        .sessions
        .find(id)
        .await
        .map_err(|e| status_for(&e))?
        .filter(|s| s.owner == principal)
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(TranscriptResponse {
        id: session.id,
        document_id: session.document_id,
        status: session.status,
        score: session.score,
        started_at: session.started_at,
        completed_at: session.completed_at,
        questions: session.questions,
    }))
}

pub async fn delete_interview(
    State(state): State<AppState>,
    Extension(Principal(principal)): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    let session = state
        .sessions
        .find(id)
        .await
        .map_err(|e| status_for(&e))?
        .filter(|s| s.owner == principal)
        .ok_or(StatusCode::NOT_FOUND)?;

    state.sessions.delete(session.id).await.map_err(|e| {
        tracing::error!(error = %e, "failed to delete session");
        status_for(&e)
    })?;
    Ok(StatusCode::NO_CONTENT)
}
