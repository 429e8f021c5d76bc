use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::api::state::AppState;
use crate::infrastructure::QueueJobStatus;

#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job_id: Uuid,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobStatusResponse>, (StatusCode, Json<JobStatusResponse>)> {
    let record = state
        .job_producer
        .get_job_status(&job_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to get job status");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(JobStatusResponse {
                    job_id,
                    status: "error".to_string(),
                    error: Some(e.to_string()),
                }),
            )
        })?;

    match record {
        Some(record) => Ok(Json(JobStatusResponse {
            job_id,
            status: match record.status {
                QueueJobStatus::Queued => "queued",
                QueueJobStatus::Active => "active",
                QueueJobStatus::Completed => "completed",
                QueueJobStatus::Failed => "failed",
            }
            .to_string(),
            error: record.error,
        })),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(JobStatusResponse {
                job_id,
                status: "not_found".to_string(),
                error: None,
            }),
        )),
    }
}
