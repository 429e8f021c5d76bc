use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::routes::status_for;
use crate::api::state::AppState;
use crate::application::SimilarityReport;

#[derive(Debug, Deserialize)]
pub struct SimilarityRequest {
    pub resume_id: Uuid,
    pub jd_id: Uuid,
}

pub async fn confidence_score(
    State(state): State<AppState>,
    Json(request): Json<SimilarityRequest>,
) -> Result<Json<SimilarityReport>, StatusCode> {
    let report = state
        .similarity
        .compare(request.resume_id, request.jd_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "confidence score failed");
            status_for(&e)
        })?;

    Ok(Json(report))
}
