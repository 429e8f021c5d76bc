pub mod documents;
pub mod health;
pub mod interviews;
pub mod jobs;
pub mod similarity;
pub mod ws;

use axum::http::{header, Method, StatusCode};
use axum::{routing::get, routing::post, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::middleware;
use crate::api::state::AppState;
use crate::domain::DomainError;

/// HTTP mapping of the domain error taxonomy.
pub(crate) fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::AuthFailure(_) => StatusCode::UNAUTHORIZED,
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::InvalidInput(_) | DomainError::DimensionMismatch(_, _) => {
            StatusCode::BAD_REQUEST
        }
        DomainError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
        DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_origin(Any);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/ws", get(ws::ws_handler))
        .nest("/api/v1", api_v1_routes(state.clone()))
        .layer(axum::middleware::from_fn(middleware::request_logger))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn api_v1_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/documents", post(documents::upload_document))
        .route("/documents", get(documents::list_documents))
        .route("/documents/{id}", get(documents::get_document))
        .route(
            "/documents/{id}",
            axum::routing::delete(documents::delete_document),
        )
        .route("/jobs/{job_id}", get(jobs::get_job_status))
        .route("/similarity", post(similarity::confidence_score))
        .route("/interviews", get(interviews::list_interviews))
        .route("/interviews/{id}", get(interviews::get_interview))
        .route(
            "/interviews/{id}",
            axum::routing::delete(interviews::delete_interview),
        )
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::require_api_key,
        ))
}
