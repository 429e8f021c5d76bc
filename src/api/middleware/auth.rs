use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::api::state::AppState;

/// Principal resolved from the request credential, injected into request
/// extensions for handlers.
#[derive(Debug, Clone, Copy)]
pub struct Principal(pub Uuid);

pub async fn require_api_key(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let credential = request
        .headers()
        .get("X-API-Key")
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let principal = state
        .verifier
        .verify(credential)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(Principal(principal));
    Ok(next.run(request).await)
}
