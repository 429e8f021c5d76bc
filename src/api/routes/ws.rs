use async_trait::async_trait;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::Response,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::state::AppState;
use crate::application::{ClientChannel, ClientMessage, ServerMessage};
use crate::domain::DomainError;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub document_id: Uuid,
    /// Fallback for clients that cannot set headers on the handshake.
    pub api_key: Option<String>,
}

/// Interview entry point. The credential is verified before the upgrade:
/// a failed handshake never creates a session.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<Response, StatusCode> {
    let credential = headers
        .get("X-API-Key")
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .or(params.api_key)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let principal = state
        .verifier
        .verify(&credential)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let document_id = params.document_id;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, principal, document_id)))
}

async fn handle_socket(socket: WebSocket, state: AppState, principal: Uuid, document_id: Uuid) {
    let connection_id = state.registry.register(principal, document_id);
    tracing::info!(
        connection_id = %connection_id,
        principal = %principal,
        document_id = %document_id,
        "interview connection opened"
    );

    let mut channel = WsChannel { socket };
    match state
        .interview
        .run(principal, document_id, &mut channel)
        .await
    {
        Ok(outcome) => {
            tracing::info!(connection_id = %connection_id, ?outcome, "interview connection finished")
        }
        Err(e) => {
            tracing::warn!(connection_id = %connection_id, error = %e, "interview connection failed")
        }
    }

    let _ = channel.socket.send(Message::Close(None)).await;
    state.registry.deregister(connection_id);
}

struct WsChannel {
    socket: WebSocket,
}

#[async_trait]
impl ClientChannel for WsChannel {
    async fn send(&mut self, message: ServerMessage) -> Result<(), DomainError> {
        let json =
            serde_json::to_string(&message).map_err(|e| DomainError::internal(e.to_string()))?;
        self.socket
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| DomainError::upstream(format!("websocket send: {e}")))
    }

    async fn recv(&mut self) -> Result<Option<ClientMessage>, DomainError> {
        loop {
            match self.socket.recv().await {
                None => return Ok(None),
                // A transport error means the peer is gone.
                Some(Err(_)) => return Ok(None),
                Some(Ok(Message::Close(_))) => return Ok(None),
                Some(Ok(Message::Text(text))) => {
                    return serde_json::from_str(&text)
                        .map(Some)
                        .map_err(|_| DomainError::invalid_input("malformed answer frame"));
                }
                // Pings are answered by axum; ignore everything else.
                Some(Ok(_)) => continue,
            }
        }
    }
}
