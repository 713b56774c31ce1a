//! WebSocket upgrade handler — the realtime channel's transport.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{info, warn};

use crewchat_auth::jwt::claims::Claims;
use crewchat_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for WebSocket authentication. Browsers cannot set
/// headers on the upgrade request, so the token rides the query string.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// JWT access token.
    pub token: String,
}

/// GET /ws?token={jwt} — WebSocket upgrade.
///
/// Authentication happens *before* the upgrade: a bad token yields a
/// plain HTTP 401 and no connection is ever registered.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
) -> Result<Response, ApiError> {
    let claims = state.jwt_decoder.decode(&query.token)?;
    if claims.is_expired() {
        return Err(AppError::authentication("Token expired").into());
    }

    Ok(ws.on_upgrade(move |socket| handle_ws_connection(state, claims, socket)))
}

/// Runs one established WebSocket connection until it closes.
async fn handle_ws_connection(state: AppState, claims: Claims, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (handle, mut outbound_rx) = state.engine.connections.register(
        claims.user_id(),
        claims.session_id(),
        claims.username.clone(),
    );
    let conn_id = handle.id;

    info!(conn_id = %conn_id, user_id = %handle.user_id, "WebSocket connection established");

    // Outbound: drain the connection's event queue onto the socket.
    let outbound_task = tokio::spawn(async move {
        while let Some(event) = outbound_rx.recv().await {
            let payload = match serde_json::to_string(&event) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(error = %e, "Failed to serialize outbound event");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    // Inbound: feed text frames to the router until close or error.
    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Text(text)) => {
                state.engine.router.handle_text(&handle, &text).await;
            }
            Ok(Message::Close(_)) => break,
            // Ping/pong is answered by axum itself.
            Ok(_) => {}
            Err(e) => {
                warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    outbound_task.abort();
    state.engine.connections.unregister(&conn_id);

    info!(conn_id = %conn_id, "WebSocket connection closed");
}
