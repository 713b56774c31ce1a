//! Direct-message fallback handlers.
//!
//! These mirror the socket's `message` event exactly: same validation,
//! same canonical response shape, and the send still fans out to any
//! connected recipients.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use validator::Validate;

use crewchat_core::types::UserId;
use crewchat_entity::message::DirectMessage;

use crate::dto::request::SendMessageRequest;
use crate::dto::response::DirectHistoryResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/messages — send a direct message over HTTP.
pub async fn send_message(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<DirectMessage>), ApiError> {
    req.validate()?;
    let message = state
        .chat_service
        .send_direct(&user, req.to, &req.text, req.client_message_id)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /api/messages/{peer_id} — conversation history with a peer.
pub async fn direct_history(
    State(state): State<AppState>,
    user: AuthUser,
    Path(peer_id): Path<UserId>,
) -> Result<Json<DirectHistoryResponse>, ApiError> {
    let messages = state.chat_service.direct_history(&user, peer_id).await?;
    Ok(Json(DirectHistoryResponse { messages }))
}
