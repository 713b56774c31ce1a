//! Presence polling fallback.

use axum::extract::State;
use axum::Json;

use crewchat_service::presence::PresenceSnapshot;

use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/presence — who is online right now.
pub async fn presence(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<PresenceSnapshot>, ApiError> {
    Ok(Json(state.presence_service.snapshot()))
}
