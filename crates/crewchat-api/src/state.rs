//! Application state shared across all handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crewchat_auth::jwt::decoder::JwtDecoder;
use crewchat_core::config::AppConfig;
use crewchat_realtime::ChatEngine;
use crewchat_service::{ChatService, GroupService, PresenceService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields clone
/// cheaply (`Arc` or handle types).
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool (health check surface).
    pub db_pool: PgPool,
    /// JWT token decoder and validator.
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Realtime chat engine.
    pub engine: ChatEngine,
    /// Message send/history operations.
    pub chat_service: ChatService,
    /// Group lifecycle and membership operations.
    pub group_service: GroupService,
    /// Presence snapshot queries.
    pub presence_service: PresenceService,
}
