//! Route definitions for the CrewChat HTTP API.
//!
//! REST routes are mounted under `/api`; the WebSocket upgrade lives at
//! `/ws`. The router receives `AppState` and threads it through every
//! handler via Axum's `State` extractor.

use axum::http::{HeaderName, HeaderValue, Method};
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(message_routes())
        .merge(group_routes())
        .merge(presence_routes())
        .merge(health_routes());

    let ws_routes = Router::new().route("/ws", get(handlers::ws::ws_upgrade));

    let cors = build_cors_layer(&state);

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Direct-message send and history.
fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/messages", post(handlers::message::send_message))
        .route("/messages/{peer_id}", get(handlers::message::direct_history))
}

/// Group CRUD, membership, and group messages.
fn group_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/groups",
            post(handlers::group::create_group).get(handlers::group::list_groups),
        )
        .route(
            "/groups/{id}",
            get(handlers::group::get_group).delete(handlers::group::delete_group),
        )
        .route("/groups/{id}/members", post(handlers::group::add_members))
        .route(
            "/groups/{id}/members/{user_id}",
            delete(handlers::group::remove_member),
        )
        .route(
            "/groups/{id}/members/{user_id}/role",
            put(handlers::group::update_member_role),
        )
        .route("/groups/{id}/leave", post(handlers::group::leave_group))
        .route(
            "/groups/{id}/messages",
            post(handlers::group::send_group_message).get(handlers::group::group_history),
        )
}

/// Presence polling fallback.
fn presence_routes() -> Router<AppState> {
    Router::new().route("/presence", get(handlers::presence::presence))
}

/// Health probe.
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Builds the CORS layer from configuration. An origin list of `["*"]`
/// allows any origin.
fn build_cors_layer(state: &AppState) -> CorsLayer {
    let cors_config = &state.config.server.cors;

    let origins = if cors_config.allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            cors_config
                .allowed_origins
                .iter()
                .filter_map(|o| o.parse::<HeaderValue>().ok()),
        )
    };

    let methods: Vec<Method> = cors_config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();

    let headers: Vec<HeaderName> = cors_config
        .allowed_headers
        .iter()
        .filter_map(|h| h.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
}
