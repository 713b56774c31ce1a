//! CrewChat server — realtime chat and presence for the employee platform.
//!
//! Entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use crewchat_auth::jwt::decoder::JwtDecoder;
use crewchat_core::config::AppConfig;
use crewchat_core::error::AppError;
use crewchat_database::repositories::group::GroupRepository;
use crewchat_database::repositories::message::MessageRepository;
use crewchat_database::repositories::user::UserRepository;
use crewchat_entity::store::{GroupStore, MessageStore, UserDirectory};
use crewchat_realtime::ChatEngine;
use crewchat_service::{ChatService, GroupService, PresenceService};

#[tokio::main]
async fn main() {
    let env = std::env::var("CREWCHAT_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting CrewChat v{}", env!("CARGO_PKG_VERSION"));

    // ── Database connection + migrations ─────────────────────────
    tracing::info!("Connecting to database...");
    let db = crewchat_database::connection::DatabasePool::connect(&config.database).await?;
    crewchat_database::migration::run_migrations(db.pool()).await?;
    let db_pool = db.into_pool();

    // ── Stores ───────────────────────────────────────────────────
    let messages: Arc<dyn MessageStore> = Arc::new(MessageRepository::new(db_pool.clone()));
    let groups: Arc<dyn GroupStore> = Arc::new(GroupRepository::new(db_pool.clone()));
    let users: Arc<dyn UserDirectory> = Arc::new(UserRepository::new(db_pool.clone()));

    // ── Auth ─────────────────────────────────────────────────────
    let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));

    // ── Realtime engine + background tasks ───────────────────────
    tracing::info!("Initializing chat engine...");
    let engine = ChatEngine::new(
        config.realtime.clone(),
        messages.clone(),
        groups.clone(),
        users.clone(),
    );
    let sweeper_handle = engine.start_typing_sweeper();

    // ── Services ─────────────────────────────────────────────────
    let chat_service = ChatService::new(
        engine.clone(),
        messages.clone(),
        groups.clone(),
        users.clone(),
    );
    let group_service = GroupService::new(engine.clone(), groups.clone(), users.clone());
    let presence_service = PresenceService::new(engine.clone());

    // ── HTTP server ──────────────────────────────────────────────
    let app_state = crewchat_api::state::AppState {
        config: Arc::new(config.clone()),
        db_pool,
        jwt_decoder,
        engine: engine.clone(),
        chat_service,
        group_service,
        presence_service,
    };

    let app = crewchat_api::router::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("CrewChat server listening on {addr}");

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());
    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Graceful teardown ────────────────────────────────────────
    tracing::info!("Shutting down...");
    engine.shutdown().await;
    sweeper_handle.abort();
    tracing::info!("CrewChat server stopped");

    Ok(())
}

/// Resolves when Ctrl+C (or SIGTERM on unix) arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
