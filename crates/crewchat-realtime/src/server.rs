//! Top-level chat engine that ties the realtime subsystems together.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, info};

use crewchat_core::config::realtime::RealtimeConfig;
use crewchat_core::types::{GroupId, UserId};
use crewchat_entity::store::{GroupStore, MessageStore, UserDirectory};

use crate::connection::manager::ConnectionManager;
use crate::connection::pool::ConnectionPool;
use crate::event::ServerEvent;
use crate::presence::directory::PresenceDirectory;
use crate::room::registry::RoomRegistry;
use crate::router::ChatRouter;
use crate::typing::relay::{TypingRelay, TypingScope};

/// Central realtime engine coordinating connections, presence, rooms,
/// typing, and message routing.
///
/// Created once at process start and injected into handlers; presence and
/// room state live exactly as long as the engine.
#[derive(Clone)]
pub struct ChatEngine {
    /// Connection pool (fan-out primitive).
    pub pool: Arc<ConnectionPool>,
    /// Presence directory.
    pub presence: Arc<PresenceDirectory>,
    /// Group room registry.
    pub rooms: Arc<RoomRegistry>,
    /// Typing signal relay.
    pub typing: Arc<TypingRelay>,
    /// Connection lifecycle manager.
    pub connections: Arc<ConnectionManager>,
    /// Event router.
    pub router: Arc<ChatRouter>,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
    config: RealtimeConfig,
}

impl std::fmt::Debug for ChatEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatEngine").finish()
    }
}

impl ChatEngine {
    /// Creates a new engine over the given stores.
    pub fn new(
        config: RealtimeConfig,
        messages: Arc<dyn MessageStore>,
        groups: Arc<dyn GroupStore>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let pool = Arc::new(ConnectionPool::new());
        let presence = Arc::new(PresenceDirectory::new());
        let rooms = Arc::new(RoomRegistry::new());
        let typing = Arc::new(TypingRelay::new());

        let connections = Arc::new(ConnectionManager::new(
            config.clone(),
            pool.clone(),
            presence.clone(),
            rooms.clone(),
            typing.clone(),
        ));
        let router = Arc::new(ChatRouter::new(
            pool.clone(),
            rooms.clone(),
            typing.clone(),
            messages,
            groups,
            users,
        ));

        info!("Chat engine initialized");

        Self {
            pool,
            presence,
            rooms,
            typing,
            connections,
            router,
            shutdown_tx,
            config,
        }
    }

    /// Spawns the background task that expires stale typing signals by
    /// emitting the matching stop events.
    pub fn start_typing_sweeper(&self) -> tokio::task::JoinHandle<()> {
        let typing = self.typing.clone();
        let pool = self.pool.clone();
        let rooms = self.rooms.clone();
        let ttl = Duration::from_secs(self.config.typing_ttl_seconds);
        let interval = Duration::from_secs(self.config.typing_sweep_interval_seconds.max(1));
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        for entry in typing.expire_stale(ttl) {
                            debug!(?entry, "Expiring stale typing signal");
                            match entry.scope {
                                TypingScope::Direct { from, to } => {
                                    pool.send_to_user(&to, &ServerEvent::TypingStop { from });
                                }
                                TypingScope::Group { group_id, from } => {
                                    let event = ServerEvent::GroupTypingStop {
                                        group_id,
                                        user_id: from,
                                        user_name: entry.user_name.clone(),
                                    };
                                    for conn_id in rooms.subscribers(&group_id) {
                                        if let Some(handle) = pool.get(&conn_id) {
                                            if handle.user_id != from {
                                                handle.send(event.clone());
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                    _ = shutdown_rx.recv() => break,
                }
            }
        })
    }

    /// Notifies a user's connections that they were added to a group.
    pub fn notify_group_added(&self, user_id: &UserId, group_id: GroupId) {
        self.pool
            .send_to_user(user_id, &ServerEvent::GroupAdded { group_id });
    }

    /// Notifies a user's connections that they were removed from a group
    /// (or that it was deleted) and evicts them from its room mid-session.
    pub fn notify_group_removed(&self, user_id: &UserId, group_id: GroupId) {
        self.rooms.evict_user(group_id, user_id, &self.pool);
        self.pool
            .send_to_user(user_id, &ServerEvent::GroupRemoved { group_id });
    }

    /// Initiates a graceful shutdown: stops background tasks and closes
    /// every connection.
    pub async fn shutdown(&self) {
        info!("Shutting down chat engine");
        let _ = self.shutdown_tx.send(());

        for conn in self.pool.all_connections() {
            self.connections.unregister(&conn.id);
        }

        info!("Chat engine shut down");
    }
}
