//! Connection manager — handles connection lifecycle (register, unregister,
//! presence broadcasts).

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crewchat_core::config::realtime::RealtimeConfig;
use crewchat_core::types::{ConnectionId, UserId};

use crate::event::{PresenceStatus, ServerEvent};
use crate::presence::directory::PresenceDirectory;
use crate::room::registry::RoomRegistry;
use crate::typing::relay::TypingRelay;

use super::handle::ConnectionHandle;
use super::pool::ConnectionPool;

/// Manages the lifecycle of realtime connections.
#[derive(Debug)]
pub struct ConnectionManager {
    pool: Arc<ConnectionPool>,
    presence: Arc<PresenceDirectory>,
    rooms: Arc<RoomRegistry>,
    typing: Arc<TypingRelay>,
    config: RealtimeConfig,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(
        config: RealtimeConfig,
        pool: Arc<ConnectionPool>,
        presence: Arc<PresenceDirectory>,
        rooms: Arc<RoomRegistry>,
        typing: Arc<TypingRelay>,
    ) -> Self {
        Self {
            pool,
            presence,
            rooms,
            typing,
            config,
        }
    }

    /// Registers a new authenticated connection.
    ///
    /// Adds the connection, queues the `presence:sync` snapshot on it, and
    /// broadcasts `presence:update(online)` to everyone else when this was
    /// the user's first connection.
    ///
    /// Returns the connection handle and the receiver the transport task
    /// drains onto the socket.
    pub fn register(
        &self,
        user_id: UserId,
        session_id: Uuid,
        username: String,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(self.config.event_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(user_id, session_id, username, tx));

        // Enforce the per-user connection cap by evicting the oldest tab.
        let existing = self.pool.user_connections(&user_id);
        if existing.len() >= self.config.max_connections_per_user {
            if let Some(oldest) = existing.first() {
                warn!(
                    user_id = %user_id,
                    evicted = %oldest.id,
                    max = self.config.max_connections_per_user,
                    "User at max connections, evicting oldest"
                );
                self.unregister(&oldest.id);
            }
        }

        self.pool.add(handle.clone());
        let came_online = self.presence.register(user_id, handle.id);

        handle.send(ServerEvent::PresenceSync {
            online_users: self.presence.snapshot_online_users(),
        });

        if came_online {
            self.pool.broadcast_except(
                handle.id,
                &ServerEvent::PresenceUpdate {
                    user_id,
                    status: PresenceStatus::Online,
                },
            );
        }

        info!(
            conn_id = %handle.id,
            user_id = %user_id,
            session_id = %session_id,
            "Realtime connection registered"
        );

        (handle, rx)
    }

    /// Unregisters a connection and cleans up derived state.
    ///
    /// Broadcasts `presence:update(offline)` exactly once, when this was
    /// the user's last connection.
    pub fn unregister(&self, conn_id: &ConnectionId) {
        let Some(handle) = self.pool.remove(conn_id) else {
            return;
        };
        handle.mark_closed();
        self.rooms.unsubscribe_all(*conn_id);

        if let Some((user_id, went_offline)) = self.presence.deregister(*conn_id) {
            if went_offline {
                self.typing.clear_user(&user_id);
                self.pool.broadcast_all(&ServerEvent::PresenceUpdate {
                    user_id,
                    status: PresenceStatus::Offline,
                });
            }
        }

        info!(
            conn_id = %conn_id,
            user_id = %handle.user_id,
            "Realtime connection unregistered"
        );
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &Arc<ConnectionPool> {
        &self.pool
    }
}
