//! Presence directory — the authoritative userId → live connections map.
//!
//! Presence is process-wide, in-memory, and rebuilt empty on restart.
//! Invariant: a user is online iff their connection count > 0. Horizontal
//! scaling would need an external shared store behind this interface; the
//! single-process directory is the deployment model here.

use std::collections::HashSet;

use dashmap::DashMap;

use crewchat_core::types::{ConnectionId, UserId};

/// Tracks which users currently hold at least one open connection.
#[derive(Debug, Default)]
pub struct PresenceDirectory {
    /// User ID → set of live connection ids.
    connections: DashMap<UserId, HashSet<ConnectionId>>,
    /// Reverse index so deregister only needs the connection id.
    owners: DashMap<ConnectionId, UserId>,
}

impl PresenceDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection. Returns `true` when this was the user's
    /// first connection, i.e. the user just came online.
    pub fn register(&self, user_id: UserId, conn_id: ConnectionId) -> bool {
        self.owners.insert(conn_id, user_id);
        let mut entry = self.connections.entry(user_id).or_default();
        let was_offline = entry.is_empty();
        entry.insert(conn_id);
        was_offline
    }

    /// Deregister a connection, looking up the owning user.
    ///
    /// Returns `Some((user_id, went_offline))` when the connection was
    /// registered; `went_offline` is `true` exactly when this was the
    /// user's last connection.
    pub fn deregister(&self, conn_id: ConnectionId) -> Option<(UserId, bool)> {
        let (_, user_id) = self.owners.remove(&conn_id)?;
        let went_offline = match self.connections.get_mut(&user_id) {
            Some(mut entry) => {
                entry.remove(&conn_id);
                let empty = entry.is_empty();
                if empty {
                    drop(entry);
                    self.connections.remove_if(&user_id, |_, set| set.is_empty());
                }
                empty
            }
            None => false,
        };
        Some((user_id, went_offline))
    }

    /// Whether the user has at least one live connection.
    pub fn is_online(&self, user_id: &UserId) -> bool {
        self.connection_count(user_id) > 0
    }

    /// Number of live connections the user currently holds.
    pub fn connection_count(&self, user_id: &UserId) -> usize {
        self.connections
            .get(user_id)
            .map(|entry| entry.len())
            .unwrap_or(0)
    }

    /// Snapshot of every online user.
    pub fn snapshot_online_users(&self) -> Vec<UserId> {
        self.connections
            .iter()
            .filter(|entry| !entry.value().is_empty())
            .map(|entry| *entry.key())
            .collect()
    }

    /// Total number of online users.
    pub fn online_count(&self) -> usize {
        self.connections.len()
    }
}
