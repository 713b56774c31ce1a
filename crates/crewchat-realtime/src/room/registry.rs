//! Room registry — tracks which connections have a group conversation open.
//!
//! Message fan-out does NOT use rooms: group messages go to every current
//! member's connections, read from the group store at send time. Rooms
//! scope the ephemeral traffic (typing indicators) to connections that
//! actually have the group chat open, and are evicted server-side when a
//! member is removed mid-session.

use std::collections::HashSet;

use dashmap::DashMap;

use crewchat_core::types::{ConnectionId, GroupId, UserId};

use crate::connection::pool::ConnectionPool;

/// Registry of group-room subscriptions.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    /// Group → subscribed connection ids.
    rooms: DashMap<GroupId, HashSet<ConnectionId>>,
    /// Reverse index for cleanup on disconnect.
    by_conn: DashMap<ConnectionId, HashSet<GroupId>>,
}

impl RoomRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a connection to a group room.
    pub fn subscribe(&self, group_id: GroupId, conn_id: ConnectionId) {
        self.rooms.entry(group_id).or_default().insert(conn_id);
        self.by_conn.entry(conn_id).or_default().insert(group_id);
    }

    /// Unsubscribes a connection from a group room.
    pub fn unsubscribe(&self, group_id: GroupId, conn_id: ConnectionId) {
        if let Some(mut room) = self.rooms.get_mut(&group_id) {
            room.remove(&conn_id);
            if room.is_empty() {
                drop(room);
                self.rooms.remove_if(&group_id, |_, set| set.is_empty());
            }
        }
        if let Some(mut groups) = self.by_conn.get_mut(&conn_id) {
            groups.remove(&group_id);
        }
    }

    /// Unsubscribes a connection from every room (disconnect path).
    pub fn unsubscribe_all(&self, conn_id: ConnectionId) {
        let groups = self
            .by_conn
            .remove(&conn_id)
            .map(|(_, set)| set)
            .unwrap_or_default();
        for group_id in groups {
            if let Some(mut room) = self.rooms.get_mut(&group_id) {
                room.remove(&conn_id);
                if room.is_empty() {
                    drop(room);
                    self.rooms.remove_if(&group_id, |_, set| set.is_empty());
                }
            }
        }
    }

    /// Evicts every connection a user owns from a group room. Used when
    /// a member is removed (or leaves) mid-session.
    pub fn evict_user(&self, group_id: GroupId, user_id: &UserId, pool: &ConnectionPool) {
        for conn in pool.user_connections(user_id) {
            self.unsubscribe(group_id, conn.id);
        }
    }

    /// Subscriber connection ids for a group room.
    pub fn subscribers(&self, group_id: &GroupId) -> Vec<ConnectionId> {
        self.rooms
            .get(group_id)
            .map(|room| room.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of active rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
