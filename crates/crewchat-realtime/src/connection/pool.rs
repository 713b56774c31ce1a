//! Connection pool — tracks all active connections indexed by user ID.

use std::sync::Arc;

use dashmap::DashMap;

use crewchat_core::types::{ConnectionId, UserId};

use crate::event::ServerEvent;

use super::handle::ConnectionHandle;

/// Thread-safe pool of all active realtime connections.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    /// User ID → connection handles (one user can have multiple tabs).
    by_user: DashMap<UserId, Vec<Arc<ConnectionHandle>>>,
    /// Connection ID → connection handle for direct lookup.
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl ConnectionPool {
    /// Creates a new empty connection pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to the pool.
    pub fn add(&self, handle: Arc<ConnectionHandle>) {
        self.by_id.insert(handle.id, handle.clone());
        self.by_user.entry(handle.user_id).or_default().push(handle);
    }

    /// Removes a connection from the pool.
    pub fn remove(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        let (_, handle) = self.by_id.remove(conn_id)?;
        if let Some(mut connections) = self.by_user.get_mut(&handle.user_id) {
            connections.retain(|c| c.id != *conn_id);
            if connections.is_empty() {
                drop(connections);
                self.by_user.remove(&handle.user_id);
            }
        }
        Some(handle)
    }

    /// Gets a specific connection by ID.
    pub fn get(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.get(conn_id).map(|entry| entry.value().clone())
    }

    /// Gets all connections for a user.
    pub fn user_connections(&self, user_id: &UserId) -> Vec<Arc<ConnectionHandle>> {
        self.by_user
            .get(user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Returns all connection handles.
    pub fn all_connections(&self) -> Vec<Arc<ConnectionHandle>> {
        self.by_id
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Returns total number of active connections.
    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }

    /// Returns number of unique connected users.
    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }

    /// Queues an event on every connection owned by a user.
    pub fn send_to_user(&self, user_id: &UserId, event: &ServerEvent) {
        for conn in self.user_connections(user_id) {
            conn.send(event.clone());
        }
    }

    /// Queues an event on every connection except the given one.
    pub fn broadcast_except(&self, skip: ConnectionId, event: &ServerEvent) {
        for entry in self.by_id.iter() {
            if *entry.key() != skip {
                entry.value().send(event.clone());
            }
        }
    }

    /// Queues an event on every connection.
    pub fn broadcast_all(&self, event: &ServerEvent) {
        for entry in self.by_id.iter() {
            entry.value().send(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    fn handle(user_id: UserId) -> (Arc<ConnectionHandle>, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(8);
        (
            Arc::new(ConnectionHandle::new(
                user_id,
                Uuid::new_v4(),
                "test".into(),
                tx,
            )),
            rx,
        )
    }

    #[test]
    fn tracks_multiple_connections_per_user() {
        let pool = ConnectionPool::new();
        let user = UserId::new();
        let (a, _rx_a) = handle(user);
        let (b, _rx_b) = handle(user);

        pool.add(a.clone());
        pool.add(b.clone());

        assert_eq!(pool.connection_count(), 2);
        assert_eq!(pool.user_count(), 1);
        assert_eq!(pool.user_connections(&user).len(), 2);
    }

    #[test]
    fn remove_clears_empty_user_entry() {
        let pool = ConnectionPool::new();
        let user = UserId::new();
        let (a, _rx) = handle(user);
        pool.add(a.clone());

        let removed = pool.remove(&a.id).unwrap();
        assert_eq!(removed.id, a.id);
        assert_eq!(pool.user_count(), 0);
        assert!(pool.user_connections(&user).is_empty());
    }

    #[tokio::test]
    async fn send_to_user_reaches_every_tab() {
        let pool = ConnectionPool::new();
        let user = UserId::new();
        let (a, mut rx_a) = handle(user);
        let (b, mut rx_b) = handle(user);
        pool.add(a);
        pool.add(b);

        let event = ServerEvent::GroupRemoved {
            group_id: crewchat_core::types::GroupId::new(),
        };
        pool.send_to_user(&user, &event);

        assert_eq!(rx_a.recv().await.unwrap(), event);
        assert_eq!(rx_b.recv().await.unwrap(), event);
    }
}
