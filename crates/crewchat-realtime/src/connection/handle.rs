//! Individual realtime connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use uuid::Uuid;

use crewchat_core::types::{ConnectionId, UserId};

use crate::event::ServerEvent;

/// A handle to a single live realtime connection (one browser tab).
///
/// Holds the sender half of the outbound event queue plus metadata about
/// the connected user. The transport task owns the receiver half and
/// forwards events onto the socket.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// User who owns this connection.
    pub user_id: UserId,
    /// Auth session this connection belongs to.
    pub session_id: Uuid,
    /// Username (cached for typing-indicator labels).
    pub username: String,
    /// Sender for outbound events.
    sender: mpsc::Sender<ServerEvent>,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    /// Whether the connection is still alive.
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle.
    pub fn new(
        user_id: UserId,
        session_id: Uuid,
        username: String,
        sender: mpsc::Sender<ServerEvent>,
    ) -> Self {
        Self {
            id: ConnectionId::new(),
            user_id,
            session_id,
            username,
            sender,
            connected_at: Utc::now(),
            alive: AtomicBool::new(true),
        }
    }

    /// Queue an outbound event for this connection.
    ///
    /// Returns `false` when the event was dropped (buffer full or
    /// connection gone). A full buffer sheds the event rather than
    /// blocking the fan-out path.
    pub fn send(&self, event: ServerEvent) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.id, "Send buffer full, dropping event");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_closed();
                false
            }
        }
    }

    /// Check if the connection is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark the connection as closed.
    pub fn mark_closed(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}
