//! Presence snapshot queries.
//!
//! The realtime channel pushes presence; this service only serves the
//! polling fallback and dashboards. It reads the same in-memory presence
//! directory the engine maintains, so the two views never disagree.

use serde::{Deserialize, Serialize};

use crewchat_core::types::UserId;
use crewchat_realtime::ChatEngine;

/// Point-in-time view of who is online.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceSnapshot {
    /// Users with at least one live connection.
    pub online_users: Vec<UserId>,
    /// Convenience count of `online_users`.
    pub online_count: usize,
}

/// Read-only presence queries over the running engine.
#[derive(Clone)]
pub struct PresenceService {
    engine: ChatEngine,
}

impl PresenceService {
    /// Creates a new presence service.
    pub fn new(engine: ChatEngine) -> Self {
        Self { engine }
    }

    /// Current snapshot of online users.
    pub fn snapshot(&self) -> PresenceSnapshot {
        let online_users = self.engine.presence.snapshot_online_users();
        let online_count = online_users.len();
        PresenceSnapshot {
            online_users,
            online_count,
        }
    }

    /// Whether a specific user has at least one live connection.
    pub fn is_online(&self, user_id: &UserId) -> bool {
        self.engine.presence.is_online(user_id)
    }
}

impl std::fmt::Debug for PresenceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceService").finish()
    }
}
