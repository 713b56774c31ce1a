//! Response payloads for the fallback HTTP surface.
//!
//! Messages and groups are returned as their entity shapes directly, so
//! the client reconciliation layer sees the exact record the socket echo
//! carries.

use serde::{Deserialize, Serialize};

use crewchat_entity::group::Group;
use crewchat_entity::message::{DirectMessage, GroupMessage};

/// GET /api/health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "ok" when the process is serving.
    pub status: String,
    /// Whether the database answered the probe.
    pub database: bool,
}

/// GET /api/messages/{peer_id} response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectHistoryResponse {
    /// Messages oldest first.
    pub messages: Vec<DirectMessage>,
}

/// GET /api/groups/{id}/messages response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupHistoryResponse {
    /// Messages oldest first.
    pub messages: Vec<GroupMessage>,
}

/// GET /api/groups response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupListResponse {
    /// Groups the caller belongs to.
    pub groups: Vec<Group>,
}
