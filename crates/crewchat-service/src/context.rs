//! Request context carrying the authenticated user and session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crewchat_core::types::UserId;
use crewchat_entity::user::UserRole;

/// Context for the current authenticated request.
///
/// Extracted from the verified JWT by the API layer and passed into
/// service methods so every operation knows *who* is acting and from
/// *which* session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: UserId,
    /// The current session ID.
    pub session_id: Uuid,
    /// The user's platform role at the time the JWT was issued.
    pub role: UserRole,
    /// The username (convenience field from JWT claims).
    pub username: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: UserId, session_id: Uuid, role: UserRole, username: String) -> Self {
        Self {
            user_id,
            session_id,
            role,
            username,
            request_time: Utc::now(),
        }
    }

    /// Returns whether the current user is a platform admin.
    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}
