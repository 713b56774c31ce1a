//! Request payloads for the fallback HTTP surface.
//!
//! Validation here covers shape only (lengths, required fields); the
//! semantic rules — self-chat, membership, roles — live in the services
//! and the realtime router, identically for both transports.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crewchat_core::types::UserId;
use crewchat_entity::group::GroupRole;

/// POST /api/messages — send a direct message.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendMessageRequest {
    /// Recipient user ID.
    pub to: UserId,
    /// Message text.
    #[validate(length(min = 1, max = 4000))]
    pub text: String,
    /// Optional client correlation token for optimistic-UI reconciliation.
    #[validate(length(max = 64))]
    pub client_message_id: Option<String>,
}

/// POST /api/groups/{id}/messages — send a group message.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendGroupMessageRequest {
    /// Message text.
    #[validate(length(min = 1, max = 4000))]
    pub text: String,
    /// Optional client correlation token.
    #[validate(length(max = 64))]
    pub client_message_id: Option<String>,
}

/// POST /api/groups — create a group.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateGroupBody {
    /// Group name.
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    /// Optional description.
    #[validate(length(max = 500))]
    pub description: Option<String>,
    /// Members to add alongside the creator.
    #[serde(default)]
    pub member_ids: Vec<UserId>,
}

/// POST /api/groups/{id}/members — add members.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddMembersRequest {
    /// Users to add with role `member`.
    #[validate(length(min = 1))]
    pub member_ids: Vec<UserId>,
}

/// PUT /api/groups/{id}/members/{user_id}/role — change a member role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMemberRoleBody {
    /// The new role; `owner` is rejected by the service.
    pub role: GroupRole,
}
