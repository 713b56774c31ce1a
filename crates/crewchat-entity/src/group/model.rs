//! Group entity models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crewchat_core::types::{GroupId, UserId};

use super::role::GroupRole;

/// A named chat group.
///
/// Carries a denormalized last-message summary so group lists can render
/// without a per-group history query.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Group {
    /// Unique group identifier.
    pub id: GroupId,
    /// Group name, non-empty.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// The single owner; also present in the member list with role `owner`.
    pub owner_user_id: UserId,
    /// Body of the most recent group message, if any.
    pub last_message_body: Option<String>,
    /// Timestamp of the most recent group message, if any.
    pub last_message_at: Option<DateTime<Utc>>,
    /// When the group was created.
    pub created_at: DateTime<Utc>,
}

/// A single group membership row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GroupMember {
    /// Group this membership belongs to.
    pub group_id: GroupId,
    /// The member.
    pub user_id: UserId,
    /// Role within the group.
    pub role: GroupRole,
    /// When the member was added.
    pub added_at: DateTime<Utc>,
}

/// A group together with its full member list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDetail {
    /// The group record.
    #[serde(flatten)]
    pub group: Group,
    /// Current members, owner included.
    pub members: Vec<GroupMember>,
}

impl GroupDetail {
    /// Number of members holding the owner role. Invariant: always 1.
    pub fn owner_count(&self) -> usize {
        self.members
            .iter()
            .filter(|m| m.role == GroupRole::Owner)
            .count()
    }

    /// Whether the member list contains duplicate user ids. Invariant: never.
    pub fn has_duplicate_members(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.members.iter().any(|m| !seen.insert(m.user_id))
    }

    /// Role of the given user within this group, if a member.
    pub fn role_of(&self, user_id: UserId) -> Option<GroupRole> {
        self.members
            .iter()
            .find(|m| m.user_id == user_id)
            .map(|m| m.role)
    }

    /// Whether the given user is a current member.
    pub fn is_member(&self, user_id: UserId) -> bool {
        self.role_of(user_id).is_some()
    }
}

/// Input for creating a group. The owner is added automatically with
/// role `owner`; duplicate initial member ids are collapsed.
#[derive(Debug, Clone)]
pub struct CreateGroup {
    /// Creating user, who becomes the owner.
    pub owner_user_id: UserId,
    /// Group name, non-empty after trim.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Members to add alongside the owner, role `member`.
    pub initial_member_ids: Vec<UserId>,
}
