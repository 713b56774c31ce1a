//! Per-group member role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a member within a single group.
///
/// Exactly one member per group holds [`GroupRole::Owner`], and that member
/// is always the group's `owner_user_id`. The owner cannot be demoted or
/// removed through the normal mutation paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "group_member_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GroupRole {
    /// The single group owner.
    Owner,
    /// Can add/remove members and change non-owner roles.
    Admin,
    /// Regular participant.
    Member,
}

impl GroupRole {
    /// Whether this role may mutate group membership.
    pub fn can_manage_members(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

impl fmt::Display for GroupRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
