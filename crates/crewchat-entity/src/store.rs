//! Persistence contracts for the chat core.
//!
//! The realtime engine and services depend on these traits rather than on
//! concrete repositories, so the fan-out and reconciliation logic can be
//! tested against in-memory doubles without a running Postgres.

use async_trait::async_trait;

use crewchat_core::result::AppResult;
use crewchat_core::types::{GroupId, UserId};

use crate::group::{CreateGroup, Group, GroupDetail, GroupRole};
use crate::message::{DirectMessage, GroupMessage, NewDirectMessage, NewGroupMessage};
use crate::user::User;

/// Durable log of direct and group messages.
#[async_trait]
pub trait MessageStore: Send + Sync + 'static {
    /// Persist a direct message, assigning the canonical id and timestamp.
    async fn insert_direct(&self, msg: NewDirectMessage) -> AppResult<DirectMessage>;

    /// Full conversation between two users, oldest first.
    async fn direct_history(&self, a: UserId, b: UserId) -> AppResult<Vec<DirectMessage>>;

    /// Persist a group message and refresh the group's last-message summary.
    async fn insert_group(&self, msg: NewGroupMessage) -> AppResult<GroupMessage>;

    /// Full group conversation, oldest first.
    async fn group_history(&self, group_id: GroupId) -> AppResult<Vec<GroupMessage>>;
}

/// Durable record of groups and their membership.
///
/// Membership mutations must be single atomic statements so concurrent
/// updates cannot be observed half-applied.
#[async_trait]
pub trait GroupStore: Send + Sync + 'static {
    /// Create a group; the owner is auto-added with role `owner`.
    async fn create_group(&self, cmd: CreateGroup) -> AppResult<GroupDetail>;

    /// Fetch a group with its member list.
    async fn find_group(&self, id: GroupId) -> AppResult<Option<GroupDetail>>;

    /// All groups the user is currently a member of.
    async fn groups_for_user(&self, user_id: UserId) -> AppResult<Vec<Group>>;

    /// Add members with role `member`. Idempotent per member; the owner
    /// row is never touched.
    async fn add_members(&self, group_id: GroupId, member_ids: &[UserId]) -> AppResult<()>;

    /// Remove a non-owner member. Returns `false` when no row was removed
    /// (unknown member, or the owner).
    async fn remove_member(&self, group_id: GroupId, member_id: UserId) -> AppResult<bool>;

    /// Change a non-owner member's role to `admin` or `member`. Returns
    /// `false` when no row was updated.
    async fn update_member_role(
        &self,
        group_id: GroupId,
        member_id: UserId,
        role: GroupRole,
    ) -> AppResult<bool>;

    /// Delete the group and all membership rows. Caller authorization is
    /// checked at the service layer.
    async fn delete_group(&self, group_id: GroupId) -> AppResult<()>;

    /// Current member ids; the fan-out set for a group message.
    async fn member_ids(&self, group_id: GroupId) -> AppResult<Vec<UserId>>;

    /// The user's role in the group, `None` when not a member.
    async fn member_role(&self, group_id: GroupId, user_id: UserId)
        -> AppResult<Option<GroupRole>>;
}

/// Read-only view of the platform's user directory.
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    /// Look up a user by id.
    async fn find_user(&self, id: UserId) -> AppResult<Option<User>>;

    /// Whether the user exists.
    async fn user_exists(&self, id: UserId) -> AppResult<bool> {
        Ok(self.find_user(id).await?.is_some())
    }
}
