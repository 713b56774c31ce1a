//! Group CRUD and membership operations with role enforcement.
//!
//! Authorization lives here; the store only guarantees atomicity of each
//! membership mutation and the owner-row guard. Every mutation that
//! changes who can see a group also pushes the matching `group:added` /
//! `group:removed` event through the engine, so connected clients track
//! membership without polling.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crewchat_core::error::AppError;
use crewchat_core::types::{GroupId, UserId};
use crewchat_entity::group::{CreateGroup, Group, GroupDetail, GroupRole};
use crewchat_entity::store::{GroupStore, UserDirectory};
use crewchat_realtime::ChatEngine;

use crate::context::RequestContext;

/// Request to create a new group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupRequest {
    /// Group name, non-empty after trim.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Members to add alongside the creator.
    #[serde(default)]
    pub member_ids: Vec<UserId>,
}

/// Request to change a member's role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMemberRoleRequest {
    /// The new role; `owner` is never assignable.
    pub role: GroupRole,
}

/// Manages group lifecycle and membership.
#[derive(Clone)]
pub struct GroupService {
    engine: ChatEngine,
    groups: Arc<dyn GroupStore>,
    users: Arc<dyn UserDirectory>,
}

impl GroupService {
    /// Creates a new group service.
    pub fn new(
        engine: ChatEngine,
        groups: Arc<dyn GroupStore>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            engine,
            groups,
            users,
        }
    }

    /// Creates a group with the caller as owner.
    ///
    /// Duplicate initial member ids are collapsed and the caller is never
    /// added a second time.
    pub async fn create_group(
        &self,
        ctx: &RequestContext,
        req: CreateGroupRequest,
    ) -> Result<GroupDetail, AppError> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("group name must not be empty"));
        }

        let mut initial: Vec<UserId> = Vec::new();
        for id in req.member_ids {
            if id != ctx.user_id && !initial.contains(&id) {
                initial.push(id);
            }
        }
        for id in &initial {
            if self.users.find_user(*id).await?.is_none() {
                return Err(AppError::validation(format!("unknown user: {id}")));
            }
        }

        let detail = self
            .groups
            .create_group(CreateGroup {
                owner_user_id: ctx.user_id,
                name: name.to_string(),
                description: req.description,
                initial_member_ids: initial.clone(),
            })
            .await?;

        for member in &initial {
            self.engine.notify_group_added(member, detail.group.id);
        }

        info!(
            group_id = %detail.group.id,
            owner = %ctx.user_id,
            members = detail.members.len(),
            "Group created"
        );
        Ok(detail)
    }

    /// Fetches a group with members. Members only.
    pub async fn get_group(
        &self,
        ctx: &RequestContext,
        group_id: GroupId,
    ) -> Result<GroupDetail, AppError> {
        let detail = self.find_detail(group_id).await?;
        if !detail.is_member(ctx.user_id) {
            return Err(AppError::authorization(format!(
                "not a member of group {group_id}"
            )));
        }
        Ok(detail)
    }

    /// All groups the caller belongs to.
    pub async fn list_my_groups(&self, ctx: &RequestContext) -> Result<Vec<Group>, AppError> {
        self.groups.groups_for_user(ctx.user_id).await
    }

    /// Adds members with role `member`. Owner or group admin only.
    ///
    /// Already-present members are skipped silently; only newly added
    /// users receive a `group:added` event.
    pub async fn add_members(
        &self,
        ctx: &RequestContext,
        group_id: GroupId,
        member_ids: Vec<UserId>,
    ) -> Result<GroupDetail, AppError> {
        let detail = self.require_manage(ctx, group_id).await?;

        let mut to_add: Vec<UserId> = Vec::new();
        for id in member_ids {
            if !detail.is_member(id) && !to_add.contains(&id) {
                to_add.push(id);
            }
        }
        for id in &to_add {
            if self.users.find_user(*id).await?.is_none() {
                return Err(AppError::validation(format!("unknown user: {id}")));
            }
        }

        self.groups.add_members(group_id, &to_add).await?;
        for member in &to_add {
            self.engine.notify_group_added(member, group_id);
        }

        info!(group_id = %group_id, added = to_add.len(), by = %ctx.user_id, "Members added");
        self.find_detail(group_id).await
    }

    /// Removes a member. Owner or group admin only; the owner row is
    /// protected at the store level and can never be removed.
    pub async fn remove_member(
        &self,
        ctx: &RequestContext,
        group_id: GroupId,
        member_id: UserId,
    ) -> Result<(), AppError> {
        let detail = self.require_manage(ctx, group_id).await?;
        if member_id == detail.group.owner_user_id {
            return Err(AppError::validation("the group owner cannot be removed"));
        }

        if !self.groups.remove_member(group_id, member_id).await? {
            return Err(AppError::not_found(format!(
                "user {member_id} is not a member of group {group_id}"
            )));
        }
        self.engine.notify_group_removed(&member_id, group_id);

        info!(group_id = %group_id, member = %member_id, by = %ctx.user_id, "Member removed");
        Ok(())
    }

    /// Changes a member's role to `admin` or `member`. Owner or group
    /// admin only; the owner role is never assignable or revocable.
    pub async fn update_member_role(
        &self,
        ctx: &RequestContext,
        group_id: GroupId,
        member_id: UserId,
        role: GroupRole,
    ) -> Result<(), AppError> {
        self.require_manage(ctx, group_id).await?;
        if role == GroupRole::Owner {
            return Err(AppError::validation("the owner role cannot be assigned"));
        }

        if !self
            .groups
            .update_member_role(group_id, member_id, role)
            .await?
        {
            return Err(AppError::not_found(format!(
                "user {member_id} is not a removable member of group {group_id}"
            )));
        }

        info!(group_id = %group_id, member = %member_id, ?role, by = %ctx.user_id, "Member role updated");
        Ok(())
    }

    /// Deletes the group. Owner only. Every member is notified and
    /// evicted from the room.
    pub async fn delete_group(
        &self,
        ctx: &RequestContext,
        group_id: GroupId,
    ) -> Result<(), AppError> {
        let detail = self.find_detail(group_id).await?;
        if detail.group.owner_user_id != ctx.user_id {
            return Err(AppError::authorization(
                "only the owner can delete a group",
            ));
        }

        let members: Vec<UserId> = detail.members.iter().map(|m| m.user_id).collect();
        self.groups.delete_group(group_id).await?;
        for member in &members {
            self.engine.notify_group_removed(member, group_id);
        }

        info!(group_id = %group_id, by = %ctx.user_id, "Group deleted");
        Ok(())
    }

    /// Leaves the group. The owner cannot leave; they must delete the
    /// group instead (ownership transfer is not supported).
    pub async fn leave_group(
        &self,
        ctx: &RequestContext,
        group_id: GroupId,
    ) -> Result<(), AppError> {
        let detail = self.find_detail(group_id).await?;
        match detail.role_of(ctx.user_id) {
            None => {
                return Err(AppError::validation(format!(
                    "not a member of group {group_id}"
                )))
            }
            Some(GroupRole::Owner) => {
                return Err(AppError::conflict(
                    "the owner cannot leave; delete the group instead",
                ))
            }
            Some(_) => {}
        }

        self.groups.remove_member(group_id, ctx.user_id).await?;
        self.engine.notify_group_removed(&ctx.user_id, group_id);

        info!(group_id = %group_id, member = %ctx.user_id, "Member left group");
        Ok(())
    }

    async fn find_detail(&self, group_id: GroupId) -> Result<GroupDetail, AppError> {
        self.groups
            .find_group(group_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("unknown group: {group_id}")))
    }

    /// Loads the group and fails unless the caller holds a role that can
    /// manage members.
    async fn require_manage(
        &self,
        ctx: &RequestContext,
        group_id: GroupId,
    ) -> Result<GroupDetail, AppError> {
        let detail = self.find_detail(group_id).await?;
        match detail.role_of(ctx.user_id) {
            Some(role) if role.can_manage_members() => Ok(detail),
            Some(_) => Err(AppError::authorization(format!(
                "managing members of group {group_id} requires owner or admin role"
            ))),
            None => Err(AppError::authorization(format!(
                "not a member of group {group_id}"
            ))),
        }
    }
}

impl std::fmt::Debug for GroupService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupService").finish()
    }
}
