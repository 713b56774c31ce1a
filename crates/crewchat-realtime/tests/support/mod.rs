//! In-memory store doubles for engine tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crewchat_core::result::AppResult;
use crewchat_core::types::{GroupId, MessageId, UserId};
use crewchat_entity::group::{CreateGroup, Group, GroupDetail, GroupMember, GroupRole};
use crewchat_entity::message::{DirectMessage, GroupMessage, NewDirectMessage, NewGroupMessage};
use crewchat_entity::store::{GroupStore, MessageStore, UserDirectory};
use crewchat_entity::user::{User, UserRole};

#[derive(Default)]
pub struct InMemoryMessages {
    direct: Mutex<Vec<DirectMessage>>,
    group: Mutex<Vec<GroupMessage>>,
}

impl InMemoryMessages {
    pub fn direct_count(&self) -> usize {
        self.direct.lock().unwrap().len()
    }

    pub fn group_count(&self) -> usize {
        self.group.lock().unwrap().len()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessages {
    async fn insert_direct(&self, msg: NewDirectMessage) -> AppResult<DirectMessage> {
        let persisted = DirectMessage {
            id: MessageId::new(),
            from_user_id: msg.from_user_id,
            to_user_id: msg.to_user_id,
            body: msg.body,
            client_message_id: msg.client_message_id,
            created_at: Utc::now(),
        };
        self.direct.lock().unwrap().push(persisted.clone());
        Ok(persisted)
    }

    async fn direct_history(&self, a: UserId, b: UserId) -> AppResult<Vec<DirectMessage>> {
        let mut out: Vec<_> = self
            .direct
            .lock()
            .unwrap()
            .iter()
            .filter(|m| {
                (m.from_user_id == a && m.to_user_id == b)
                    || (m.from_user_id == b && m.to_user_id == a)
            })
            .cloned()
            .collect();
        out.sort_by(|x, y| (x.created_at, x.id).cmp(&(y.created_at, y.id)));
        Ok(out)
    }

    async fn insert_group(&self, msg: NewGroupMessage) -> AppResult<GroupMessage> {
        let persisted = GroupMessage {
            id: MessageId::new(),
            group_id: msg.group_id,
            from_user_id: msg.from_user_id,
            body: msg.body,
            client_message_id: msg.client_message_id,
            created_at: Utc::now(),
        };
        self.group.lock().unwrap().push(persisted.clone());
        Ok(persisted)
    }

    async fn group_history(&self, group_id: GroupId) -> AppResult<Vec<GroupMessage>> {
        let mut out: Vec<_> = self
            .group
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.group_id == group_id)
            .cloned()
            .collect();
        out.sort_by(|x, y| (x.created_at, x.id).cmp(&(y.created_at, y.id)));
        Ok(out)
    }
}

#[derive(Default)]
pub struct InMemoryGroups {
    groups: Mutex<HashMap<GroupId, GroupDetail>>,
}

impl InMemoryGroups {
    /// Seeds a group with an owner and plain members, bypassing validation.
    pub fn seed(&self, name: &str, owner: UserId, members: &[UserId]) -> GroupId {
        let id = GroupId::new();
        let now = Utc::now();
        let mut rows = vec![GroupMember {
            group_id: id,
            user_id: owner,
            role: GroupRole::Owner,
            added_at: now,
        }];
        rows.extend(members.iter().map(|&user_id| GroupMember {
            group_id: id,
            user_id,
            role: GroupRole::Member,
            added_at: now,
        }));
        self.groups.lock().unwrap().insert(
            id,
            GroupDetail {
                group: Group {
                    id,
                    name: name.to_string(),
                    description: None,
                    owner_user_id: owner,
                    last_message_body: None,
                    last_message_at: None,
                    created_at: now,
                },
                members: rows,
            },
        );
        id
    }

    pub fn add(&self, group_id: GroupId, user_id: UserId) {
        if let Some(detail) = self.groups.lock().unwrap().get_mut(&group_id) {
            if !detail.is_member(user_id) {
                detail.members.push(GroupMember {
                    group_id,
                    user_id,
                    role: GroupRole::Member,
                    added_at: Utc::now(),
                });
            }
        }
    }

    pub fn remove(&self, group_id: GroupId, user_id: UserId) {
        if let Some(detail) = self.groups.lock().unwrap().get_mut(&group_id) {
            detail
                .members
                .retain(|m| m.user_id != user_id || m.role == GroupRole::Owner);
        }
    }
}

#[async_trait]
impl GroupStore for InMemoryGroups {
    async fn create_group(&self, cmd: CreateGroup) -> AppResult<GroupDetail> {
        let id = self.seed(&cmd.name, cmd.owner_user_id, &cmd.initial_member_ids);
        if let Some(description) = cmd.description {
            if let Some(detail) = self.groups.lock().unwrap().get_mut(&id) {
                detail.group.description = Some(description);
            }
        }
        Ok(self.groups.lock().unwrap().get(&id).cloned().unwrap())
    }

    async fn find_group(&self, id: GroupId) -> AppResult<Option<GroupDetail>> {
        Ok(self.groups.lock().unwrap().get(&id).cloned())
    }

    async fn groups_for_user(&self, user_id: UserId) -> AppResult<Vec<Group>> {
        Ok(self
            .groups
            .lock()
            .unwrap()
            .values()
            .filter(|d| d.is_member(user_id))
            .map(|d| d.group.clone())
            .collect())
    }

    async fn add_members(&self, group_id: GroupId, member_ids: &[UserId]) -> AppResult<()> {
        for &user_id in member_ids {
            self.add(group_id, user_id);
        }
        Ok(())
    }

    async fn remove_member(&self, group_id: GroupId, member_id: UserId) -> AppResult<bool> {
        let mut groups = self.groups.lock().unwrap();
        let Some(detail) = groups.get_mut(&group_id) else {
            return Ok(false);
        };
        let before = detail.members.len();
        detail
            .members
            .retain(|m| m.user_id != member_id || m.role == GroupRole::Owner);
        Ok(detail.members.len() < before)
    }

    async fn update_member_role(
        &self,
        group_id: GroupId,
        member_id: UserId,
        role: GroupRole,
    ) -> AppResult<bool> {
        let mut groups = self.groups.lock().unwrap();
        let Some(detail) = groups.get_mut(&group_id) else {
            return Ok(false);
        };
        for m in &mut detail.members {
            if m.user_id == member_id && m.role != GroupRole::Owner {
                m.role = role;
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn delete_group(&self, group_id: GroupId) -> AppResult<()> {
        self.groups.lock().unwrap().remove(&group_id);
        Ok(())
    }

    async fn member_ids(&self, group_id: GroupId) -> AppResult<Vec<UserId>> {
        Ok(self
            .groups
            .lock()
            .unwrap()
            .get(&group_id)
            .map(|d| d.members.iter().map(|m| m.user_id).collect())
            .unwrap_or_default())
    }

    async fn member_role(
        &self,
        group_id: GroupId,
        user_id: UserId,
    ) -> AppResult<Option<GroupRole>> {
        Ok(self
            .groups
            .lock()
            .unwrap()
            .get(&group_id)
            .and_then(|d| d.role_of(user_id)))
    }
}

#[derive(Default)]
pub struct InMemoryUsers {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUsers {
    pub fn add(&self, username: &str) -> UserId {
        let id = UserId::new();
        self.users.lock().unwrap().insert(
            id,
            User {
                id,
                username: username.to_string(),
                display_name: None,
                role: UserRole::Employee,
                created_at: Utc::now(),
            },
        );
        id
    }
}

#[async_trait]
impl UserDirectory for InMemoryUsers {
    async fn find_user(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }
}
