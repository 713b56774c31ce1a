//! Chat event router — validation, persistence, and fan-out.
//!
//! One logical implementation serves both transports: the WebSocket path
//! enters through [`ChatRouter::handle_text`], the HTTP fallback calls the
//! `send_*` operations directly through the service layer. Validation is
//! therefore identical on both paths.
//!
//! Ordering: each connection's inbound frames are processed sequentially
//! by its transport task, so a single sender's messages are persisted and
//! fanned out in emission order. No cross-sender order is promised beyond
//! the persisted (created_at, id) pair.

use std::sync::Arc;

use tracing::{debug, warn};

use crewchat_core::types::{GroupId, UserId};
use crewchat_entity::message::{DirectMessage, GroupMessage, NewDirectMessage, NewGroupMessage};
use crewchat_entity::store::{GroupStore, MessageStore, UserDirectory};

use crate::connection::handle::ConnectionHandle;
use crate::connection::pool::ConnectionPool;
use crate::error::ChatError;
use crate::event::{ClientEvent, ServerEvent};
use crate::room::registry::RoomRegistry;
use crate::typing::relay::{TypingRelay, TypingScope};

/// Routes inbound chat events to stores and fans results out to
/// recipients' connections.
pub struct ChatRouter {
    pool: Arc<ConnectionPool>,
    rooms: Arc<RoomRegistry>,
    typing: Arc<TypingRelay>,
    messages: Arc<dyn MessageStore>,
    groups: Arc<dyn GroupStore>,
    users: Arc<dyn UserDirectory>,
}

impl ChatRouter {
    /// Creates a new router over the given shared structures and stores.
    pub fn new(
        pool: Arc<ConnectionPool>,
        rooms: Arc<RoomRegistry>,
        typing: Arc<TypingRelay>,
        messages: Arc<dyn MessageStore>,
        groups: Arc<dyn GroupStore>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            pool,
            rooms,
            typing,
            messages,
            groups,
            users,
        }
    }

    /// Processes one raw inbound frame from a connection.
    ///
    /// Malformed payloads and rejected operations produce an `error` event
    /// on the offending connection only; they never tear down the
    /// connection task.
    pub async fn handle_text(&self, conn: &Arc<ConnectionHandle>, raw: &str) {
        let event: ClientEvent = match serde_json::from_str(raw) {
            Ok(event) => event,
            Err(e) => {
                debug!(conn_id = %conn.id, error = %e, "Unparseable client event");
                conn.send(ServerEvent::Error {
                    code: "INVALID_EVENT".to_string(),
                    message: format!("Failed to parse event: {e}"),
                });
                return;
            }
        };
        self.handle_event(conn, event).await;
    }

    /// Dispatches one parsed client event.
    pub async fn handle_event(&self, conn: &Arc<ConnectionHandle>, event: ClientEvent) {
        let result = match event {
            ClientEvent::Message {
                to,
                text,
                client_message_id,
            } => self
                .send_direct(conn.user_id, to, &text, client_message_id)
                .await
                .map(|_| ()),
            ClientEvent::GroupMessage {
                group_id,
                text,
                client_message_id,
            } => self
                .send_group(conn.user_id, group_id, &text, client_message_id)
                .await
                .map(|_| ()),
            ClientEvent::GroupJoin { group_id } => self.join_group(conn, group_id).await,
            ClientEvent::TypingStart { to } => {
                self.direct_typing(conn, to, true);
                Ok(())
            }
            ClientEvent::TypingStop { to } => {
                self.direct_typing(conn, to, false);
                Ok(())
            }
            ClientEvent::GroupTypingStart { group_id } => {
                self.group_typing(conn, group_id, true);
                Ok(())
            }
            ClientEvent::GroupTypingStop { group_id } => {
                self.group_typing(conn, group_id, false);
                Ok(())
            }
        };

        if let Err(err) = result {
            if matches!(err, ChatError::Store(_)) {
                warn!(conn_id = %conn.id, error = %err, "Chat operation failed in store");
            }
            conn.send(ServerEvent::Error {
                code: err.code().to_string(),
                message: err.to_string(),
            });
        }
    }

    /// Validates and persists a direct message, then fans the canonical
    /// record out to every connection of both the recipient and the
    /// sender (so the sender's other tabs converge too).
    pub async fn send_direct(
        &self,
        from: UserId,
        to: UserId,
        text: &str,
        client_message_id: Option<String>,
    ) -> Result<DirectMessage, ChatError> {
        if from == to {
            return Err(ChatError::SelfChat);
        }
        let body = text.trim();
        if body.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if !self.users.user_exists(to).await? {
            return Err(ChatError::PeerNotFound(to));
        }

        let persisted = self
            .messages
            .insert_direct(NewDirectMessage {
                from_user_id: from,
                to_user_id: to,
                body: body.to_string(),
                client_message_id,
            })
            .await?;

        let event = ServerEvent::Message(persisted.clone());
        self.pool.send_to_user(&to, &event);
        self.pool.send_to_user(&from, &event);

        debug!(message_id = %persisted.id, from = %from, to = %to, "Direct message routed");
        Ok(persisted)
    }

    /// Validates and persists a group message, then fans it out to every
    /// connection of every member in the group *at send time*.
    pub async fn send_group(
        &self,
        from: UserId,
        group_id: GroupId,
        text: &str,
        client_message_id: Option<String>,
    ) -> Result<GroupMessage, ChatError> {
        let body = text.trim();
        if body.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        self.require_membership(group_id, from).await?;

        let persisted = self
            .messages
            .insert_group(NewGroupMessage {
                group_id,
                from_user_id: from,
                body: body.to_string(),
                client_message_id,
            })
            .await?;

        // The fan-out set is membership at send time, read fresh from the
        // store — a member removed a moment ago receives nothing.
        let recipients = self.groups.member_ids(group_id).await?;
        let event = ServerEvent::GroupMessage(persisted.clone());
        for member in &recipients {
            self.pool.send_to_user(member, &event);
        }

        debug!(
            message_id = %persisted.id,
            group_id = %group_id,
            recipients = recipients.len(),
            "Group message routed"
        );
        Ok(persisted)
    }

    /// Subscribes a connection to a group's typing scope.
    pub async fn join_group(
        &self,
        conn: &Arc<ConnectionHandle>,
        group_id: GroupId,
    ) -> Result<(), ChatError> {
        self.require_membership(group_id, conn.user_id).await?;
        self.rooms.subscribe(group_id, conn.id);
        debug!(conn_id = %conn.id, group_id = %group_id, "Joined group room");
        Ok(())
    }

    /// Relays a direct typing signal to the peer's connections.
    fn direct_typing(&self, conn: &Arc<ConnectionHandle>, to: UserId, started: bool) {
        let from = conn.user_id;
        let scope = TypingScope::Direct { from, to };
        let event = if started {
            self.typing.start(scope, &conn.username);
            ServerEvent::TypingStart { from }
        } else {
            self.typing.stop(&scope);
            ServerEvent::TypingStop { from }
        };
        self.pool.send_to_user(&to, &event);
    }

    /// Relays a group typing signal to subscribed connections, excluding
    /// every connection the typist owns.
    fn group_typing(&self, conn: &Arc<ConnectionHandle>, group_id: GroupId, started: bool) {
        let from = conn.user_id;
        let scope = TypingScope::Group { group_id, from };
        let event = if started {
            self.typing.start(scope, &conn.username);
            ServerEvent::GroupTypingStart {
                group_id,
                user_id: from,
                user_name: conn.username.clone(),
            }
        } else {
            self.typing.stop(&scope);
            ServerEvent::GroupTypingStop {
                group_id,
                user_id: from,
                user_name: conn.username.clone(),
            }
        };
        self.relay_to_room(group_id, from, &event);
    }

    /// Sends an event to every room subscriber not owned by `skip_user`.
    pub(crate) fn relay_to_room(&self, group_id: GroupId, skip_user: UserId, event: &ServerEvent) {
        for conn_id in self.rooms.subscribers(&group_id) {
            if let Some(handle) = self.pool.get(&conn_id) {
                if handle.user_id != skip_user {
                    handle.send(event.clone());
                }
            }
        }
    }

    /// Fails with `GroupNotFound` / `NotAMember` unless the user is a
    /// current member of the group.
    async fn require_membership(&self, group_id: GroupId, user: UserId) -> Result<(), ChatError> {
        match self.groups.member_role(group_id, user).await? {
            Some(_) => Ok(()),
            None => {
                if self.groups.find_group(group_id).await?.is_none() {
                    Err(ChatError::GroupNotFound(group_id))
                } else {
                    Err(ChatError::NotAMember(group_id))
                }
            }
        }
    }
}

impl std::fmt::Debug for ChatRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatRouter").finish()
    }
}
