//! Message send and history operations.
//!
//! Sends delegate to the realtime router, so a message posted over HTTP
//! is validated by the same code path as one sent over the socket and is
//! fanned out to currently connected recipients either way.

use std::sync::Arc;

use tracing::info;

use crewchat_core::error::AppError;
use crewchat_core::types::{GroupId, UserId};
use crewchat_entity::message::{DirectMessage, GroupMessage};
use crewchat_entity::store::{GroupStore, MessageStore, UserDirectory};
use crewchat_realtime::ChatEngine;

use crate::context::RequestContext;

/// Message operations shared by the WebSocket path and the HTTP fallback.
#[derive(Clone)]
pub struct ChatService {
    engine: ChatEngine,
    messages: Arc<dyn MessageStore>,
    groups: Arc<dyn GroupStore>,
    users: Arc<dyn UserDirectory>,
}

impl ChatService {
    /// Creates a new chat service.
    pub fn new(
        engine: ChatEngine,
        messages: Arc<dyn MessageStore>,
        groups: Arc<dyn GroupStore>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            engine,
            messages,
            groups,
            users,
        }
    }

    /// Persists a direct message and fans it out to connected recipients.
    pub async fn send_direct(
        &self,
        ctx: &RequestContext,
        to: UserId,
        text: &str,
        client_message_id: Option<String>,
    ) -> Result<DirectMessage, AppError> {
        let message = self
            .engine
            .router
            .send_direct(ctx.user_id, to, text, client_message_id)
            .await?;
        info!(message_id = %message.id, from = %ctx.user_id, to = %to, "Direct message sent via HTTP");
        Ok(message)
    }

    /// Persists a group message and fans it out to connected members.
    pub async fn send_group(
        &self,
        ctx: &RequestContext,
        group_id: GroupId,
        text: &str,
        client_message_id: Option<String>,
    ) -> Result<GroupMessage, AppError> {
        let message = self
            .engine
            .router
            .send_group(ctx.user_id, group_id, text, client_message_id)
            .await?;
        info!(message_id = %message.id, group_id = %group_id, "Group message sent via HTTP");
        Ok(message)
    }

    /// Conversation history between the caller and a peer, oldest first.
    pub async fn direct_history(
        &self,
        ctx: &RequestContext,
        peer_id: UserId,
    ) -> Result<Vec<DirectMessage>, AppError> {
        if self.users.find_user(peer_id).await?.is_none() {
            return Err(AppError::not_found(format!("unknown user: {peer_id}")));
        }
        self.messages.direct_history(ctx.user_id, peer_id).await
    }

    /// History of a group conversation the caller is a member of.
    pub async fn group_history(
        &self,
        ctx: &RequestContext,
        group_id: GroupId,
    ) -> Result<Vec<GroupMessage>, AppError> {
        let detail = self
            .groups
            .find_group(group_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("unknown group: {group_id}")))?;
        if !detail.is_member(ctx.user_id) {
            return Err(AppError::authorization(format!(
                "not a member of group {group_id}"
            )));
        }
        self.messages.group_history(group_id).await
    }
}

impl std::fmt::Debug for ChatService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatService").finish()
    }
}
