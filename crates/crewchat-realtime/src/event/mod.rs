//! Bidirectional event protocol.
//!
//! Every event kind is a variant of a closed enum, so dispatch is
//! exhaustive at compile time. Wire names keep the colon-namespaced
//! convention the front end already speaks (`group:message`,
//! `typing:start`, ...).

use serde::{Deserialize, Serialize};

use crewchat_core::types::{GroupId, UserId};
use crewchat_entity::message::{DirectMessage, GroupMessage};

/// Events sent by the client over the realtime channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Send a direct message.
    #[serde(rename = "message")]
    Message {
        /// Recipient.
        to: UserId,
        /// Message text.
        text: String,
        /// Optional correlation token for optimistic-UI reconciliation.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        client_message_id: Option<String>,
    },
    /// Send a message to a group.
    #[serde(rename = "group:message")]
    GroupMessage {
        /// Target group.
        group_id: GroupId,
        /// Message text.
        text: String,
        /// Optional correlation token.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        client_message_id: Option<String>,
    },
    /// Subscribe this connection to a group's typing scope.
    #[serde(rename = "group:join")]
    GroupJoin {
        /// Group to join.
        group_id: GroupId,
    },
    /// Started typing in a direct conversation.
    #[serde(rename = "typing:start")]
    TypingStart {
        /// The peer being typed at.
        to: UserId,
    },
    /// Stopped typing in a direct conversation.
    #[serde(rename = "typing:stop")]
    TypingStop {
        /// The peer being typed at.
        to: UserId,
    },
    /// Started typing in a group conversation.
    #[serde(rename = "group:typing:start")]
    GroupTypingStart {
        /// The group being typed in.
        group_id: GroupId,
    },
    /// Stopped typing in a group conversation.
    #[serde(rename = "group:typing:stop")]
    GroupTypingStop {
        /// The group being typed in.
        group_id: GroupId,
    },
}

/// Events pushed by the server to connected clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// Canonical direct message, delivered to both sides' connections.
    #[serde(rename = "message")]
    Message(DirectMessage),
    /// Canonical group message, delivered to every current member.
    #[serde(rename = "group:message")]
    GroupMessage(GroupMessage),
    /// A peer started typing at the recipient.
    #[serde(rename = "typing:start")]
    TypingStart {
        /// Who is typing.
        from: UserId,
    },
    /// A peer stopped typing.
    #[serde(rename = "typing:stop")]
    TypingStop {
        /// Who stopped typing.
        from: UserId,
    },
    /// A member started typing in a group.
    #[serde(rename = "group:typing:start")]
    GroupTypingStart {
        /// The group.
        group_id: GroupId,
        /// Who is typing.
        user_id: UserId,
        /// Display name for the indicator label.
        user_name: String,
    },
    /// A member stopped typing in a group.
    #[serde(rename = "group:typing:stop")]
    GroupTypingStop {
        /// The group.
        group_id: GroupId,
        /// Who stopped typing.
        user_id: UserId,
        /// Display name for the indicator label.
        user_name: String,
    },
    /// Full online-user snapshot, sent once per successful handshake.
    #[serde(rename = "presence:sync")]
    PresenceSync {
        /// Every user with at least one live connection.
        online_users: Vec<UserId>,
    },
    /// Incremental presence change.
    #[serde(rename = "presence:update")]
    PresenceUpdate {
        /// The user whose presence changed.
        user_id: UserId,
        /// New status.
        status: PresenceStatus,
    },
    /// The receiving user was added to a group; the client should refresh
    /// its group list.
    #[serde(rename = "group:added")]
    GroupAdded {
        /// The group.
        group_id: GroupId,
    },
    /// The receiving user was removed from a group (or it was deleted);
    /// the client should evict local state for it.
    #[serde(rename = "group:removed")]
    GroupRemoved {
        /// The group.
        group_id: GroupId,
    },
    /// Typed error, delivered only to the offending connection.
    #[serde(rename = "error")]
    Error {
        /// Machine-readable error code.
        code: String,
        /// Human-readable description.
        message: String,
    },
}

/// Online/offline presence state carried by `presence:update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    /// The user has at least one live connection.
    Online,
    /// The user's last connection closed.
    Offline,
}
