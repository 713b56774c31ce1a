//! Message entity models.
//!
//! Messages are append-only and immutable once persisted. The canonical id
//! is a UUIDv7 assigned at insert time, so (created_at, id) is a stable
//! total order within any conversation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crewchat_core::types::{GroupId, MessageId, UserId};

/// A persisted one-to-one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DirectMessage {
    /// Canonical server-assigned id.
    pub id: MessageId,
    /// Sender.
    pub from_user_id: UserId,
    /// Recipient.
    pub to_user_id: UserId,
    /// Message text, non-empty after trim.
    pub body: String,
    /// Caller-supplied correlation token for optimistic-UI reconciliation.
    /// Never used for authorization or ordering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_message_id: Option<String>,
    /// Server clock at persistence.
    pub created_at: DateTime<Utc>,
}

/// A persisted message in a group conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct GroupMessage {
    /// Canonical server-assigned id.
    pub id: MessageId,
    /// Group this message belongs to.
    pub group_id: GroupId,
    /// Sender.
    pub from_user_id: UserId,
    /// Message text, non-empty after trim.
    pub body: String,
    /// Caller-supplied correlation token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_message_id: Option<String>,
    /// Server clock at persistence.
    pub created_at: DateTime<Utc>,
}

/// Input for persisting a direct message. Validation happens at the
/// service layer before this is constructed.
#[derive(Debug, Clone)]
pub struct NewDirectMessage {
    /// Sender.
    pub from_user_id: UserId,
    /// Recipient.
    pub to_user_id: UserId,
    /// Trimmed, non-empty message text.
    pub body: String,
    /// Correlation token from the sending client, if any.
    pub client_message_id: Option<String>,
}

/// Input for persisting a group message.
#[derive(Debug, Clone)]
pub struct NewGroupMessage {
    /// Target group.
    pub group_id: GroupId,
    /// Sender (already verified as a member).
    pub from_user_id: UserId,
    /// Trimmed, non-empty message text.
    pub body: String,
    /// Correlation token from the sending client, if any.
    pub client_message_id: Option<String>,
}
