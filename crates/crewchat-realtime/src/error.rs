//! Chat operation error taxonomy.
//!
//! Every failure a chat operation can produce maps to a stable wire code,
//! so clients can distinguish "your input was rejected" from "the system
//! failed, retry". Over the realtime channel these become `error` events
//! to the offending connection only; over HTTP they map to status codes
//! through the `AppError` conversion.

use thiserror::Error;

use crewchat_core::error::AppError;
use crewchat_core::types::{GroupId, UserId};

/// Failures produced by chat routing and validation.
#[derive(Debug, Error)]
pub enum ChatError {
    /// A user attempted to message themselves.
    #[error("cannot send a message to yourself")]
    SelfChat,
    /// Message text was empty after trimming.
    #[error("message text must not be empty")]
    EmptyMessage,
    /// The direct-message recipient does not exist.
    #[error("unknown recipient: {0}")]
    PeerNotFound(UserId),
    /// The group does not exist.
    #[error("unknown group: {0}")]
    GroupNotFound(GroupId),
    /// The sender is not a member of the target group.
    #[error("not a member of group {0}")]
    NotAMember(GroupId),
    /// The caller lacks the group role the operation requires.
    #[error("operation requires owner or admin role in group {0}")]
    InsufficientRole(GroupId),
    /// The persistence layer failed; the client may retry.
    #[error("store failure: {0}")]
    Store(#[from] AppError),
}

impl ChatError {
    /// Stable machine-readable code carried in `error` events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::SelfChat => "SELF_CHAT_PREVENTED",
            Self::EmptyMessage => "EMPTY_MESSAGE",
            Self::PeerNotFound(_) => "PEER_NOT_FOUND",
            Self::GroupNotFound(_) => "GROUP_NOT_FOUND",
            Self::NotAMember(_) => "NOT_A_MEMBER",
            Self::InsufficientRole(_) => "FORBIDDEN",
            Self::Store(_) => "STORE_FAILURE",
        }
    }
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::SelfChat | ChatError::EmptyMessage => {
                AppError::validation(err.to_string())
            }
            ChatError::PeerNotFound(_) | ChatError::GroupNotFound(_) => {
                AppError::not_found(err.to_string())
            }
            ChatError::NotAMember(_) | ChatError::InsufficientRole(_) => {
                AppError::authorization(err.to_string())
            }
            ChatError::Store(inner) => inner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crewchat_core::error::ErrorKind;

    #[test]
    fn self_chat_maps_to_validation() {
        let app: AppError = ChatError::SelfChat.into();
        assert_eq!(app.kind, ErrorKind::Validation);
        assert_eq!(ChatError::SelfChat.code(), "SELF_CHAT_PREVENTED");
    }

    #[test]
    fn store_failures_keep_their_kind() {
        let app: AppError = ChatError::Store(AppError::database("down")).into();
        assert_eq!(app.kind, ErrorKind::Database);
    }
}
