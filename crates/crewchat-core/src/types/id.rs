//! Newtype wrappers around [`uuid::Uuid`] for all domain entity identifiers.
//!
//! Using distinct types prevents accidentally passing a `UserId` where a
//! `GroupId` is expected. Each ID type is `#[sqlx(transparent)]` so
//! repositories can bind it directly in PostgreSQL queries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to define a newtype ID wrapper around `Uuid`.
///
/// `$ctor` is the UUID constructor: `Uuid::new_v4` for random ids,
/// `Uuid::now_v7` where creation ordering matters.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident, $ctor:path
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            Serialize, Deserialize, sqlx::Type,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier.
            pub fn new() -> Self {
                Self($ctor())
            }

            /// Create an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Return the inner UUID value.
            pub fn into_uuid(self) -> Uuid {
                self.0
            }

            /// Return a reference to the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

define_id!(
    /// Identifier of a registered user.
    UserId, Uuid::new_v4
);

define_id!(
    /// Identifier of a chat group.
    GroupId, Uuid::new_v4
);

define_id!(
    /// Canonical identifier of a persisted message.
    ///
    /// UUIDv7 so that ids are monotonically ordered by creation time,
    /// which makes (timestamp, id) a stable total order for conversations.
    MessageId, Uuid::now_v7
);

define_id!(
    /// Identifier of a single live realtime connection (one browser tab).
    ConnectionId, Uuid::new_v4
);
