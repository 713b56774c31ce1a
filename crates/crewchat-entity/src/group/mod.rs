//! Group entity.

pub mod model;
pub mod role;

pub use model::{CreateGroup, Group, GroupDetail, GroupMember};
pub use role::GroupRole;
