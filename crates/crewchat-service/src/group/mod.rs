//! Group lifecycle and membership management.

pub mod service;

pub use service::{CreateGroupRequest, GroupService, UpdateMemberRoleRequest};
