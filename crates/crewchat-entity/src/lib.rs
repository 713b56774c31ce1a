//! # crewchat-entity
//!
//! Domain entity models for CrewChat: users, direct messages, groups and
//! group messages, plus the async store contracts the realtime core and
//! services depend on. The Postgres implementations live in
//! `crewchat-database`; tests substitute in-memory doubles.

pub mod group;
pub mod message;
pub mod store;
pub mod user;

pub use group::{CreateGroup, Group, GroupDetail, GroupMember, GroupRole};
pub use message::{DirectMessage, GroupMessage, NewDirectMessage, NewGroupMessage};
pub use store::{GroupStore, MessageStore, UserDirectory};
pub use user::{User, UserRole};
