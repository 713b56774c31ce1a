//! # crewchat-database
//!
//! PostgreSQL implementations of the store contracts in `crewchat-entity`,
//! plus pool construction and the migration runner.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::group::GroupRepository;
pub use repositories::message::MessageRepository;
pub use repositories::user::UserRepository;
