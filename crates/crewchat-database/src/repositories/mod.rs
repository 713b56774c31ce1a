//! Concrete Postgres repositories implementing the entity store contracts.

pub mod group;
pub mod message;
pub mod user;
