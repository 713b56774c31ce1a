//! Per-group connection subscriptions (typing scope).

pub mod registry;

pub use registry::RoomRegistry;
