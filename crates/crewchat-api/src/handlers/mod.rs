//! HTTP and WebSocket handlers.

pub mod group;
pub mod health;
pub mod message;
pub mod presence;
pub mod ws;
