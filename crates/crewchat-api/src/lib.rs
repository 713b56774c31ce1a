//! # crewchat-api
//!
//! HTTP surface of CrewChat: the WebSocket upgrade for the realtime
//! channel plus the fallback REST routes that mirror its validation, so
//! a client that loses the socket can keep working against the same
//! canonical shapes.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
