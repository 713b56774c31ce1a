//! # crewchat-realtime
//!
//! Real-time chat engine for CrewChat. Provides:
//!
//! - WebSocket connection lifecycle with per-user fan-out
//! - In-memory presence directory (online iff connection count > 0)
//! - Typed bidirectional event protocol (no string dispatch)
//! - Direct and group message routing with membership-scoped fan-out
//! - Typing-indicator relay with server-side staleness expiry
//!
//! The engine is transport-agnostic: the API crate owns the WebSocket
//! upgrade and pumps raw frames into [`router::ChatRouter`].

pub mod connection;
pub mod error;
pub mod event;
pub mod presence;
pub mod room;
pub mod router;
pub mod server;
pub mod typing;

pub use connection::manager::ConnectionManager;
pub use connection::pool::ConnectionPool;
pub use error::ChatError;
pub use event::{ClientEvent, ServerEvent};
pub use presence::directory::PresenceDirectory;
pub use room::registry::RoomRegistry;
pub use router::ChatRouter;
pub use server::ChatEngine;
pub use typing::relay::TypingRelay;
