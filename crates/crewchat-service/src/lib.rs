//! # crewchat-service
//!
//! Business logic for CrewChat. Services sit between the HTTP/WebSocket
//! surface and the stores, and share validation with the realtime router
//! so the HTTP fallback rejects exactly what the socket path rejects.

pub mod chat;
pub mod context;
pub mod group;
pub mod presence;

pub use chat::ChatService;
pub use context::RequestContext;
pub use group::GroupService;
pub use presence::PresenceService;
