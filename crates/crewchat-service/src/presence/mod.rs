//! Presence snapshots for the HTTP surface.

pub mod service;

pub use service::{PresenceService, PresenceSnapshot};
