//! Direct and group messaging over the HTTP fallback path.

pub mod service;

pub use service::ChatService;
