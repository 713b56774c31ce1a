//! # crewchat-client
//!
//! Client-side building blocks shared by CrewChat frontends: the
//! reconciliation layer that merges optimistic local sends with canonical
//! server echoes, and the reconnect backoff policy for the realtime
//! channel. Transport-free by design, so it is usable from any frontend
//! (and fully testable without a server).

pub mod reconcile;
pub mod reconnect;

pub use reconcile::{Applied, ChatRecord, ConversationView, PendingMessage, Slot};
pub use reconnect::{ReconnectPolicy, ReconnectSchedule};
