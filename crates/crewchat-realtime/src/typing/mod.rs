//! Typing-indicator relay.

pub mod relay;

pub use relay::{TypingRelay, TypingScope};
