//! Direct and group message entities.

pub mod model;

pub use model::{DirectMessage, GroupMessage, NewDirectMessage, NewGroupMessage};
