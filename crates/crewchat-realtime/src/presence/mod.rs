//! User presence, derived from live connection counts.

pub mod directory;

pub use directory::PresenceDirectory;
