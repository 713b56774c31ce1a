//! Typing signal bookkeeping.
//!
//! Typing indicators are a pure relay, never persisted. The relay keeps
//! just enough state to expire signals whose `stop` event was lost (tab
//! crash, dropped frame): a background sweep emits the matching stop once
//! a signal outlives the configured TTL. Clients keep their own short
//! debounce on top of this.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crewchat_core::types::{GroupId, UserId};

/// Where a typing signal is aimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypingScope {
    /// Typing in a one-to-one conversation.
    Direct {
        /// Who is typing.
        from: UserId,
        /// The peer being typed at.
        to: UserId,
    },
    /// Typing in a group conversation.
    Group {
        /// The group.
        group_id: GroupId,
        /// Who is typing.
        from: UserId,
    },
}

/// Active typing signal with the state needed to synthesize its stop event.
#[derive(Debug, Clone)]
pub struct TypingEntry {
    /// The scope of the signal.
    pub scope: TypingScope,
    /// Display name of the typist (group stop events carry it).
    pub user_name: String,
    started_at: Instant,
}

/// Tracks in-flight typing signals.
#[derive(Debug, Default)]
pub struct TypingRelay {
    active: DashMap<TypingScope, (Instant, String)>,
}

impl TypingRelay {
    /// Creates an empty relay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a typing start (or refreshes an existing one).
    pub fn start(&self, scope: TypingScope, user_name: &str) {
        self.active
            .insert(scope, (Instant::now(), user_name.to_string()));
    }

    /// Clears a typing signal. Returns `false` when no signal was active.
    pub fn stop(&self, scope: &TypingScope) -> bool {
        self.active.remove(scope).is_some()
    }

    /// Drops every signal owned by a user (disconnect path).
    pub fn clear_user(&self, user_id: &UserId) {
        self.active.retain(|scope, _| match scope {
            TypingScope::Direct { from, .. } | TypingScope::Group { from, .. } => from != user_id,
        });
    }

    /// Removes and returns every signal older than `ttl`.
    pub fn expire_stale(&self, ttl: Duration) -> Vec<TypingEntry> {
        let now = Instant::now();
        let stale: Vec<TypingEntry> = self
            .active
            .iter()
            .filter(|entry| now.duration_since(entry.value().0) >= ttl)
            .map(|entry| TypingEntry {
                scope: *entry.key(),
                user_name: entry.value().1.clone(),
                started_at: entry.value().0,
            })
            .collect();

        for entry in &stale {
            // Only remove if not refreshed since the snapshot.
            self.active
                .remove_if(&entry.scope, |_, (at, _)| *at == entry.started_at);
        }
        stale
    }

    /// Number of active signals.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}
