//! Real-time chat engine configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) chat engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Maximum WebSocket connections per user (extra tabs evict the oldest).
    #[serde(default = "default_max_connections_per_user")]
    pub max_connections_per_user: usize,
    /// Per-connection outbound event buffer size.
    #[serde(default = "default_event_buffer")]
    pub event_buffer_size: usize,
    /// Seconds after which a typing signal with no stop event is expired
    /// server-side.
    #[serde(default = "default_typing_ttl")]
    pub typing_ttl_seconds: u64,
    /// Interval of the stale-typing sweep task in seconds.
    #[serde(default = "default_typing_sweep")]
    pub typing_sweep_interval_seconds: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            max_connections_per_user: default_max_connections_per_user(),
            event_buffer_size: default_event_buffer(),
            typing_ttl_seconds: default_typing_ttl(),
            typing_sweep_interval_seconds: default_typing_sweep(),
        }
    }
}

fn default_max_connections_per_user() -> usize {
    5
}

fn default_event_buffer() -> usize {
    256
}

fn default_typing_ttl() -> u64 {
    6
}

fn default_typing_sweep() -> u64 {
    2
}
