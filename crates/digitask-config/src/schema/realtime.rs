//! Realtime connection tuning.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtimeConfig {
    /// Fixed delay before a dropped stream reconnects. Not exponential.
    pub reconnect_delay_ms: u64,
    /// Upper bound on a single WebSocket handshake.
    pub connect_timeout_secs: u64,
    /// Capacity of each stream's event channel.
    pub event_buffer: usize,
    /// Number of recent push ids remembered for deduplication. 0 disables it.
    pub dedup_window: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: 5000,
            connect_timeout_secs: 15,
            event_buffer: 256,
            dedup_window: 256,
        }
    }
}

impl RealtimeConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
