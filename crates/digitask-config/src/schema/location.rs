//! Device location watch options.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub high_accuracy: bool,
    /// Oldest cached fix the provider may hand back.
    pub maximum_age_ms: u64,
    /// How long a single fix may take before it is reported as a timeout.
    pub timeout_ms: u64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            maximum_age_ms: 5000,
            timeout_ms: 20000,
        }
    }
}

impl LocationConfig {
    pub fn maximum_age(&self) -> Duration {
        Duration::from_millis(self.maximum_age_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
