use std::time::Duration;

use chrono::{DateTime, Utc};
use digitask_config::schema::LocationConfig;
use tokio::sync::mpsc;

/// One position fix.
#[derive(Debug, Clone, PartialEq)]
pub struct PresenceSample {
    pub latitude: f64,
    pub longitude: f64,
    pub captured_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    pub high_accuracy: bool,
    /// Oldest cached fix the provider may return.
    pub maximum_age: Duration,
    /// Longest a single fix may take before it is reported as a timeout.
    pub timeout: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            maximum_age: Duration::from_millis(5000),
            timeout: Duration::from_millis(20000),
        }
    }
}

impl From<&LocationConfig> for WatchOptions {
    fn from(config: &LocationConfig) -> Self {
        Self {
            high_accuracy: config.high_accuracy,
            maximum_age: config.maximum_age(),
            timeout: config.timeout(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("position unavailable: {0}")]
    PositionUnavailable(String),

    #[error("no position fix within {0:?}")]
    Timeout(Duration),
}

/// Source of a continuous location watch.
///
/// The watch runs until the returned receiver is dropped; providers must
/// stop producing once a send fails.
pub trait LocationProvider: Send + Sync {
    fn watch(&self, options: WatchOptions) -> mpsc::Receiver<Result<PresenceSample, LocationError>>;
}
