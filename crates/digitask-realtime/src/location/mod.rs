//! Device location bridged onto the tracking stream.
//!
//! A [`LocationProvider`] runs a continuous watch; the [`LocationPublisher`]
//! forwards each sample as a `location_update` frame while the tracking
//! stream is open and drops it otherwise. Samples are never buffered.

mod publisher;
mod types;

pub use publisher::LocationPublisher;
pub use types::{LocationError, LocationProvider, PresenceSample, WatchOptions};
