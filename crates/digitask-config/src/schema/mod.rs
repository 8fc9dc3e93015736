//! Configuration schema types for the Digitask realtime client.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod location;
mod logging;
mod realtime;
mod server;

pub use location::*;
pub use logging::*;
pub use realtime::*;
pub use server::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DigitaskConfig {
    pub server: ServerConfig,
    pub realtime: RealtimeConfig,
    pub location: LocationConfig,
    pub logging: LoggingConfig,
}
