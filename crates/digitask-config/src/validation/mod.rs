//! Full configuration validation.
//!
//! Each section has its own submodule; this orchestrator calls them all
//! and collects errors into a single `ConfigError`.

mod helpers;
mod realtime;
mod server;

#[cfg(test)]
mod tests;

use crate::schema::DigitaskConfig;
use digitask_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &DigitaskConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    server::validate_server(&mut errors, config);
    realtime::validate_realtime(&mut errors, config);
    realtime::validate_location(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
