//! Digitask client configuration.
//!
//! TOML-based configuration with full validation. All config sections use
//! sensible defaults so partial configs work out of the box.

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{DigitaskConfig, CONFIG_SCHEMA_VERSION};
pub use toml_loader::{load_default, load_from_path};

use digitask_common::ConfigError;
use std::path::Path;

/// Load config from an explicit path if given, otherwise from the platform
/// default path, then validate the result.
pub fn load_config(path: Option<&Path>) -> Result<DigitaskConfig, ConfigError> {
    let config = match path {
        Some(path) => toml_loader::load_from_path(path)?,
        None => toml_loader::load_default()?,
    };
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &DigitaskConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_to_json_contains_all_sections() {
        let json = config_to_json(&DigitaskConfig::default());
        assert!(json.contains("\"server\""));
        assert!(json.contains("\"realtime\""));
        assert!(json.contains("\"location\""));
        assert!(json.contains("\"logging\""));
    }

    #[test]
    fn config_schema_version_is_1() {
        assert_eq!(CONFIG_SCHEMA_VERSION, 1);
    }

    #[test]
    fn load_config_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\napi_base_url = \"\"\n").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn load_config_accepts_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[logging]\nlevel = \"debug\"\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.logging.level, schema::LogLevel::Debug);
    }
}
