//! Reading a config file into [`DigitaskConfig`].

use std::io::ErrorKind;
use std::path::Path;

use digitask_common::ConfigError;
use tracing::{debug, info};

use super::paths::{create_default_config, default_config_path};
use crate::schema::DigitaskConfig;

/// Parse the TOML file at `path`. Missing keys take their defaults.
///
/// Values are not validated here; [`crate::load_config`] does that.
pub fn load_from_path(path: &Path) -> Result<DigitaskConfig, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        Err(e) => {
            return Err(ConfigError::ParseError(format!(
                "cannot read {}: {e}",
                path.display()
            )));
        }
    };

    let config = toml::from_str::<DigitaskConfig>(&content)
        .map_err(|e| ConfigError::ParseError(format!("{}: {e}", path.display())))?;
    debug!(path = %path.display(), "Config loaded");
    Ok(config)
}

/// Load from [`default_config_path`]. A missing file is created from the
/// documented template and defaults are returned.
pub fn load_default() -> Result<DigitaskConfig, ConfigError> {
    let path = default_config_path()?;
    match load_from_path(&path) {
        Err(ConfigError::FileNotFound(_)) => {
            info!(path = %path.display(), "No config file; writing defaults");
            create_default_config(&path)?;
            Ok(DigitaskConfig::default())
        }
        other => other,
    }
}
