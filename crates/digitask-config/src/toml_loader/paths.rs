//! Where the config file lives, and writing the documented default.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use digitask_common::ConfigError;
use tracing::info;

use super::template::default_config_toml;

/// Overrides the default config location when set and non-empty.
pub const CONFIG_PATH_ENV: &str = "DIGITASK_CONFIG";

/// `$DIGITASK_CONFIG`, else `<config_dir>/digitask/config.toml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    resolve_config_path(std::env::var_os(CONFIG_PATH_ENV), dirs::config_dir())
}

pub(crate) fn resolve_config_path(
    env_override: Option<OsString>,
    config_dir: Option<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    if let Some(path) = env_override.filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    config_dir
        .map(|dir| dir.join("digitask").join("config.toml"))
        .ok_or_else(|| ConfigError::ParseError("no platform config directory".into()))
}

/// Write the commented default config to `path`, creating parent dirs.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    let io_error = |e: std::io::Error| {
        ConfigError::ParseError(format!("cannot write {}: {e}", path.display()))
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    std::fs::write(path, default_config_toml()).map_err(io_error)?;
    info!(path = %path.display(), "Wrote default config");
    Ok(())
}
