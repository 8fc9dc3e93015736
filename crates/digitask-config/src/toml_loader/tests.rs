//! Tests for TOML config loading, creation, and path resolution.

use super::*;
use std::path::Path;

#[test]
fn load_from_nonexistent_returns_file_not_found() {
    let result = load_from_path(Path::new("/tmp/nonexistent_digitask_config.toml"));
    let err = result.unwrap_err();
    assert!(matches!(err, digitask_common::ConfigError::FileNotFound(_)));
}

#[test]
fn load_valid_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[server]
api_base_url = "https://app.digitask.store/api/"

[location]
timeout_ms = 10000
"#,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.server.api_base_url, "https://app.digitask.store/api/");
    assert_eq!(config.location.timeout_ms, 10000);
    // Defaults preserved
    assert_eq!(config.realtime.reconnect_delay_ms, 5000);
    assert_eq!(
        config.server.resolved_ws_base().as_deref(),
        Some("wss://app.digitask.store")
    );
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is not valid toml {{{").unwrap();

    let err = load_from_path(&path).unwrap_err();
    assert!(matches!(err, digitask_common::ConfigError::ParseError(_)));
}

#[test]
fn load_config_with_invalid_values_is_returned_as_parsed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[realtime]\nreconnect_delay_ms = 0\n").unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.realtime.reconnect_delay_ms, 0);
}

#[test]
fn create_and_load_default_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("digitask").join("config.toml");

    create_default_config(&path).unwrap();
    assert!(path.exists());

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.server.api_base_url, "http://127.0.0.1:8000/api/");
    assert_eq!(config.realtime.dedup_window, 256);
}

#[test]
fn default_template_is_all_comments_and_tables() {
    let parsed: crate::schema::DigitaskConfig =
        toml::from_str(super::template::default_config_toml()).unwrap();
    assert_eq!(parsed.location.maximum_age_ms, 5000);
}

#[test]
fn config_path_defaults_under_platform_dir() {
    let path = paths::resolve_config_path(None, Some("/home/tech/.config".into())).unwrap();
    assert_eq!(path, Path::new("/home/tech/.config/digitask/config.toml"));
}

#[test]
fn config_path_env_override_wins() {
    let path = paths::resolve_config_path(
        Some("/etc/digitask.toml".into()),
        Some("/home/tech/.config".into()),
    )
    .unwrap();
    assert_eq!(path, Path::new("/etc/digitask.toml"));

    let empty = paths::resolve_config_path(Some("".into()), Some("/cfg".into())).unwrap();
    assert_eq!(empty, Path::new("/cfg/digitask/config.toml"));
}

#[test]
fn config_path_without_platform_dir_fails() {
    assert!(paths::resolve_config_path(None, None).is_err());
}
