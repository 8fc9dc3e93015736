//! Tests for the full validation pipeline.

use super::*;
use crate::schema::*;

#[test]
fn default_config_validates() {
    let config = DigitaskConfig::default();
    assert!(validate(&config).is_ok());
}

#[test]
fn catches_empty_api_base_url() {
    let mut config = DigitaskConfig::default();
    config.server.api_base_url = "  ".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("server.api_base_url is empty"));
}

#[test]
fn catches_ws_scheme_on_api_base_url() {
    let mut config = DigitaskConfig::default();
    config.server.api_base_url = "ws://127.0.0.1:8000/api/".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("server.api_base_url"));
    assert!(err.contains("http, https"));
}

#[test]
fn catches_http_scheme_on_ws_base_url() {
    let mut config = DigitaskConfig::default();
    config.server.ws_base_url = "http://127.0.0.1:8000".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("server.ws_base_url"));
}

#[test]
fn accepts_explicit_wss_base() {
    let mut config = DigitaskConfig::default();
    config.server.ws_base_url = "wss://app.digitask.store".into();
    assert!(validate(&config).is_ok());
}

#[test]
fn catches_missing_host() {
    let mut config = DigitaskConfig::default();
    config.server.api_base_url = "http://:8000/api/".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("has no host"));
}

#[test]
fn catches_credentials_without_echoing_them() {
    let mut config = DigitaskConfig::default();
    config.server.api_base_url = "http://user:pw@127.0.0.1:8000/api/".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("server.api_base_url must not embed credentials"));
    assert!(!err.contains("pw"));

    let mut config = DigitaskConfig::default();
    config.server.ws_base_url = "wss://token@realtime.example.com".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("server.ws_base_url must not embed credentials"));

    let mut config = DigitaskConfig::default();
    config.server.api_base_url = "ftp://user:pw@127.0.0.1/".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(!err.contains("pw"));
}

#[test]
fn accepts_uppercase_scheme() {
    let mut config = DigitaskConfig::default();
    config.server.api_base_url = "HTTPS://app.digitask.store/api/".into();
    assert!(validate(&config).is_ok());
}

#[test]
fn catches_garbage_url() {
    let mut config = DigitaskConfig::default();
    config.server.api_base_url = "not a url".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("is not a URL"));
}

#[test]
fn catches_zero_reconnect_delay() {
    let mut config = DigitaskConfig::default();
    config.realtime.reconnect_delay_ms = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("realtime.reconnect_delay_ms"));
}

#[test]
fn catches_zero_event_buffer() {
    let mut config = DigitaskConfig::default();
    config.realtime.event_buffer = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("realtime.event_buffer"));
}

#[test]
fn dedup_window_zero_is_allowed() {
    let mut config = DigitaskConfig::default();
    config.realtime.dedup_window = 0;
    assert!(validate(&config).is_ok());
}

#[test]
fn catches_zero_location_timeout() {
    let mut config = DigitaskConfig::default();
    config.location.timeout_ms = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("location.timeout_ms"));
}

#[test]
fn collects_multiple_errors() {
    let mut config = DigitaskConfig::default();
    config.realtime.connect_timeout_secs = 0;
    config.server.request_timeout_secs = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("realtime.connect_timeout_secs"));
    assert!(err.contains("server.request_timeout_secs"));
    assert!(err.contains("; "));
}
