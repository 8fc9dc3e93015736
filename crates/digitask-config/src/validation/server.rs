//! Validation for the `[server]` section.

use crate::schema::DigitaskConfig;

use super::helpers::{validate_range, validate_url};

pub(crate) fn validate_server(errors: &mut Vec<String>, config: &DigitaskConfig) {
    let server = &config.server;
    validate_url(
        errors,
        "server.api_base_url",
        &server.api_base_url,
        &["http", "https"],
    );
    if !server.ws_base_url.trim().is_empty() {
        validate_url(errors, "server.ws_base_url", &server.ws_base_url, &["ws", "wss"]);
    }
    validate_range(
        errors,
        "server.request_timeout_secs",
        server.request_timeout_secs,
        1,
        300,
    );
}
