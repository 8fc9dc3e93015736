//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> &'static str {
    r##"# Digitask realtime client configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[server]
# api_base_url = "http://127.0.0.1:8000/api/"
# ws_base_url = ""            # empty: derived from api_base_url (http -> ws, https -> wss)
# request_timeout_secs = 30   # 1-300

[realtime]
# reconnect_delay_ms = 5000   # fixed delay between reconnect attempts
# connect_timeout_secs = 15   # 1-120
# event_buffer = 256          # per-stream event channel capacity
# dedup_window = 256          # recent push ids remembered; 0 disables dedup

[location]
# high_accuracy = true
# maximum_age_ms = 5000       # oldest cached fix accepted
# timeout_ms = 20000          # per-fix timeout

[logging]
# level = "info"              # trace, debug, info, warn, error
"##
}
