//! Backend endpoint configuration.

use serde::{Deserialize, Serialize};
use url::Url;

/// Where the REST API and WebSocket streams live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the REST API; relative endpoint paths are joined onto it.
    pub api_base_url: String,
    /// Base URL for WebSocket streams (`ws://` or `wss://`). When empty it is
    /// derived from `api_base_url` by swapping the scheme and dropping the path.
    pub ws_base_url: String,
    /// Per-request timeout for REST calls.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000/api/".into(),
            ws_base_url: String::new(),
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    /// The WebSocket base actually used: the explicit `ws_base_url`, or one
    /// derived from the API base (`https` → `wss`, `http` → `ws`).
    pub fn resolved_ws_base(&self) -> Option<String> {
        let explicit = self.ws_base_url.trim();
        if !explicit.is_empty() {
            let url = Url::parse(explicit).ok()?;
            if !matches!(url.scheme(), "ws" | "wss") || !is_plain_host(&url) {
                return None;
            }
            return Some(url.as_str().trim_end_matches('/').to_string());
        }
        ws_base_from_http(&self.api_base_url)
    }
}

/// Derive `ws[s]://host[:port]` from an `http[s]://` URL. The path, query,
/// and fragment are dropped. URLs without a host or with credentials
/// yield `None`.
pub fn ws_base_from_http(http_url: &str) -> Option<String> {
    let mut url = Url::parse(http_url.trim()).ok()?;
    let ws_scheme = match url.scheme() {
        "https" => "wss",
        "http" => "ws",
        _ => return None,
    };
    if !is_plain_host(&url) {
        return None;
    }
    url.set_scheme(ws_scheme).ok()?;
    url.set_path("/");
    url.set_query(None);
    url.set_fragment(None);
    Some(url.as_str().trim_end_matches('/').to_string())
}

/// Has a non-empty host and no userinfo.
pub(crate) fn is_plain_host(url: &Url) -> bool {
    url.host_str().is_some_and(|host| !host.is_empty())
        && url.username().is_empty()
        && url.password().is_none()
}
