//! HTTP client struct, URL joining, and response checking.

use std::time::Duration;

use digitask_common::{ApiError, AuthSession};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error_body::message_from_body;

/// REST client for the Digitask backend.
#[derive(Clone)]
pub struct HttpBackend {
    base_url: Url,
    auth: AuthSession,
    http: reqwest::Client,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.base_url.as_str())
            .field("auth", &self.auth)
            .finish()
    }
}

impl HttpBackend {
    pub fn new(
        base_url: &str,
        auth: AuthSession,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let base_url = normalize_base(base_url)?;
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            base_url,
            auth,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Join an endpoint path onto the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, ApiError> {
        join_url(&self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let token = self.auth.token().ok_or(ApiError::NotAuthenticated)?;
        let url = self.url(path)?;
        debug!(%method, path, "Backend request");
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .request(Method::GET, path)?
            .send()
            .await
            .map_err(map_transport_error)?;
        let response = check_status(response).await?;
        response.json::<T>().await.map_err(map_transport_error)
    }

    /// POST a JSON body and ignore whatever the backend answers on success.
    pub(crate) async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let response = self
            .request(Method::POST, path)?
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;
        check_status(response).await?;
        Ok(())
    }
}

/// Parse the API base: `http`/`https`, a host, no credentials, and a
/// trailing `/` so endpoint paths join under it.
fn normalize_base(base_url: &str) -> Result<Url, ApiError> {
    let mut url = Url::parse(base_url.trim())
        .map_err(|e| ApiError::InvalidUrl(format!("base URL: {e}")))?;
    if !url.username().is_empty() || url.password().is_some() {
        return Err(ApiError::InvalidUrl("base URL must not embed credentials".into()));
    }
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::InvalidUrl(format!(
            "base URL scheme {:?} is not http or https",
            url.scheme()
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ApiError::InvalidUrl("base URL has no host".into()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

pub(crate) fn join_url(base: &Url, path: &str) -> Result<Url, ApiError> {
    base.join(path.trim_start_matches('/'))
        .map_err(|e| ApiError::InvalidUrl(format!("{path}: {e}")))
}

fn map_transport_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else if e.is_decode() {
        ApiError::Parse(e.to_string())
    } else {
        ApiError::Network(e.to_string())
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = message_from_body(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });
    warn!(status = status.as_u16(), %message, "Backend request failed");
    Err(status_error(status, message))
}

pub(crate) fn status_error(status: StatusCode, message: String) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(message),
        _ => ApiError::Status {
            status: status.as_u16(),
            message,
        },
    }
}
