//! Shared HTTP plumbing for the service clients.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;

use crate::error::{Result, ServiceError};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest error body kept in [`ServiceError::Status`].
const MAX_ERROR_BODY: usize = 512;

const USER_AGENT_VALUE: &str = concat!("fieldsched/", env!("CARGO_PKG_VERSION"));

/// Settings shared by every client.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Project key sent as `apikey` to the hosted backend.
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl HttpSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a blocking client carrying the user agent and `apikey` headers.
    pub fn build_client(&self) -> Result<Client> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        if let Some(key) = &self.api_key {
            headers.insert(
                HeaderName::from_static("apikey"),
                header_value("apikey", key)?,
            );
        }

        Client::builder()
            .default_headers(headers)
            .timeout(self.timeout)
            .build()
            .map_err(ServiceError::Client)
    }
}

/// Join a base URL and a path without doubling the slash.
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

pub(crate) fn header_value(name: &'static str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| ServiceError::InvalidHeader(name))
}

/// Attach a bearer token. Falls back to the project key when there is no
/// session, which is how the hosted backend identifies anonymous callers.
pub(crate) fn authorize(
    request: RequestBuilder,
    token: Option<&str>,
    settings: &HttpSettings,
) -> Result<RequestBuilder> {
    match token.or(settings.api_key.as_deref()) {
        Some(token) => Ok(request.header(
            AUTHORIZATION,
            header_value("authorization", &format!("Bearer {token}"))?,
        )),
        None => Ok(request),
    }
}

pub(crate) fn send(url: &str, request: RequestBuilder) -> Result<Response> {
    request.send().map_err(|source| ServiceError::Network {
        url: url.to_string(),
        source,
    })
}

/// Read the body of a response, turning non-success statuses into errors.
pub(crate) fn read_body(url: &str, response: Response) -> Result<String> {
    let status = response.status();
    let body = response.text().map_err(|source| ServiceError::Network {
        url: url.to_string(),
        source,
    })?;

    if !status.is_success() {
        tracing::debug!(url, status = status.as_u16(), "service returned an error");
        return Err(ServiceError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            body: truncate(body),
        });
    }
    Ok(body)
}

/// Read and decode a JSON response.
pub(crate) fn read_json<T: DeserializeOwned>(url: &str, response: Response) -> Result<T> {
    let body = read_body(url, response)?;
    serde_json::from_str(&body).map_err(|source| ServiceError::Decode {
        url: url.to_string(),
        source,
    })
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push_str("...");
    }
    body
}
