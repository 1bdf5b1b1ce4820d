use serde_json::Value as JsonValue;
use url::Url;

use super::{Transport, TransportError, resolve_url};
use crate::api::{ApiRequest, ApiResponse, Method};
use crate::config::ClientConfig;
use crate::error::Error;

/// [`Transport`] over `reqwest`, with the configured per-call timeout.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    base_url: Url,
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            base_url: config.base_url.clone(),
            http,
        })
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    ///
    /// The client's own timeout settings apply instead of the configured one.
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = resolve_url(&self.base_url, &request.path, &request.query)?;

        let mut builder = match request.method {
            Method::Get => self.http.get(url),
            Method::Post => self.http.post(url),
            Method::Put => self.http.put(url),
            Method::Delete => self.http.delete(url),
        };
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let http_status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        let body = if bytes.is_empty() {
            JsonValue::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
        };

        tracing::debug!(method = %request.method, path = %request.path, status = http_status, "API response");
        Ok(ApiResponse::new(http_status, body))
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Unreachable(e.to_string())
    }
}
