//! Network seam between the auth core and the wire.

#[cfg(feature = "http")]
mod http;

use std::future::Future;

use url::Url;

use crate::api::{ApiRequest, ApiResponse};
use crate::outcome::AuthError;

#[cfg(feature = "http")]
pub use http::ReqwestTransport;

/// No response was received.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("server unreachable: {0}")]
    Unreachable(String),
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

impl From<TransportError> for AuthError {
    fn from(e: TransportError) -> Self {
        Self::Network(e.to_string())
    }
}

/// Executes one request. Any HTTP status is a response, not an error.
///
/// # Example
///
/// ```rust,ignore
/// struct Offline;
///
/// impl Transport for Offline {
///     async fn send(&self, _request: ApiRequest) -> Result<ApiResponse, TransportError> {
///         Err(TransportError::Unreachable("offline".into()))
///     }
/// }
/// ```
pub trait Transport: Send + Sync + 'static {
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, TransportError>> + Send;
}

/// Joins a relative API path onto the base URL and appends query pairs.
///
/// A leading `/` on `path` is ignored, so the base URL's own path prefix is kept.
///
/// # Errors
///
/// Returns [`TransportError::InvalidUrl`] if the path does not form a valid URL.
pub fn resolve_url(
    base: &Url,
    path: &str,
    query: &[(String, String)],
) -> Result<Url, TransportError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    let mut url = base
        .join(path.trim_start_matches('/'))
        .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(s: &str) -> Url {
        s.parse().unwrap()
    }

    #[test]
    fn joins_relative_and_absolute_paths() {
        let b = base("http://192.168.88.112:8080");
        assert_eq!(
            resolve_url(&b, "auth/login", &[]).unwrap().as_str(),
            "http://192.168.88.112:8080/auth/login"
        );
        assert_eq!(
            resolve_url(&b, "/api/projects/1", &[]).unwrap().as_str(),
            "http://192.168.88.112:8080/api/projects/1"
        );
    }

    #[test]
    fn keeps_base_path_prefix() {
        let b = base("http://example.com/backoffice");
        assert_eq!(
            resolve_url(&b, "/auth/refresh", &[]).unwrap().as_str(),
            "http://example.com/backoffice/auth/refresh"
        );
    }

    #[test]
    fn appends_query_pairs() {
        let b = base("http://example.com/");
        let url = resolve_url(
            &b,
            "api/projects/search",
            &[
                ("page".to_string(), "0".to_string()),
                ("keyword".to_string(), "Hải Châu".to_string()),
            ],
        )
        .unwrap();
        assert_eq!(url.path(), "/api/projects/search");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("page".to_string(), "0".to_string()),
                ("keyword".to_string(), "Hải Châu".to_string()),
            ]
        );
    }
}
