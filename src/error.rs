/// Infrastructure errors: configuration, URL handling and HTTP client setup.
///
/// Per-call auth failures are reported through [`AuthError`](crate::AuthError) instead.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
