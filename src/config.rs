use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::Error;

/// Per-call timeout applied by the HTTP transport.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Wait between OTP resends.
pub const DEFAULT_RESEND_COOLDOWN: Duration = Duration::from_secs(60);

/// Back-office API client configuration.
///
/// The base URL is the only required field and is a constructor parameter.
///
/// ```rust,ignore
/// use propadmin_auth::ClientConfig;
///
/// let config = ClientConfig::new("http://192.168.88.112:8080".parse()?)
///     .with_timeout(std::time::Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ClientConfig {
    pub(crate) base_url: Url,
    pub(crate) timeout: Duration,
    pub(crate) resend_cooldown: Duration,
    pub(crate) session_file: Option<PathBuf>,
}

impl ClientConfig {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            resend_cooldown: DEFAULT_RESEND_COOLDOWN,
            session_file: None,
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `PROPADMIN_API_URL`: backend base URL
    ///
    /// # Optional env vars
    /// - `PROPADMIN_TIMEOUT_SECS`: per-call timeout (default 10)
    /// - `PROPADMIN_RESEND_COOLDOWN_SECS`: OTP resend cooldown (default 60)
    /// - `PROPADMIN_SESSION_FILE`: where [`FileSessionStore`](crate::session::FileSessionStore) persists
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the URL is missing or a number fails to parse,
    /// and [`Error::Url`] if the URL is malformed.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the URL is missing or a number fails to parse,
    /// and [`Error::Url`] if the URL is malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let base_url_str = lookup("PROPADMIN_API_URL")
            .ok_or_else(|| Error::Config("PROPADMIN_API_URL is required".into()))?;
        let base_url: Url = base_url_str.trim().parse()?;

        let mut config = Self::new(base_url);

        if let Some(secs) = lookup("PROPADMIN_TIMEOUT_SECS") {
            config = config.with_timeout(parse_secs("PROPADMIN_TIMEOUT_SECS", &secs)?);
        }
        if let Some(secs) = lookup("PROPADMIN_RESEND_COOLDOWN_SECS") {
            config = config
                .with_resend_cooldown(parse_secs("PROPADMIN_RESEND_COOLDOWN_SECS", &secs)?);
        }
        if let Some(path) = lookup("PROPADMIN_SESSION_FILE") {
            config = config.with_session_file(path);
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_resend_cooldown(mut self, cooldown: Duration) -> Self {
        self.resend_cooldown = cooldown;
        self
    }

    #[must_use]
    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = Some(path.into());
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn resend_cooldown(&self) -> Duration {
        self.resend_cooldown
    }

    #[must_use]
    pub fn session_file(&self) -> Option<&std::path::Path> {
        self.session_file.as_deref()
    }
}

fn parse_secs(key: &str, value: &str) -> Result<Duration, Error> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| Error::Config(format!("{key}: {e}")))
}
