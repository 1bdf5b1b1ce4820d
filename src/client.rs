use std::sync::Arc;

use tokio::sync::watch;

use crate::clock::{Clock, SystemClock};
use crate::gateway::AuthGateway;
use crate::pipeline::RequestPipeline;
use crate::session::{SessionEvents, SessionState, SessionStore};
use crate::transport::Transport;

#[cfg(feature = "http")]
use crate::{
    config::ClientConfig,
    error::Error,
    session::{FileSessionStore, MemorySessionStore},
    transport::ReqwestTransport,
};

/// Gateway and pipeline wired to one transport, store and event channel.
///
/// ```rust,ignore
/// use propadmin_auth::{ApiClient, ClientConfig, SessionState};
///
/// let client = ApiClient::from_config(&ClientConfig::from_env()?)?;
/// let mut signed_out = client.subscribe();
///
/// client.gateway().login("alice", "secret1").await?;
/// let projects = client.pipeline().get("api/projects/search").await?;
/// ```
pub struct ApiClient<T> {
    gateway: AuthGateway<T>,
    pipeline: RequestPipeline<T>,
    store: Arc<dyn SessionStore>,
    events: SessionEvents,
}

impl<T: Transport> ApiClient<T> {
    #[must_use]
    pub fn new(transport: T, store: Arc<dyn SessionStore>) -> Self {
        Self::with_clock(transport, store, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(transport: T, store: Arc<dyn SessionStore>, clock: Arc<dyn Clock>) -> Self {
        let initial = if store.read().is_authenticated() {
            SessionState::SignedIn
        } else {
            SessionState::SignedOut
        };
        let events = SessionEvents::new(initial);
        let transport = Arc::new(transport);

        Self {
            gateway: AuthGateway::new(
                transport.clone(),
                store.clone(),
                clock.clone(),
                events.clone(),
            ),
            pipeline: RequestPipeline::new(transport, store.clone(), clock, events.clone()),
            store,
            events,
        }
    }

    #[must_use]
    pub fn with_resend_cooldown(mut self, cooldown: std::time::Duration) -> Self {
        self.gateway = self.gateway.with_resend_cooldown(cooldown);
        self
    }

    #[must_use]
    pub fn gateway(&self) -> &AuthGateway<T> {
        &self.gateway
    }

    #[must_use]
    pub fn pipeline(&self) -> &RequestPipeline<T> {
        &self.pipeline
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    #[must_use]
    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    /// Sign-in/sign-out transitions for the application shell.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.events.subscribe()
    }
}

#[cfg(feature = "http")]
impl ApiClient<ReqwestTransport> {
    /// reqwest transport plus a file-backed store when a session file is
    /// configured, in-memory otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, Error> {
        let transport = ReqwestTransport::new(config)?;
        let store: Arc<dyn SessionStore> = match config.session_file() {
            Some(path) => Arc::new(FileSessionStore::open(path)),
            None => Arc::new(MemorySessionStore::new()),
        };
        Ok(Self::new(transport, store).with_resend_cooldown(config.resend_cooldown()))
    }
}
