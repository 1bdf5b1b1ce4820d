//! Credential state shared by the gateway and the request pipeline.
//!
//! A [`SessionStore`] is the single source of truth for the current tokens.
//! Only [`AuthGateway`](crate::AuthGateway) and
//! [`RequestPipeline`](crate::RequestPipeline) write to it.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use propadmin_auth::session::{FileSessionStore, SessionStore};
//!
//! let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::open("session.json"));
//! if store.read().is_authenticated() {
//!     // resume
//! }
//! ```

mod events;
mod file;
mod memory;

use serde::{Deserialize, Serialize};

use crate::types::{AccessToken, EpochMillis, RefreshToken};

pub use events::{SessionEvents, SessionState};
pub use file::FileSessionStore;
pub use memory::MemorySessionStore;

/// Snapshot of the stored credentials. The default value is "logged out".
///
/// Serialized with the persisted key names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "authToken", default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<AccessToken>,
    #[serde(rename = "refreshToken", default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<RefreshToken>,
    /// Epoch milliseconds after which `access_token` must not be sent.
    #[serde(rename = "tokenExpiredAt", default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<EpochMillis>,
    /// Login identifier of the signed-in user.
    #[serde(rename = "user", default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

impl Session {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none()
            && self.refresh_token.is_none()
            && self.expires_at.is_none()
            && self.identifier.is_none()
    }

    /// A credential is held, usable now or after a silent refresh.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some() || self.refresh_token.is_some()
    }
}

/// True iff an access token is present and `now < expires_at`.
///
/// An access token without an expiry counts as stale.
#[must_use]
pub fn is_access_token_valid(session: &Session, now: EpochMillis) -> bool {
    match (&session.access_token, session.expires_at) {
        (Some(_), Some(expires_at)) => now < expires_at,
        _ => false,
    }
}

/// Persisted credential state.
///
/// Implementors provide [`read`](Self::read) and [`update`](Self::update);
/// `update` must apply the closure and persist the result as one step, so no
/// caller observes a half-written session.
pub trait SessionStore: Send + Sync + 'static {
    /// Current state. Never fails; an empty [`Session`] means logged out.
    fn read(&self) -> Session;

    /// Applies `f` to the stored session atomically.
    fn update(&self, f: &mut dyn FnMut(&mut Session));

    /// Replaces the token triple. The stored identifier is kept.
    fn write(
        &self,
        access_token: AccessToken,
        refresh_token: Option<RefreshToken>,
        expires_at: Option<EpochMillis>,
    ) {
        let mut tokens = Some((access_token, refresh_token, expires_at));
        self.update(&mut |session| {
            if let Some((access, refresh, expires)) = tokens.take() {
                session.access_token = Some(access);
                session.refresh_token = refresh;
                session.expires_at = expires;
            }
        });
    }

    /// Replaces the whole record.
    fn write_session(&self, session: Session) {
        let mut next = Some(session);
        self.update(&mut |current| {
            if let Some(next) = next.take() {
                *current = next;
            }
        });
    }

    /// Removes every field. Idempotent.
    fn clear(&self) {
        self.update(&mut |session| *session = Session::default());
    }
}
