//! Authenticated request pipeline.
//!
//! Every non-auth API call goes through [`RequestPipeline::send`], which
//! decides before dispatch:
//!
//! ```text
//! public path             -> send as-is (no session read)
//! access token still valid -> attach it
//! no refresh token         -> force logout, reject
//! otherwise                -> POST auth/refresh, attach the new token,
//!                             or force logout if refresh fails
//! ```
//!
//! Refreshes are single-flight: concurrent requests that find the token
//! expired wait for one refresh instead of each spending the rotating
//! refresh token.

use std::sync::Arc;

use serde_json::{Value as JsonValue, json};

use crate::api::{ApiRequest, ApiResponse, STATUS_OK, TokenPayload, paths};
use crate::clock::Clock;
use crate::outcome::{AuthError, Outcome};
use crate::session::{Session, SessionEvents, SessionStore, is_access_token_valid};
use crate::transport::Transport;
use crate::types::{AccessToken, EpochMillis, RefreshToken};

/// Path fragments that never carry or require a token.
pub const PUBLIC_PATHS: [&str; 5] = [
    paths::REGISTER,
    paths::LOGIN,
    paths::FORGOT_PASSWORD,
    paths::VERIFY_OTP,
    paths::RESET_PASSWORD,
];

/// Allow-list check by substring, independent of any token state.
#[must_use]
pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.iter().any(|public| path.contains(public))
}

/// What the pipeline attaches to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    Public,
    Bearer(AccessToken),
}

pub struct RequestPipeline<T> {
    transport: Arc<T>,
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    events: SessionEvents,
    refresh_gate: Arc<tokio::sync::Mutex<()>>,
}

// Manual Clone: avoid derive adding a `T: Clone` bound.
impl<T> Clone for RequestPipeline<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            store: self.store.clone(),
            clock: self.clock.clone(),
            events: self.events.clone(),
            refresh_gate: self.refresh_gate.clone(),
        }
    }
}

impl<T: Transport> RequestPipeline<T> {
    #[must_use]
    pub fn new(
        transport: Arc<T>,
        store: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
        events: SessionEvents,
    ) -> Self {
        Self {
            transport,
            store,
            clock,
            events,
            refresh_gate: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Decides how `path` is authorized, refreshing the token if needed.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SessionExpired`] after a forced logout.
    pub async fn authorize(&self, path: &str) -> Outcome<Authorization> {
        if is_public_path(path) {
            return Ok(Authorization::Public);
        }

        let session = self.store.read();
        if let Some(token) = usable_token(&session, self.clock.now_millis()) {
            return Ok(Authorization::Bearer(token));
        }
        if session.refresh_token.is_none() {
            return Err(self.force_logout("no refresh token"));
        }

        self.refresh().await.map(Authorization::Bearer)
    }

    /// Authorizes and dispatches `request`. Any HTTP status is returned as-is.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SessionExpired`] without calling the target when no
    /// credential can be obtained, or [`AuthError::Network`] if no response
    /// arrives.
    pub async fn send(&self, mut request: ApiRequest) -> Outcome<ApiResponse> {
        match self.authorize(&request.path).await? {
            Authorization::Public => {}
            Authorization::Bearer(token) => request.bearer = Some(token),
        }
        Ok(self.transport.send(request).await?)
    }

    /// Like [`send`](Self::send), but maps non-2xx responses to errors and
    /// unwraps an enveloped `data` field.
    ///
    /// # Errors
    ///
    /// Everything [`send`](Self::send) returns, plus [`AuthError::Validation`]
    /// or [`AuthError::Backend`] for non-2xx responses.
    pub async fn fetch(&self, request: ApiRequest) -> Outcome<JsonValue> {
        let method = request.method;
        let path = request.path.clone();
        let response = self.send(request).await?;
        if !response.is_http_success() {
            tracing::debug!(%method, path = %path, status = response.http_status, "API call failed");
            return Err(response.failure("Request failed"));
        }
        Ok(response.into_payload())
    }

    /// # Errors
    ///
    /// See [`fetch`](Self::fetch).
    pub async fn get(&self, path: &str) -> Outcome<JsonValue> {
        self.fetch(ApiRequest::get(path)).await
    }

    /// # Errors
    ///
    /// See [`fetch`](Self::fetch).
    pub async fn post(&self, path: &str, body: JsonValue) -> Outcome<JsonValue> {
        self.fetch(ApiRequest::post(path, body)).await
    }

    /// # Errors
    ///
    /// See [`fetch`](Self::fetch).
    pub async fn put(&self, path: &str, body: Option<JsonValue>) -> Outcome<JsonValue> {
        let mut request = ApiRequest::put(path);
        request.body = body;
        self.fetch(request).await
    }

    /// # Errors
    ///
    /// See [`fetch`](Self::fetch).
    pub async fn delete(&self, path: &str) -> Outcome<JsonValue> {
        self.fetch(ApiRequest::delete(path)).await
    }

    async fn refresh(&self) -> Outcome<AccessToken> {
        let _gate = self.refresh_gate.lock().await;

        // Another request may have refreshed while this one waited.
        let session = self.store.read();
        if let Some(token) = usable_token(&session, self.clock.now_millis()) {
            return Ok(token);
        }
        let Some(refresh_token) = session.refresh_token else {
            return Err(self.force_logout("no refresh token"));
        };

        let request = ApiRequest::post(
            paths::REFRESH,
            json!({ "refreshToken": refresh_token.as_str() }),
        );
        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh unreachable");
                return Err(self.force_logout("refresh unreachable"));
            }
        };
        if !response.is_http_success() || response.status() != STATUS_OK {
            tracing::warn!(
                http_status = response.http_status,
                status = response.status(),
                "Token refresh rejected"
            );
            return Err(self.force_logout("refresh rejected"));
        }
        let Some(payload) = response
            .envelope()
            .data
            .and_then(|data| serde_json::from_value::<TokenPayload>(data).ok())
        else {
            return Err(self.force_logout("malformed refresh payload"));
        };

        let expires_at = payload.expires_at(self.clock.now_millis());
        // Keep the old refresh token if the backend did not rotate it.
        let next_refresh = payload.refresh_token.or_else(|| Some(refresh_token.clone()));
        let stored = self.store_refreshed(
            &refresh_token,
            payload.access_token.clone(),
            next_refresh,
            expires_at,
        );
        if !stored {
            // Logout (or a new login) replaced the session mid-refresh.
            tracing::info!("Session changed during refresh, discarding new tokens");
            return Err(AuthError::SessionExpired);
        }

        tracing::info!(expires_at, "Access token refreshed");
        Ok(payload.access_token)
    }

    /// Writes the new triple only if `spent` is still the stored refresh token.
    fn store_refreshed(
        &self,
        spent: &RefreshToken,
        access_token: AccessToken,
        refresh_token: Option<RefreshToken>,
        expires_at: EpochMillis,
    ) -> bool {
        let mut next = Some((access_token, refresh_token));
        let mut stored = false;
        self.store.update(&mut |session| {
            if session.refresh_token.as_ref() != Some(spent) {
                return;
            }
            if let Some((access, refresh)) = next.take() {
                session.access_token = Some(access);
                session.refresh_token = refresh;
                session.expires_at = Some(expires_at);
                stored = true;
            }
        });
        stored
    }

    /// Clears the session and publishes sign-out once. Returns the rejection.
    fn force_logout(&self, reason: &'static str) -> AuthError {
        self.store.clear();
        if self.events.signed_out() {
            tracing::warn!(reason, "Session ended, returning to login");
        } else {
            tracing::debug!(reason, "Request rejected, already signed out");
        }
        AuthError::SessionExpired
    }
}

fn usable_token(session: &Session, now: EpochMillis) -> Option<AccessToken> {
    if is_access_token_valid(session, now) {
        session.access_token.clone()
    } else {
        None
    }
}
