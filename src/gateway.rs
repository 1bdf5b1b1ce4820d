use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value as JsonValue, json};

use crate::api::{ApiRequest, ApiResponse, Method, STATUS_OK, TokenPayload, paths};
use crate::clock::Clock;
use crate::config::DEFAULT_RESEND_COOLDOWN;
use crate::outcome::{AuthError, Outcome};
use crate::session::{Session, SessionEvents, SessionStore};
use crate::transport::Transport;
use crate::types::EpochMillis;
use crate::validation;

/// Backend acknowledgement of an auth action that does not create a session.
#[derive(Debug, Clone, Default, PartialEq)]
#[non_exhaustive]
pub struct Ack {
    /// Human-readable message for a toast, if the backend sent one.
    pub message: Option<String>,
    pub data: Option<JsonValue>,
}

/// Client-side wait between OTP resends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtpCooldown {
    ready_at: EpochMillis,
    period_ms: i64,
}

impl OtpCooldown {
    /// Cooldown that starts now, as when the OTP form opens after a code was sent.
    #[must_use]
    pub fn started(now: EpochMillis, period: Duration) -> Self {
        let period_ms = i64::try_from(period.as_millis()).unwrap_or(i64::MAX);
        Self {
            ready_at: now.saturating_add(period_ms),
            period_ms,
        }
    }

    /// Cooldown that allows a resend immediately.
    #[must_use]
    pub fn ready(period: Duration) -> Self {
        Self {
            ready_at: EpochMillis::MIN,
            period_ms: i64::try_from(period.as_millis()).unwrap_or(i64::MAX),
        }
    }

    #[must_use]
    pub fn can_resend(&self, now: EpochMillis) -> bool {
        now >= self.ready_at
    }

    /// Time left before a resend is allowed.
    #[must_use]
    pub fn remaining(&self, now: EpochMillis) -> Duration {
        let left = self.ready_at.saturating_sub(now).max(0);
        Duration::from_millis(u64::try_from(left).unwrap_or(0))
    }

    pub fn restart(&mut self, now: EpochMillis) {
        self.ready_at = now.saturating_add(self.period_ms);
    }
}

/// Login, registration, OTP and password flows against the auth endpoints.
///
/// These endpoints need no credential, so requests go straight to the
/// transport instead of through the [`RequestPipeline`](crate::RequestPipeline).
pub struct AuthGateway<T> {
    transport: Arc<T>,
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    events: SessionEvents,
    resend_cooldown: Duration,
}

// Manual Clone: avoid derive adding a `T: Clone` bound.
impl<T> Clone for AuthGateway<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            store: self.store.clone(),
            clock: self.clock.clone(),
            events: self.events.clone(),
            resend_cooldown: self.resend_cooldown,
        }
    }
}

impl<T: Transport> AuthGateway<T> {
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
            resend_cooldown: DEFAULT_RESEND_COOLDOWN,
        }
    }

    #[must_use]
    pub fn with_resend_cooldown(mut self, cooldown: Duration) -> Self {
        self.resend_cooldown = cooldown;
        self
    }

    /// A running cooldown, for a form that was just shown after a code went out.
    #[must_use]
    pub fn start_cooldown(&self) -> OtpCooldown {
        OtpCooldown::started(self.clock.now_millis(), self.resend_cooldown)
    }

    /// Signs in and stores the token triple.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Validation`] for empty fields or backend field errors
    /// - [`AuthError::NeedsVerification`] if the account still needs its OTP
    /// - [`AuthError::Backend`] / [`AuthError::Network`] otherwise
    pub async fn login(&self, identifier: &str, password: &str) -> Outcome<Session> {
        validation::check_login(identifier, password)?;

        let response = self
            .transport
            .send(ApiRequest::post(
                paths::LOGIN,
                json!({ "identifier": identifier, "password": password }),
            ))
            .await?;

        if !response.is_http_success() || response.status() != STATUS_OK {
            let err = login_failure(&response, identifier);
            tracing::info!(kind = ?err.kind(), "Login refused");
            return Err(err);
        }

        let payload = response
            .envelope()
            .data
            .and_then(|data| serde_json::from_value::<TokenPayload>(data).ok())
            .ok_or_else(|| AuthError::Backend {
                status: Some(STATUS_OK),
                message: "Login response carried no token".into(),
            })?;

        let session = Session {
            expires_at: Some(payload.expires_at(self.clock.now_millis())),
            access_token: Some(payload.access_token),
            refresh_token: payload.refresh_token,
            identifier: Some(identifier.to_owned()),
        };
        self.store.write_session(session.clone());
        self.events.signed_in();

        tracing::info!(identifier = %identifier, "Login successful");
        Ok(session)
    }

    /// Creates an account. No session is established; route to OTP entry.
    ///
    /// # Errors
    ///
    /// [`AuthError::Validation`], [`AuthError::Backend`] or [`AuthError::Network`].
    pub async fn register(
        &self,
        identifier: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Outcome<Ack> {
        validation::check_register(identifier, email, password, confirm_password)?;
        let body = json!({
            "identifier": identifier,
            "email": email,
            "password": password,
            "confirmPassword": confirm_password,
        });
        let response = self.transport.send(ApiRequest::post(paths::REGISTER, body)).await?;
        ack(response, "Registration failed")
    }

    /// Confirms an account with its emailed code. Does not sign in.
    ///
    /// # Errors
    ///
    /// [`AuthError::Validation`], [`AuthError::Backend`] or [`AuthError::Network`].
    pub async fn verify_otp(&self, email: &str, code: &str) -> Outcome<Ack> {
        validation::check_verify_otp(email, code)?;
        let body = json!({ "email": email, "otp": code });
        let response = self.transport.send(ApiRequest::post(paths::VERIFY_OTP, body)).await?;
        ack(response, "OTP verification failed")
    }

    /// Requests a new code. Nothing is sent while `cooldown` is running; on
    /// success the cooldown restarts.
    ///
    /// # Errors
    ///
    /// [`AuthError::Validation`] (including an active cooldown on the `otp`
    /// field), [`AuthError::Backend`] or [`AuthError::Network`].
    pub async fn resend_otp(
        &self,
        email: &str,
        is_password_reset: bool,
        cooldown: &mut OtpCooldown,
    ) -> Outcome<Ack> {
        let now = self.clock.now_millis();
        if !cooldown.can_resend(now) {
            let secs = cooldown.remaining(now).as_millis().div_ceil(1000);
            return Err(AuthError::field(
                "otp",
                &format!("Please wait {secs}s before requesting a new code"),
            ));
        }
        validation::check_email(email)?;

        let body = json!({ "email": email, "isReset": is_password_reset });
        let response = self.transport.send(ApiRequest::post(paths::RESEND_OTP, body)).await?;
        let ack = ack(response, "Failed to resend OTP")?;

        cooldown.restart(self.clock.now_millis());
        Ok(ack)
    }

    /// Starts the reset flow by emailing a code. Leaves the session untouched.
    ///
    /// # Errors
    ///
    /// [`AuthError::Validation`], [`AuthError::Backend`] or [`AuthError::Network`].
    pub async fn forgot_password(&self, email: &str) -> Outcome<Ack> {
        validation::check_email(email)?;
        let body = json!({ "email": email });
        let response = self
            .transport
            .send(ApiRequest::post(paths::FORGOT_PASSWORD, body))
            .await?;
        ack(response, "Failed to send OTP")
    }

    /// Sets a new password with the emailed code. Does not sign in.
    ///
    /// # Errors
    ///
    /// [`AuthError::Validation`], [`AuthError::Backend`] or [`AuthError::Network`].
    pub async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Outcome<Ack> {
        validation::check_reset_password(email, code, new_password, confirm_password)?;
        let body = json!({
            "email": email,
            "otp": code,
            "newPassword": new_password,
            "confirmPassword": confirm_password,
        });
        let response = self
            .transport
            .send(ApiRequest::post(paths::RESET_PASSWORD, body))
            .await?;
        ack(response, "Password reset failed")
    }

    /// Tells the backend (best effort), then always clears the local session.
    pub async fn logout(&self) {
        let session = self.store.read();
        let mut request = ApiRequest::new(Method::Post, paths::LOGOUT);
        if let Some(token) = session.access_token {
            request = request.with_bearer(token);
        }

        match self.transport.send(request).await {
            Ok(response) if response.status() == STATUS_OK => {}
            Ok(response) => {
                tracing::warn!(status = response.status(), "Backend logout refused");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Backend logout failed");
            }
        }

        self.store.clear();
        self.events.signed_out();
        tracing::info!("Logged out");
    }
}

fn ack(response: ApiResponse, fallback: &str) -> Outcome<Ack> {
    if !response.is_http_success() || response.status() != STATUS_OK {
        return Err(response.failure(fallback));
    }
    let envelope = response.envelope();
    Ok(Ack {
        message: envelope.message,
        data: envelope.data,
    })
}

/// 401 whose message mentions verification means "route to OTP entry".
fn login_failure(response: &ApiResponse, identifier: &str) -> AuthError {
    let envelope = response.envelope();
    let status = response.failure_status();
    let mentions_verification = envelope
        .message
        .as_deref()
        .is_some_and(|m| m.to_lowercase().contains("verif"));
    if status == 401 && mentions_verification {
        return AuthError::NeedsVerification {
            identifier: identifier.to_owned(),
        };
    }
    response.failure("Login failed")
}
