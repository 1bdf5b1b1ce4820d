//! Wire types for the back-office REST API.

use derive_more::Display;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::outcome::{AuthError, FieldErrors};
use crate::types::{AccessToken, RefreshToken};

/// Auth endpoint paths, relative to the API base URL.
pub mod paths {
    pub const REGISTER: &str = "auth/register";
    pub const LOGIN: &str = "auth/login";
    pub const REFRESH: &str = "auth/refresh";
    pub const VERIFY_OTP: &str = "auth/verifyotp";
    pub const RESEND_OTP: &str = "auth/resendotp";
    pub const FORGOT_PASSWORD: &str = "auth/forgotpassword";
    pub const RESET_PASSWORD: &str = "auth/resetpassword";
    pub const LOGOUT: &str = "auth/logout";
}

/// Envelope status meaning success.
pub const STATUS_OK: u16 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Method {
    #[display("GET")]
    Get,
    #[display("POST")]
    Post,
    #[display("PUT")]
    Put,
    #[display("DELETE")]
    Delete,
}

/// One outgoing call, before the transport runs it.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the base URL, e.g. `api/projects/search`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<JsonValue>,
    pub bearer: Option<AccessToken>,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>, body: JsonValue) -> Self {
        Self::new(Method::Post, path).with_body(body)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    #[must_use]
    pub fn with_body(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_bearer(mut self, token: AccessToken) -> Self {
        self.bearer = Some(token);
        self
    }
}

/// Raw response: HTTP status plus the JSON body (`Null` if not JSON).
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub http_status: u16,
    pub body: JsonValue,
}

/// Standard body shape of the auth endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Envelope {
    pub status: Option<u16>,
    pub message: Option<String>,
    pub data: Option<JsonValue>,
    pub errors: Option<JsonValue>,
}

impl ApiResponse {
    #[must_use]
    pub fn new(http_status: u16, body: JsonValue) -> Self {
        Self { http_status, body }
    }

    /// Body as an envelope; empty when the body has another shape.
    #[must_use]
    pub fn envelope(&self) -> Envelope {
        Envelope::deserialize(&self.body).unwrap_or_default()
    }

    /// Envelope `status` when present, otherwise the HTTP status.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.envelope().status.unwrap_or(self.http_status)
    }

    #[must_use]
    pub fn is_http_success(&self) -> bool {
        (200..300).contains(&self.http_status)
    }

    /// Status to report for a failure: the HTTP status unless it was 2xx.
    #[must_use]
    pub fn failure_status(&self) -> u16 {
        if self.is_http_success() {
            self.status()
        } else {
            self.http_status
        }
    }

    /// `data` of an enveloped body, or the whole body otherwise.
    #[must_use]
    pub fn into_payload(self) -> JsonValue {
        match self.body {
            JsonValue::Object(mut map) if map.contains_key("data") => {
                map.remove("data").unwrap_or(JsonValue::Null)
            }
            body => body,
        }
    }

    /// Reshapes a failed response into the caller-facing taxonomy.
    ///
    /// An `errors` object becomes [`AuthError::Validation`]; anything else is
    /// [`AuthError::Backend`] with the body's message or `fallback`.
    #[must_use]
    pub fn failure(&self, fallback: &str) -> AuthError {
        let envelope = self.envelope();
        if let Some(fields) = envelope.errors.as_ref().and_then(field_errors) {
            return AuthError::Validation(fields);
        }
        AuthError::Backend {
            status: Some(self.failure_status()),
            message: envelope
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| fallback.to_owned()),
        }
    }
}

/// Accepts `{"field": "msg"}` and `{"field": ["msg", ...]}`.
fn field_errors(value: &JsonValue) -> Option<FieldErrors> {
    let map = value.as_object()?;
    let errors: FieldErrors = map
        .iter()
        .filter_map(|(field, message)| {
            let message = match message {
                JsonValue::String(s) => Some(s.clone()),
                JsonValue::Array(items) => items.iter().find_map(|m| m.as_str().map(str::to_owned)),
                _ => None,
            }?;
            Some((field.clone(), message))
        })
        .collect();
    (!errors.is_empty()).then_some(errors)
}

/// Token triple returned by `auth/login` and `auth/refresh`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct TokenPayload {
    pub access_token: AccessToken,
    #[serde(default)]
    pub refresh_token: Option<RefreshToken>,
    /// Lifetime in seconds.
    pub expires_in: u64,
}

impl TokenPayload {
    /// Absolute expiry in epoch milliseconds.
    #[must_use]
    pub fn expires_at(&self, now: crate::types::EpochMillis) -> crate::types::EpochMillis {
        let lifetime = i64::try_from(self.expires_in.saturating_mul(1000)).unwrap_or(i64::MAX);
        now.saturating_add(lifetime)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn status_prefers_envelope() {
        let res = ApiResponse::new(200, json!({"status": 401, "message": "no"}));
        assert_eq!(res.status(), 401);

        let res = ApiResponse::new(503, JsonValue::Null);
        assert_eq!(res.status(), 503);
    }

    #[test]
    fn failure_status_prefers_http_error() {
        let res = ApiResponse::new(500, json!({"status": 200}));
        assert_eq!(res.failure_status(), 500);
        assert_eq!(
            res.failure("Request failed"),
            AuthError::Backend {
                status: Some(500),
                message: "Request failed".into()
            }
        );

        let res = ApiResponse::new(200, json!({"status": 409, "message": "Taken"}));
        assert_eq!(res.failure_status(), 409);
    }

    #[test]
    fn method_displays_as_http_verb() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }

    #[test]
    fn payload_unwraps_envelope_data() {
        let res = ApiResponse::new(200, json!({"status": 200, "data": {"id": 7}}));
        assert_eq!(res.into_payload(), json!({"id": 7}));

        let res = ApiResponse::new(200, json!([{"district": "Hai Chau", "count": 3}]));
        assert_eq!(
            res.into_payload(),
            json!([{"district": "Hai Chau", "count": 3}])
        );
    }

    #[test]
    fn failure_maps_field_errors() {
        let res = ApiResponse::new(
            400,
            json!({
                "status": 400,
                "message": "Validation failed",
                "errors": {"email": "Email already used", "identifier": ["Taken", "Too short"]}
            }),
        );
        match res.failure("Registration failed") {
            AuthError::Validation(fields) => {
                assert_eq!(fields.get("email"), Some("Email already used"));
                assert_eq!(fields.get("identifier"), Some("Taken"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn failure_uses_message_then_fallback() {
        let res = ApiResponse::new(500, json!({"message": "Database down"}));
        assert_eq!(
            res.failure("Request failed"),
            AuthError::Backend {
                status: Some(500),
                message: "Database down".into()
            }
        );

        let res = ApiResponse::new(502, json!("gateway"));
        assert_eq!(
            res.failure("Request failed"),
            AuthError::Backend {
                status: Some(502),
                message: "Request failed".into()
            }
        );
    }

    #[test]
    fn token_payload_requires_expiry() {
        let ok: Result<TokenPayload, _> = serde_json::from_value(json!({
            "accessToken": "T1", "refreshToken": "R1", "expiresIn": 3600
        }));
        let payload = ok.unwrap();
        assert_eq!(payload.expires_at(1_000), 3_601_000);

        let missing: Result<TokenPayload, _> =
            serde_json::from_value(json!({"accessToken": "T1", "refreshToken": "R1"}));
        assert!(missing.is_err());
    }
}
