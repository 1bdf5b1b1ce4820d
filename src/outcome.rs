use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Result of every gateway and pipeline operation.
pub type Outcome<T> = Result<T, AuthError>;

/// Closed set of failures a UI collaborator has to handle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Per-field messages, from client-side checks or from the backend.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Login refused until the account's OTP is verified.
    #[error("Account {identifier} needs verification")]
    NeedsVerification { identifier: String },

    /// No usable credential; the session was cleared.
    #[error("Session expired")]
    SessionExpired,

    /// No response received (connect failure, timeout).
    #[error("Cannot reach server: {0}")]
    Network(String),

    /// Backend answered with a non-success status.
    #[error("Backend error ({status:?}): {message}")]
    Backend { status: Option<u16>, message: String },
}

/// Tag of an [`AuthError`], for branching and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NeedsVerification,
    SessionExpired,
    Network,
    Backend,
}

impl AuthError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NeedsVerification { .. } => ErrorKind::NeedsVerification,
            Self::SessionExpired => ErrorKind::SessionExpired,
            Self::Network(_) => ErrorKind::Network,
            Self::Backend { .. } => ErrorKind::Backend,
        }
    }

    /// Shorthand for a single-field validation failure.
    #[must_use]
    pub fn field(name: &str, message: &str) -> Self {
        let mut errors = FieldErrors::default();
        errors.insert(name, message);
        Self::Validation(errors)
    }
}

/// Field name to message map, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Records a message; the first message for a field wins.
    pub fn insert(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_owned())
            .or_insert_with(|| message.to_owned());
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when nothing was recorded, otherwise [`AuthError::Validation`].
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] carrying `self` if any field failed.
    pub fn into_result(self) -> Outcome<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AuthError::Validation(self))
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl FromIterator<(String, String)> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut errors = Self::default();
        for (field, message) in iter {
            errors.insert(&field, &message);
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_message_per_field_wins() {
        let mut errors = FieldErrors::default();
        errors.insert("password", "Password is required");
        errors.insert("password", "Password must be at least 6 characters");

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("password"), Some("Password is required"));
    }

    #[test]
    fn empty_errors_are_ok() {
        assert_eq!(FieldErrors::default().into_result(), Ok(()));
    }

    #[test]
    fn non_empty_errors_become_validation() {
        let err = AuthError::field("email", "Email is required");
        assert_eq!(err.kind(), ErrorKind::Validation);
        match err {
            AuthError::Validation(fields) => {
                assert_eq!(fields.get("email"), Some("Email is required"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn display_lists_fields_in_order() {
        let errors: FieldErrors = [
            ("password".to_string(), "too short".to_string()),
            ("email".to_string(), "invalid".to_string()),
        ]
        .into_iter()
        .collect();

        assert_eq!(errors.to_string(), "email: invalid; password: too short");
    }

    #[test]
    fn kinds_are_distinct() {
        assert_eq!(AuthError::SessionExpired.kind(), ErrorKind::SessionExpired);
        assert_eq!(
            AuthError::Network("timeout".into()).kind(),
            ErrorKind::Network
        );
        assert_eq!(
            AuthError::NeedsVerification {
                identifier: "alice".into()
            }
            .kind(),
            ErrorKind::NeedsVerification
        );
        assert_eq!(
            AuthError::Backend {
                status: Some(500),
                message: "boom".into()
            }
            .kind(),
            ErrorKind::Backend
        );
    }
}
