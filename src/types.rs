use derive_more::{From, Into};
use serde::{Deserialize, Serialize};

/// Short-lived bearer credential authorizing API calls.
///
/// `Debug` is redacted; use [`as_str`](Self::as_str) to build the header.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, From, Into)]
#[serde(transparent)]
pub struct AccessToken(pub String);

impl AccessToken {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AccessToken {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Longer-lived credential used only against `auth/refresh`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, From, Into)]
#[serde(transparent)]
pub struct RefreshToken(pub String);

impl RefreshToken {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RefreshToken {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl std::fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RefreshToken(***)")
    }
}

/// Milliseconds since the Unix epoch.
pub type EpochMillis = i64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_tokens() {
        let access = AccessToken::from("secret-access");
        let refresh = RefreshToken::from("secret-refresh");

        assert!(!format!("{access:?}").contains("secret"));
        assert!(!format!("{refresh:?}").contains("secret"));
    }

    #[test]
    fn token_serde_is_transparent() {
        let token = AccessToken::from("T1");
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(json, "\"T1\"");
        let parsed: AccessToken = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, token);
    }

    #[test]
    fn tokens_convert_from_and_into_string() {
        let token = RefreshToken::from("R1".to_string());
        let raw: String = token.into();
        assert_eq!(raw, "R1");
    }

    #[test]
    fn newtypes_prevent_mixing() {
        fn takes_access(_: &AccessToken) {}
        fn takes_refresh(_: &RefreshToken) {}

        takes_access(&AccessToken::from("x"));
        takes_refresh(&RefreshToken::from("x"));
        // takes_access(&RefreshToken::from("x"));  // Compile error!
    }
}
