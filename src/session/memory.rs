use parking_lot::RwLock;

use super::{Session, SessionStore};

/// Process-lifetime store. Lost on restart.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: RwLock<Session>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `session`.
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self {
            inner: RwLock::new(session),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn read(&self) -> Session {
        self.inner.read().clone()
    }

    fn update(&self, f: &mut dyn FnMut(&mut Session)) {
        f(&mut *self.inner.write());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trips() {
        let store = MemorySessionStore::new();
        store.write("a".into(), Some("r".into()), Some(7));

        let session = store.read();
        assert_eq!(session.access_token, Some("a".into()));
        assert_eq!(session.refresh_token, Some("r".into()));
        assert_eq!(session.expires_at, Some(7));
    }

    #[test]
    fn write_replaces_refresh_token_and_keeps_identifier() {
        let store = MemorySessionStore::with_session(Session {
            access_token: Some("T1".into()),
            refresh_token: Some("R1".into()),
            expires_at: Some(1),
            identifier: Some("alice".into()),
        });
        store.write("T2".into(), None, Some(2));

        let session = store.read();
        assert_eq!(session.access_token, Some("T2".into()));
        assert_eq!(session.refresh_token, None);
        assert_eq!(session.expires_at, Some(2));
        assert_eq!(session.identifier.as_deref(), Some("alice"));
    }

    #[test]
    fn clear_is_idempotent() {
        let store = MemorySessionStore::new();
        store.write("a".into(), Some("r".into()), Some(7));

        store.clear();
        assert!(store.read().is_empty());
        store.clear();
        assert!(store.read().is_empty());
    }
}
