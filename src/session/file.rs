use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use super::{Session, SessionStore};

/// Store that survives a restart by mirroring the session into a JSON file.
///
/// The in-memory copy is authoritative. Disk failures are logged and never
/// reach callers; a missing or unreadable file loads as logged out. An empty
/// session removes the file.
///
/// Writes are synchronous `std::fs` calls made while holding the write lock,
/// including from the async refresh path. The file is a few hundred bytes, so
/// this only blocks the calling worker briefly; on a busy runtime keep the file
/// on local disk.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    inner: RwLock<Session>,
}

impl FileSessionStore {
    /// Load from `path`, or start empty.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let session = load(&path);
        Self {
            path,
            inner: RwLock::new(session),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn read(&self) -> Session {
        self.inner.read().clone()
    }

    fn update(&self, f: &mut dyn FnMut(&mut Session)) {
        let mut session = self.inner.write();
        f(&mut *session);
        // Persist under the lock so the file follows write order.
        persist(&self.path, &session);
    }
}

fn load(path: &Path) -> Session {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Session::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Session file unreadable");
            return Session::default();
        }
    };
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Session file corrupt, starting logged out");
        Session::default()
    })
}

fn persist(path: &Path, session: &Session) {
    if session.is_empty() {
        match std::fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Session file removal failed");
            }
        }
        return;
    }

    let result = serde_json::to_vec_pretty(session)
        .map_err(std::io::Error::other)
        .and_then(|bytes| {
            // Readers only ever see a complete file.
            let tmp = path.with_extension("tmp");
            std::fs::write(&tmp, bytes)?;
            std::fs::rename(&tmp, path)
        });
    if let Err(e) = result {
        tracing::warn!(path = %path.display(), error = %e, "Session file write failed");
    }
}
