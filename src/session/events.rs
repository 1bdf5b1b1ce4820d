use tokio::sync::watch;

/// Coarse sign-in state published to the application shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    SignedIn,
    SignedOut,
}

/// Broadcasts sign-in/sign-out transitions.
///
/// The shell subscribes and returns to the login entry point when it sees
/// [`SessionState::SignedOut`]. A transition to `SignedOut` is published once,
/// no matter how many requests force a logout at the same time.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    tx: std::sync::Arc<watch::Sender<SessionState>>,
}

impl SessionEvents {
    #[must_use]
    pub fn new(initial: SessionState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            tx: std::sync::Arc::new(tx),
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn current(&self) -> SessionState {
        *self.tx.borrow()
    }

    pub(crate) fn signed_in(&self) {
        self.tx.send_if_modified(|state| {
            let changed = *state != SessionState::SignedIn;
            *state = SessionState::SignedIn;
            changed
        });
    }

    /// Returns `true` for the caller that performed the transition.
    pub(crate) fn signed_out(&self) -> bool {
        self.tx.send_if_modified(|state| {
            let changed = *state != SessionState::SignedOut;
            *state = SessionState::SignedOut;
            changed
        })
    }
}
