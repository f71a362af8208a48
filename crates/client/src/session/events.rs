//! Session lifecycle event broadcasting.

use tokio::sync::broadcast;

use crate::credentials::UserIdentity;

/// Broadcast channel capacity for session events.
const EVENT_CAPACITY: usize = 16;

/// Something happened to the session that the UI layer should react to.
///
/// `LoggedOut` is the "navigate to the login screen" signal: it fires on
/// explicit logout and on unrecoverable refresh failure.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    LoggedIn { user: Option<UserIdentity> },
    TokenRefreshed,
    LoggedOut { reason: String },
}

/// Handle for emitting and subscribing to [`SessionEvent`]s.
#[derive(Clone)]
pub struct SessionEvents {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Emit an event. Lack of subscribers is not an error.
    pub fn emit(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}
