//! Connection manager for the single control session.
//!
//! At most one session is current. A new session replaces the old reference
//! outright: the superseded socket is left open and is not notified, it simply
//! stops receiving frames. Sending with no current session only logs.

use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

/// Log target for every frame sent toward the UI.
pub const TRAFFIC_TARGET: &str = "mcu_bridge::traffic";

/// Sending side of one websocket session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: Uuid,
    tx: mpsc::UnboundedSender<String>,
}

impl SessionHandle {
    pub fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tx,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
}

/// Holds zero or one session reference.
#[derive(Debug, Default)]
pub struct ConnectionManager {
    current: Option<SessionHandle>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `session` current, returning the reference it replaced.
    pub fn attach(&mut self, session: SessionHandle) -> Option<SessionHandle> {
        let previous = self.current.replace(session);
        if let Some(ref old) = previous {
            info!(session = %old.id, "Session superseded by a new connection");
        }
        previous
    }

    /// Forget the session with `id` if it is still current.
    ///
    /// Returns `false` when `id` had already been superseded.
    pub fn detach(&mut self, id: Uuid) -> bool {
        match self.current {
            Some(ref current) if current.id == id => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_id(&self) -> Option<Uuid> {
        self.current.as_ref().map(SessionHandle::id)
    }

    /// Log `message` and hand it to the current session, if any.
    pub fn send_to_client(&self, message: &str) {
        info!(target: TRAFFIC_TARGET, "{}", message);

        if let Some(ref session) = self.current {
            if session.tx.send(message.to_string()).is_err() {
                debug!(session = %session.id, "Session socket already closed; frame dropped");
            }
        }
    }
}
