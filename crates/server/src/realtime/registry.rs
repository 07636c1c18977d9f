//! Registry of open real-time sessions.
//!
//! Entries are `(handle, identity)` pairs. One identity may own many
//! sessions (several tabs); each handle is present at most once.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};
use uuid::Uuid;

use super::error::{DeliveryError, RegistryError};
use super::events::OutboundEvent;

pub type SessionId = Uuid;

/// Sending half of one session's outbox
#[derive(Clone, Debug)]
pub struct SessionHandle {
    id: SessionId,
    outbox: mpsc::Sender<Arc<OutboundEvent>>,
}

impl SessionHandle {
    /// New handle plus the receiver its writer task drains
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Arc<OutboundEvent>>) {
        let (outbox, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                id: Uuid::new_v4(),
                outbox,
            },
            rx,
        )
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Queue an event without waiting for the peer
    pub fn deliver(&self, event: Arc<OutboundEvent>) -> Result<(), DeliveryError> {
        self.outbox.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::Full,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }
}

impl PartialEq for SessionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SessionHandle {}

#[derive(Default)]
pub struct ConnectionRegistry {
    entries: Mutex<Vec<(SessionHandle, String)>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session; identities are not deduplicated
    pub fn register(&self, handle: SessionHandle, identity: impl Into<String>) {
        let identity = identity.into();
        let mut entries = self.entries.lock();
        if entries.iter().any(|(h, _)| *h == handle) {
            warn!("Session {} is already registered", handle.id());
            return;
        }
        debug!("Registering session {} for {}", handle.id(), identity);
        entries.push((handle, identity));
    }

    /// Remove the exact `(handle, identity)` pair
    pub fn deregister(&self, handle: &SessionHandle, identity: &str) -> Result<(), RegistryError> {
        let mut entries = self.entries.lock();
        let position = entries
            .iter()
            .position(|(h, id)| h == handle && id == identity)
            .ok_or_else(|| RegistryError::NotFound {
                session: handle.id(),
                identity: identity.to_string(),
            })?;
        entries.remove(position);
        debug!("Deregistered session {} for {}", handle.id(), identity);
        Ok(())
    }

    /// Copy of the current handles; the lock is released before iteration
    pub fn snapshot(&self) -> Vec<SessionHandle> {
        self.entries.lock().iter().map(|(h, _)| h.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Number of open sessions for one identity
    pub fn sessions_for(&self, identity: &str) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|(_, id)| id == identity)
            .count()
    }
}
