//! Lifecycle of one real-time connection: `Pending -> Connected -> Closed`.

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::error::SessionError;
use super::events::{self, OutboundEvent, PresenceEvent, PresenceStatus};
use super::registry::SessionHandle;
use super::RealtimeHub;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Pending,
    Connected,
    Closed,
}

/// What the transport produced on one receive
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Frame(Value),
    /// A frame that is not JSON
    Undecodable(String),
    Disconnected,
}

/// Receiving half of a session's connection
#[async_trait]
pub trait SessionTransport: Send {
    async fn recv(&mut self) -> Inbound;
}

pub struct Session {
    handle: SessionHandle,
    identity: Option<String>,
    connected_at: Option<DateTime<Local>>,
    state: SessionState,
}

impl Session {
    pub fn new(handle: SessionHandle) -> Self {
        Self {
            handle,
            identity: None,
            connected_at: None,
            state: SessionState::Pending,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn connected_at(&self) -> Option<DateTime<Local>> {
        self.connected_at
    }

    /// Join the registry and announce presence.
    ///
    /// Without an identity the session stays `Pending` and is never
    /// registered.
    pub fn connect(&mut self, hub: &RealtimeHub, identity: Option<String>) -> Result<(), SessionError> {
        if self.state != SessionState::Pending {
            return Ok(());
        }
        let Some(identity) = identity else {
            debug!("Session {} has no identity, not joining", self.handle.id());
            return Err(SessionError::Unauthenticated);
        };

        hub.registry().register(self.handle.clone(), identity.clone());
        self.identity = Some(identity.clone());
        self.connected_at = Some(Local::now());
        self.state = SessionState::Connected;

        info!("{} got connected (session {})", identity, self.handle.id());
        hub.broadcaster()
            .broadcast(OutboundEvent::Presence(PresenceEvent::new(
                identity,
                PresenceStatus::Connected,
            )));
        Ok(())
    }

    /// Receive and route frames until the transport disconnects, then close
    pub async fn run<T: SessionTransport + ?Sized>(&mut self, hub: &RealtimeHub, transport: &mut T) {
        if self.state != SessionState::Connected {
            return;
        }

        loop {
            match transport.recv().await {
                Inbound::Frame(raw) => handle_frame(hub, raw).await,
                Inbound::Undecodable(reason) => {
                    warn!("Session {} sent an undecodable frame: {}", self.handle.id(), reason);
                }
                Inbound::Disconnected => break,
            }
        }

        self.close(hub);
    }

    fn close(&mut self, hub: &RealtimeHub) {
        let Some(identity) = self.identity.clone() else {
            return;
        };

        if let Err(e) = hub.registry().deregister(&self.handle, &identity) {
            debug!("Ignoring teardown race: {}", e);
        }
        self.state = SessionState::Closed;

        info!("{} left (session {})", identity, self.handle.id());
        hub.broadcaster()
            .broadcast(OutboundEvent::Presence(PresenceEvent::new(
                identity,
                PresenceStatus::Left,
            )));
    }
}

/// Validate, process and fan out one inbound frame. Never fails the session.
async fn handle_frame(hub: &RealtimeHub, raw: Value) {
    let event = match events::validate(raw) {
        Ok(event) => event,
        Err(malformed) => {
            if hub.relays_malformed() {
                warn!("Relaying malformed event as-is: {}", malformed.reason);
                hub.broadcaster()
                    .broadcast(OutboundEvent::Relay(malformed.payload));
            } else {
                warn!("Dropping malformed event: {}", malformed.reason);
            }
            return;
        }
    };

    match hub.pipeline().process(event).await {
        Ok(chat) => {
            hub.broadcaster().broadcast(OutboundEvent::Chat(chat));
        }
        Err(e) => warn!("Dropping chat event: {}", e),
    }
}

/// Run a whole session: connect, loop, close. Returns the final state.
pub async fn drive<T: SessionTransport + ?Sized>(
    hub: &RealtimeHub,
    transport: &mut T,
    identity: Option<String>,
    handle: SessionHandle,
) -> SessionState {
    let mut session = Session::new(handle);
    if session.connect(hub, identity).is_ok() {
        session.run(hub, transport).await;
    }
    session.state()
}
