//! Real-time delivery
//!
//! One [`RealtimeHub`] is built at startup and shared through the router
//! state. It owns the connection registry, the broadcaster over it, and the
//! message pipeline. Each WebSocket connection runs its own
//! [`session::Session`] task against the hub.

pub mod broadcast;
pub mod error;
pub mod events;
pub mod handler;
pub mod pipeline;
pub mod registry;
pub mod session;
pub mod sink;

use std::sync::Arc;
use tokio::sync::mpsc;

pub use broadcast::{Broadcaster, DeliveryReport};
pub use error::{DeliveryError, PipelineError, RegistryError, SessionError};
pub use events::{ChatBroadcast, ChatEvent, OutboundEvent, PresenceEvent, PresenceStatus};
pub use pipeline::{MessagePipeline, TextRewriter, UsernameLookup};
pub use registry::{ConnectionRegistry, SessionHandle, SessionId};
pub use session::{Inbound, Session, SessionState, SessionTransport};
pub use sink::{DurableSink, QueueSink};

#[derive(Clone, Copy, Debug)]
pub struct HubSettings {
    pub outbox_capacity: usize,
    pub relay_malformed_events: bool,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            outbox_capacity: 64,
            relay_malformed_events: true,
        }
    }
}

pub struct RealtimeHub {
    broadcaster: Broadcaster,
    pipeline: MessagePipeline,
    settings: HubSettings,
}

impl RealtimeHub {
    pub fn new(pipeline: MessagePipeline, settings: HubSettings) -> Self {
        Self {
            broadcaster: Broadcaster::new(Arc::new(ConnectionRegistry::new())),
            pipeline,
            settings,
        }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        self.broadcaster.registry()
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    pub fn pipeline(&self) -> &MessagePipeline {
        &self.pipeline
    }

    pub fn relays_malformed(&self) -> bool {
        self.settings.relay_malformed_events
    }

    /// A fresh session handle sized by the configured outbox capacity
    pub fn open_handle(&self) -> (SessionHandle, mpsc::Receiver<Arc<OutboundEvent>>) {
        SessionHandle::channel(self.settings.outbox_capacity)
    }
}
