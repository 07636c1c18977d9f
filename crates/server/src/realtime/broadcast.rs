//! Fan-out of one payload to every registered session.

use std::sync::Arc;
use tracing::{debug, warn};

use super::events::OutboundEvent;
use super::registry::ConnectionRegistry;

/// Counts from one fan-out pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct Broadcaster {
    registry: Arc<ConnectionRegistry>,
}

impl Broadcaster {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Deliver `event` to every session in the current snapshot.
    ///
    /// A failed recipient is logged and skipped. The registry is never
    /// modified here; dead sessions leave when their own receive loop ends.
    pub fn broadcast(&self, event: OutboundEvent) -> DeliveryReport {
        let event = Arc::new(event);
        let mut report = DeliveryReport::default();

        for handle in self.registry.snapshot() {
            match handle.deliver(event.clone()) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!("Failed to deliver to session {}: {}", handle.id(), e);
                    report.failed += 1;
                }
            }
        }

        debug!(
            "Broadcast delivered={} failed={}",
            report.delivered, report.failed
        );
        report
    }
}
