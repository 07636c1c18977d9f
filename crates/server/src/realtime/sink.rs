//! Fire-and-forget persistence of accepted chat messages.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::chat::messages::{MessageStore, PersistedMessage};

/// Destination for accepted messages; `submit` must return immediately
pub trait DurableSink: Send + Sync {
    fn submit(&self, record: PersistedMessage);
}

/// Queue drained by a background worker that writes to the message store
#[derive(Clone)]
pub struct QueueSink {
    tx: mpsc::UnboundedSender<PersistedMessage>,
}

impl QueueSink {
    /// Start the worker; it stops once every `QueueSink` clone is dropped
    pub fn spawn(store: Arc<MessageStore>) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(persist_worker(rx, store));
        (Self { tx }, worker)
    }
}

impl DurableSink for QueueSink {
    fn submit(&self, record: PersistedMessage) {
        if let Err(e) = self.tx.send(record) {
            error!(
                "Persistence queue closed, dropping message for chat {}",
                e.0.chat_id
            );
        }
    }
}

async fn persist_worker(
    mut rx: mpsc::UnboundedReceiver<PersistedMessage>,
    store: Arc<MessageStore>,
) {
    info!("[Persist] Worker started");
    while let Some(record) = rx.recv().await {
        match store.create_message(&record).await {
            Ok(id) => debug!("[Persist] Stored message {} in chat {}", id, record.chat_id),
            Err(e) => error!(
                "[Persist] Failed to store message from {} in chat {}: {}",
                record.sender_id, record.chat_id, e
            ),
        }
    }
    info!("[Persist] Worker stopped");
}
