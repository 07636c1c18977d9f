//! Acceptance of one validated chat event: rewrite, persist, resolve sender.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use super::error::PipelineError;
use super::events::{timestamp_now, ChatBroadcast, ChatEvent, DbStatus};
use super::sink::DurableSink;
use crate::chat::messages::PersistedMessage;

/// Resolves a user id to the display name shown to peers
#[async_trait]
pub trait UsernameLookup: Send + Sync {
    async fn username_by_id(&self, user_id: i64) -> Result<Option<String>>;
}

/// Rewrites outbound message text in a given tone
#[async_trait]
pub trait TextRewriter: Send + Sync {
    async fn rewrite(&self, text: &str, tone: &str) -> Result<String>;
}

struct Rewrite {
    rewriter: Arc<dyn TextRewriter>,
    tone: String,
}

pub struct MessagePipeline {
    lookup: Arc<dyn UsernameLookup>,
    sink: Arc<dyn DurableSink>,
    rewrite: Option<Rewrite>,
}

impl MessagePipeline {
    /// Pipeline with the rewrite step disabled
    pub fn new(lookup: Arc<dyn UsernameLookup>, sink: Arc<dyn DurableSink>) -> Self {
        Self {
            lookup,
            sink,
            rewrite: None,
        }
    }

    pub fn with_rewriter(mut self, rewriter: Arc<dyn TextRewriter>, tone: impl Into<String>) -> Self {
        self.rewrite = Some(Rewrite {
            rewriter,
            tone: tone.into(),
        });
        self
    }

    pub fn rewrite_enabled(&self) -> bool {
        self.rewrite.is_some()
    }

    /// Turn an inbound chat event into the payload broadcast to peers.
    ///
    /// The record is queued for storage before the sender is resolved and
    /// `db_status` reports success as soon as it is queued.
    pub async fn process(&self, event: ChatEvent) -> Result<ChatBroadcast, PipelineError> {
        let created_at = timestamp_now();
        let text = self.rewrite_text(event.message).await;

        self.sink.submit(PersistedMessage {
            sender_id: event.sender_id,
            chat_id: event.chat_id,
            message: text.clone(),
            created_at: created_at.clone(),
        });

        let sender = self
            .lookup
            .username_by_id(event.sender_id)
            .await
            .map_err(|e| PipelineError::Lookup(e.to_string()))?
            .ok_or(PipelineError::UnknownSender(event.sender_id))?;

        debug!("Accepted message from {} in chat {}", sender, event.chat_id);

        Ok(ChatBroadcast {
            sender,
            message: text,
            created_at,
            db_status: DbStatus::submitted(),
        })
    }

    async fn rewrite_text(&self, text: String) -> String {
        let Some(rewrite) = &self.rewrite else {
            return text;
        };
        match rewrite.rewriter.rewrite(&text, &rewrite.tone).await {
            Ok(rewritten) => rewritten,
            Err(e) => {
                warn!("Rewrite failed, sending original text: {}", e);
                text
            }
        }
    }
}
