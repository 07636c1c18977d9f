//! Durable chat messages.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// A message as written to and read from storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PersistedMessage {
    pub sender_id: i64,
    pub chat_id: i64,
    pub message: String,
    pub created_at: String,
}

pub struct MessageStore {
    pool: SqlitePool,
}

impl MessageStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_message(&self, message: &PersistedMessage) -> Result<i64> {
        let id = sqlx::query(
            "INSERT INTO messages (sender_id, chat_id, message, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(message.sender_id)
        .bind(message.chat_id)
        .bind(&message.message)
        .bind(&message.created_at)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    /// Messages of one chat in insertion order
    pub async fn get_chat_messages(&self, chat_id: i64) -> Result<Vec<PersistedMessage>> {
        let messages = sqlx::query_as::<_, PersistedMessage>(
            "SELECT sender_id, chat_id, message, created_at FROM messages
             WHERE chat_id = ? ORDER BY id",
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }
}
