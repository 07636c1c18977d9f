//! Chats: one conversation per friend pair.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Chat {
    pub id: i64,
    pub user_id: i64,
    pub friend_id: i64,
}

pub struct ChatManager {
    pool: SqlitePool,
}

impl ChatManager {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_chat(&self, user_id: i64, friend_id: i64) -> Result<Chat> {
        let id = sqlx::query("INSERT INTO chats (user_id, friend_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(friend_id)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        info!("[Chats] Created chat {} for {} and {}", id, user_id, friend_id);

        Ok(Chat {
            id,
            user_id,
            friend_id,
        })
    }

    pub async fn get_chat(&self, chat_id: i64) -> Result<Option<Chat>> {
        let chat = sqlx::query_as::<_, Chat>("SELECT id, user_id, friend_id FROM chats WHERE id = ?")
            .bind(chat_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(chat)
    }

    pub async fn list_chats(&self, skip: i64, limit: i64) -> Result<Vec<Chat>> {
        let chats = sqlx::query_as::<_, Chat>(
            "SELECT id, user_id, friend_id FROM chats ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;
        Ok(chats)
    }

    /// Chats where the user is either party
    pub async fn chats_for_user(&self, user_id: i64) -> Result<Vec<Chat>> {
        let chats = sqlx::query_as::<_, Chat>(
            "SELECT id, user_id, friend_id FROM chats
             WHERE user_id = ? OR friend_id = ? ORDER BY id",
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(chats)
    }

    /// Chats between two users in either direction
    pub async fn chats_between(&self, user_id: i64, friend_id: i64) -> Result<Vec<Chat>> {
        let chats = sqlx::query_as::<_, Chat>(
            "SELECT id, user_id, friend_id FROM chats
             WHERE (user_id = ? AND friend_id = ?) OR (user_id = ? AND friend_id = ?)
             ORDER BY id",
        )
        .bind(user_id)
        .bind(friend_id)
        .bind(friend_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(chats)
    }
}
