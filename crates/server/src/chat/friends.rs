//! Friendships
//!
//! A friendship is one row `(user_id, friend_id)`, but every lookup treats
//! it as symmetric.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

/// Established friend relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Friendship {
    pub id: i64,
    pub user_id: i64,
    pub friend_id: i64,
}

/// Friend manager handles all friend-related operations
pub struct FriendManager {
    pool: SqlitePool,
}

impl FriendManager {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_friendship(&self, user_id: i64, friend_id: i64) -> Result<Friendship> {
        let id = sqlx::query("INSERT INTO friends (user_id, friend_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(friend_id)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        info!("[Friends] {} and {} are now friends", user_id, friend_id);

        Ok(Friendship {
            id,
            user_id,
            friend_id,
        })
    }

    /// Friendship between two users in either direction
    pub async fn get_friendship_by_users(
        &self,
        user_id: i64,
        friend_id: i64,
    ) -> Result<Option<Friendship>> {
        let friendship = sqlx::query_as::<_, Friendship>(
            "SELECT id, user_id, friend_id FROM friends
             WHERE (user_id = ? AND friend_id = ?) OR (user_id = ? AND friend_id = ?)
             ORDER BY id LIMIT 1",
        )
        .bind(user_id)
        .bind(friend_id)
        .bind(friend_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(friendship)
    }

    pub async fn friendship_exists(&self, user_id: i64, friend_id: i64) -> Result<bool> {
        Ok(self
            .get_friendship_by_users(user_id, friend_id)
            .await?
            .is_some())
    }

    /// Friendships the user initiated
    pub async fn get_friends(&self, user_id: i64, skip: i64, limit: i64) -> Result<Vec<Friendship>> {
        let friends = sqlx::query_as::<_, Friendship>(
            "SELECT id, user_id, friend_id FROM friends WHERE user_id = ?
             ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(user_id)
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;
        Ok(friends)
    }

    /// True if the user is on either side of any friendship
    pub async fn has_friendships(&self, user_id: i64) -> Result<bool> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM friends WHERE user_id = ? OR friend_id = ? LIMIT 1")
                .bind(user_id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    pub async fn delete_friendship(&self, friendship_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM friends WHERE id = ?")
            .bind(friendship_id)
            .execute(&self.pool)
            .await?;

        info!("[Friends] Friendship {} removed", friendship_id);
        Ok(())
    }
}
