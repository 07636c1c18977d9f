//! Users and Authentication
//!
//! Handles user records, password hashing, and login checks.
//! The session identity itself is the `X-Authorization` cookie; see
//! [`crate::core::ctx`].

pub mod handlers;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bcrypt::{hash, verify, DEFAULT_COST};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::realtime::UsernameLookup;

/// Public user info (no password hash)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
}

/// Result of a login attempt, serialized as-is to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginOutcome {
    pub status: bool,
    pub message: String,
}

impl LoginOutcome {
    fn new(status: bool, message: &str) -> Self {
        Self {
            status,
            message: message.to_string(),
        }
    }
}

/// Auth manager handles user rows and credentials
pub struct AuthManager {
    pool: SqlitePool,
    hash_cost: u32,
}

impl AuthManager {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_cost(pool, DEFAULT_COST)
    }

    /// Use a custom bcrypt cost (lower values for tests)
    pub fn with_cost(pool: SqlitePool, hash_cost: u32) -> Self {
        Self { pool, hash_cost }
    }

    /// Register a new user; fails if the username is taken
    pub async fn create_user(&self, username: &str, password: &str) -> Result<User> {
        if self.get_user_by_username(username).await?.is_some() {
            return Err(anyhow::anyhow!("Username already registered"));
        }

        let hashed = hash(password, self.hash_cost).context("Failed to hash password")?;

        let id = sqlx::query("INSERT INTO users (username, hashed_password) VALUES (?, ?)")
            .bind(username)
            .bind(&hashed)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        info!("[Auth] User registered: {} ({})", username, id);

        Ok(User {
            id,
            username: username.to_string(),
        })
    }

    pub async fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT id, username FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT id, username FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn list_users(&self, skip: i64, limit: i64) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username FROM users ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// Rename a user and optionally change the password
    pub async fn update_user(
        &self,
        user_id: i64,
        username: &str,
        password: Option<&str>,
    ) -> Result<User> {
        if let Some(existing) = self.get_user_by_username(username).await? {
            if existing.id != user_id {
                return Err(anyhow::anyhow!("Username already registered"));
            }
        }

        sqlx::query("UPDATE users SET username = ? WHERE id = ?")
            .bind(username)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if let Some(password) = password {
            let hashed = hash(password, self.hash_cost).context("Failed to hash password")?;
            sqlx::query("UPDATE users SET hashed_password = ? WHERE id = ?")
                .bind(&hashed)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        }

        info!("[Auth] User {} updated", user_id);

        Ok(User {
            id: user_id,
            username: username.to_string(),
        })
    }

    /// Delete a user along with every chat they take part in.
    ///
    /// Friendships are left alone; callers refuse to delete befriended users.
    pub async fn delete_user(&self, user_id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let chats = sqlx::query("DELETE FROM chats WHERE user_id = ? OR friend_id = ?")
            .bind(user_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        if chats > 0 {
            info!("[Auth] Removed {} chats of deleted user {}", chats, user_id);
        }
        Ok(result.rows_affected() > 0)
    }

    /// Check a username/password pair
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT hashed_password FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        let Some((hashed,)) = row else {
            return Ok(LoginOutcome::new(false, "User not found"));
        };

        if !verify(password, &hashed).context("Failed to verify password")? {
            warn!("[Auth] Failed login attempt for {}", username);
            return Ok(LoginOutcome::new(false, "Incorrect Password"));
        }

        info!("[Auth] User logged in: {}", username);
        Ok(LoginOutcome::new(true, "Login successful"))
    }
}

#[async_trait]
impl UsernameLookup for AuthManager {
    async fn username_by_id(&self, user_id: i64) -> Result<Option<String>> {
        Ok(self.get_user(user_id).await?.map(|u| u.username))
    }
}
