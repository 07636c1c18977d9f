//! Chat Handlers

use crate::chat::chats::Chat;
use crate::core::auth::handlers::users::require_user;
use crate::core::config::AppState;
use crate::core::error::{Error, Result};
use crate::core::models::Pagination;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct CreateChatRequest {
    pub user_id: i64,
    pub friend_id: i64,
}

/// POST /api/chats
pub async fn create_chat(
    State(state): State<AppState>,
    Json(req): Json<CreateChatRequest>,
) -> Result<Json<Chat>> {
    info!("POST /api/chats - {} with {}", req.user_id, req.friend_id);

    if !state
        .friends
        .friendship_exists(req.user_id, req.friend_id)
        .await?
    {
        return Err(Error::NotFound("Friendship not found".to_string()));
    }
    require_user(&state, req.user_id, "User").await?;
    require_user(&state, req.friend_id, "User").await?;

    if !state
        .chats
        .chats_between(req.user_id, req.friend_id)
        .await?
        .is_empty()
    {
        return Err(Error::Conflict("Chat already exists".to_string()));
    }

    Ok(Json(state.chats.create_chat(req.user_id, req.friend_id).await?))
}

/// GET /api/chats/{chat_id}
pub async fn read_chat(Path(chat_id): Path<i64>, State(state): State<AppState>) -> Result<Json<Chat>> {
    state
        .chats
        .get_chat(chat_id)
        .await?
        .map(Json)
        .ok_or_else(|| Error::NotFound("Chat not found".to_string()))
}

/// GET /api/chats
pub async fn read_chats(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Chat>>> {
    Ok(Json(state.chats.list_chats(page.skip, page.limit).await?))
}

/// GET /api/chats/user/{user_id}
pub async fn chats_for_user(
    Path(user_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Chat>>> {
    require_user(&state, user_id, "User").await?;
    Ok(Json(state.chats.chats_for_user(user_id).await?))
}

/// GET /api/chats/user/{user_id}/friend/{friend_id}
pub async fn chats_between(
    Path((user_id, friend_id)): Path<(i64, i64)>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Chat>>> {
    if !state.friends.friendship_exists(user_id, friend_id).await? {
        return Err(Error::NotFound("Friendship not found".to_string()));
    }
    Ok(Json(state.chats.chats_between(user_id, friend_id).await?))
}
