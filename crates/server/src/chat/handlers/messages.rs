//! Message history handlers

use crate::chat::messages::PersistedMessage;
use crate::core::auth::handlers::users::require_user;
use crate::core::config::AppState;
use crate::core::error::{Error, Result};
use crate::core::models::ResponseMessage;
use crate::realtime::events::timestamp_now;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub sender_id: i64,
    pub message: String,
    pub created_at: Option<String>,
}

/// GET /api/chats/{chat_id}/messages
pub async fn read_messages(
    Path(chat_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<Vec<PersistedMessage>>> {
    if state.chats.get_chat(chat_id).await?.is_none() {
        return Err(Error::NotFound("Chat not found".to_string()));
    }
    Ok(Json(state.messages.get_chat_messages(chat_id).await?))
}

/// POST /api/chats/{chat_id}/messages - synchronous write, unlike the socket path
pub async fn create_message(
    Path(chat_id): Path<i64>,
    State(state): State<AppState>,
    Json(req): Json<CreateMessageRequest>,
) -> Result<Json<ResponseMessage>> {
    info!("POST /api/chats/{}/messages - from {}", chat_id, req.sender_id);

    let chat = state
        .chats
        .get_chat(chat_id)
        .await?
        .ok_or_else(|| Error::NotFound("Chat does not exist".to_string()))?;

    if !state
        .friends
        .friendship_exists(chat.user_id, chat.friend_id)
        .await?
    {
        return Err(Error::NotFound("Friendship not found".to_string()));
    }
    require_user(&state, chat.user_id, "User").await?;
    require_user(&state, chat.friend_id, "User").await?;

    state
        .messages
        .create_message(&PersistedMessage {
            sender_id: req.sender_id,
            chat_id,
            message: req.message,
            created_at: req.created_at.unwrap_or_else(timestamp_now),
        })
        .await?;

    Ok(Json(ResponseMessage::ok("Message sent successfully")))
}
