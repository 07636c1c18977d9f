//! Chat Handlers and Router
//!
//! Friends, chats, message history, and the real-time socket.

use crate::core::AppState;
use crate::realtime::handler::ws_chat;
use axum::{
    routing::{delete, get},
    Router,
};

pub mod chats;
pub mod friends;
pub mod messages;

pub fn router() -> Router<AppState> {
    Router::new()
        // Friends
        .route(
            "/api/users/{user_id}/friends",
            get(friends::read_friends).post(friends::create_friend),
        )
        .route(
            "/api/users/{user_id}/friends/{friend_id}",
            delete(friends::delete_friend),
        )
        // Chats
        .route("/api/chats", get(chats::read_chats).post(chats::create_chat))
        .route("/api/chats/{chat_id}", get(chats::read_chat))
        .route("/api/chats/user/{user_id}", get(chats::chats_for_user))
        .route(
            "/api/chats/user/{user_id}/friend/{friend_id}",
            get(chats::chats_between),
        )
        // Message history
        .route(
            "/api/chats/{chat_id}/messages",
            get(messages::read_messages).post(messages::create_message),
        )
        // Real-time channel
        .route("/ws/chat", get(ws_chat))
        .route("/health", get(health_check))
}

async fn health_check() -> &'static str {
    "OK - PairChat Server"
}
