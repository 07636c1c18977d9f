//! Friendship Handlers

use crate::chat::friends::Friendship;
use crate::core::auth::handlers::users::require_user;
use crate::core::config::AppState;
use crate::core::error::{Error, Result};
use crate::core::models::{Pagination, ResponseMessage};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Body of a friend request: the friend's user id
#[derive(Debug, Deserialize)]
pub struct FriendRef {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct FriendResponse {
    pub user_id: i64,
    pub friend_id: i64,
}

impl From<Friendship> for FriendResponse {
    fn from(f: Friendship) -> Self {
        Self {
            user_id: f.user_id,
            friend_id: f.friend_id,
        }
    }
}

/// POST /api/users/{user_id}/friends
pub async fn create_friend(
    Path(user_id): Path<i64>,
    State(state): State<AppState>,
    Json(friend): Json<FriendRef>,
) -> Result<Json<FriendResponse>> {
    info!("POST /api/users/{}/friends - {}", user_id, friend.id);

    require_user(&state, user_id, "User").await?;
    require_user(&state, friend.id, "Friend").await?;

    if user_id == friend.id {
        return Err(Error::BadRequest("Users cannot befriend themselves".to_string()));
    }
    if state.friends.friendship_exists(user_id, friend.id).await? {
        return Err(Error::Conflict("Users are already friends".to_string()));
    }

    let friendship = state.friends.create_friendship(user_id, friend.id).await?;
    Ok(Json(friendship.into()))
}

/// GET /api/users/{user_id}/friends
pub async fn read_friends(
    Path(user_id): Path<i64>,
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<FriendResponse>>> {
    let friends = state
        .friends
        .get_friends(user_id, page.skip, page.limit)
        .await?;
    Ok(Json(friends.into_iter().map(Into::into).collect()))
}

/// DELETE /api/users/{user_id}/friends/{friend_id}
pub async fn delete_friend(
    Path((user_id, friend_id)): Path<(i64, i64)>,
    State(state): State<AppState>,
) -> Result<Json<ResponseMessage>> {
    require_user(&state, user_id, "User").await?;
    require_user(&state, friend_id, "User").await?;

    let friendship = state
        .friends
        .get_friendship_by_users(user_id, friend_id)
        .await?
        .ok_or_else(|| Error::NotFound("Users are not friends".to_string()))?;

    state.friends.delete_friendship(friendship.id).await?;
    Ok(Json(ResponseMessage::ok("Friendship deleted successfully")))
}
