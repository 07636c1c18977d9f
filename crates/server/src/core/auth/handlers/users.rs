//! User CRUD handlers

use crate::core::auth::User;
use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::error::{Error, Result};
use crate::core::models::{Pagination, ResponseMessage};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: String,
    pub password: Option<String>,
}

pub(crate) async fn require_user(state: &AppState, user_id: i64, what: &str) -> Result<User> {
    state
        .auth
        .get_user(user_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("{} not found", what)))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<User>> {
    info!("POST /api/users - {}", req.username);

    if state.auth.get_user_by_username(&req.username).await?.is_some() {
        return Err(Error::BadRequest("Username already registered".to_string()));
    }

    let user = state.auth.create_user(&req.username, &req.password).await?;
    Ok(Json(user))
}

/// GET /api/users/{user_id}
pub async fn read_user(
    Path(user_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<User>> {
    Ok(Json(require_user(&state, user_id, "User").await?))
}

/// GET /api/users
pub async fn read_users(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<User>>> {
    Ok(Json(state.auth.list_users(page.skip, page.limit).await?))
}

/// PUT /api/users/{user_id} - only the user named in the cookie may update
pub async fn update_user(
    Path(user_id): Path<i64>,
    State(state): State<AppState>,
    ctx: Ctx,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<User>> {
    let user = require_user(&state, user_id, "User").await?;

    if ctx.identity() != Some(user.username.as_str()) {
        return Err(Error::Unauthorized(
            "Not authorized to update this user".to_string(),
        ));
    }

    let updated = state
        .auth
        .update_user(user_id, &req.username, req.password.as_deref())
        .await
        .map_err(|e| Error::BadRequest(e.to_string()))?;
    Ok(Json(updated))
}

/// DELETE /api/users/{user_id}
pub async fn delete_user(
    Path(user_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<ResponseMessage>> {
    require_user(&state, user_id, "User").await?;

    if state.friends.has_friendships(user_id).await? {
        return Err(Error::Conflict(
            "User is a friend, can not be deleted".to_string(),
        ));
    }

    state.auth.delete_user(user_id).await?;
    info!("Deleted user {}", user_id);
    Ok(Json(ResponseMessage::ok("User deleted successfully")))
}
