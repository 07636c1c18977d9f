//! Identity handlers
//!
//! Identity is the username stored in the `X-Authorization` cookie.

use crate::core::config::AppState;
use crate::core::ctx::{clear_identity_cookie, set_identity_cookie, Ctx};
use crate::core::error::{Error, Result};
use crate::core::auth::LoginOutcome;
use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

fn with_cookie(cookie: String, response: impl IntoResponse) -> Result<Response> {
    let value = HeaderValue::from_str(&cookie)
        .map_err(|_| Error::BadRequest("Username cannot be used as a cookie value".to_string()))?;
    let mut response = response.into_response();
    response.headers_mut().insert(header::SET_COOKIE, value);
    Ok(response)
}

/// POST /api/register
pub async fn register(Json(req): Json<RegisterRequest>) -> Result<Response> {
    info!("POST /api/register - {}", req.username);

    if req.username.trim().is_empty() {
        return Err(Error::BadRequest("Username is required".to_string()));
    }

    with_cookie(
        set_identity_cookie(&req.username),
        Json(json!({"message": "User registered successfully."})),
    )
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response> {
    info!("POST /api/login - {}", req.username);

    let outcome: LoginOutcome = state.auth.login(&req.username, &req.password).await?;
    if !outcome.status {
        warn!("Login rejected for {}: {}", req.username, outcome.message);
        return Ok(Json(outcome).into_response());
    }

    with_cookie(set_identity_cookie(&req.username), Json(outcome))
}

/// GET /api/logout
pub async fn logout() -> Result<Response> {
    let redirect = (StatusCode::FOUND, [(header::LOCATION, "/")]);
    with_cookie(clear_identity_cookie(), redirect)
}

/// GET /api/current_user
pub async fn current_user(ctx: Ctx) -> Json<Option<String>> {
    Json(ctx.identity().map(str::to_string))
}
