//! Core Router
//!
//! Handles identity and user routes.

use crate::core::auth::handlers;
use crate::core::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        // Identity routes
        .route("/api/register", post(handlers::register))
        .route("/api/login", post(handlers::login))
        .route("/api/logout", get(handlers::logout))
        .route("/api/current_user", get(handlers::current_user))
        // User routes
        .route(
            "/api/users",
            get(handlers::read_users).post(handlers::create_user),
        )
        .route(
            "/api/users/{user_id}",
            get(handlers::read_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
}
