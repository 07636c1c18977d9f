//! Auth and User Handlers

pub mod auth;
pub mod users;

pub use auth::{current_user, login, logout, register};
pub use users::{create_user, delete_user, read_user, read_users, update_user};
