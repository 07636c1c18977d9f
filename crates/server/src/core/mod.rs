//! Core Service Layer
//!
//! Shared infrastructure for the server: configuration, identity,
//! users, storage, and error handling.

pub mod auth;
pub mod config;
pub mod ctx;
pub mod db;
pub mod error;
pub mod models;
pub mod router;

// Re-exports for convenience
pub use config::{AiConfig, AppState, ChatServerConfig};
pub use ctx::Ctx;
pub use error::{Error, Result};
pub use router::router;
