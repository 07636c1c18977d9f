//! Chat Service Layer
//!
//! Friendships, per-pair chats, message storage, and the optional AI
//! rewrite used by the real-time pipeline.

pub mod ai;
pub mod chats;
pub mod friends;
pub mod handlers;
pub mod messages;

pub use handlers::router;
