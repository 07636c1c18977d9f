//! Error types for the real-time subsystem.

use thiserror::Error;

use super::registry::SessionId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Session {session} is not registered for {identity}")]
    NotFound { session: SessionId, identity: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Unknown sender: {0}")]
    UnknownSender(i64),

    #[error("Sender lookup failed: {0}")]
    Lookup(String),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("No identity credential at accept time")]
    Unauthenticated,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Peer outbox is full")]
    Full,

    #[error("Peer connection closed")]
    Closed,
}
