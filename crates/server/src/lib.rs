//! PairChat Server Library
//!
//! Two-party chat over HTTP with a WebSocket fan-out channel.

pub mod chat;
pub mod core;
pub mod realtime;

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use axum::Router;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use chat::ai::GenAiRewriter;
use chat::chats::ChatManager;
use chat::friends::FriendManager;
use chat::messages::MessageStore;
use crate::core::auth::AuthManager;
use crate::core::config::{AppState, ChatServerConfig};
use realtime::{HubSettings, MessagePipeline, QueueSink, RealtimeHub};

/// Connect storage and wire every manager plus the real-time hub.
///
/// Also returns the persistence worker; it runs until the hub is dropped.
pub async fn build_state(config: ChatServerConfig) -> anyhow::Result<(AppState, JoinHandle<()>)> {
    let pool = crate::core::db::connect(&config.database_url).await?;

    let auth = Arc::new(AuthManager::with_cost(pool.clone(), config.bcrypt_cost));
    let friends = Arc::new(FriendManager::new(pool.clone()));
    let chats = Arc::new(ChatManager::new(pool.clone()));
    let messages = Arc::new(MessageStore::new(pool));
    info!("Managers initialized");

    let (sink, persist_worker) = QueueSink::spawn(messages.clone());

    let mut pipeline = MessagePipeline::new(auth.clone(), Arc::new(sink));
    if config.ai.enabled {
        pipeline = pipeline.with_rewriter(Arc::new(GenAiRewriter::new(&config.ai)), &config.ai.tone);
    } else {
        info!("[AI] Message rewrite disabled");
    }

    let realtime = Arc::new(RealtimeHub::new(
        pipeline,
        HubSettings {
            outbox_capacity: config.session_outbox_capacity,
            relay_malformed_events: config.relay_malformed_events,
        },
    ));

    let state = AppState {
        config,
        auth,
        friends,
        chats,
        messages,
        realtime,
    };
    Ok((state, persist_worker))
}

/// Full HTTP + WebSocket router for `state`
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .merge(crate::core::router())
        .merge(chat::router())
        .with_state(state)
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::mirror_request())
}

pub async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // Already set, ignore
    }

    info!("=== PairChat Server ===");

    let config = ChatServerConfig::from_env();
    let addr = config.bind_addr;
    info!("Database: {}", config.database_url);

    let (state, _persist_worker) = build_state(config).await?;
    let app = app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Real-time channel: ws://{}/ws/chat", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
