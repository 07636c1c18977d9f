//! Chat server configuration

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use tracing::warn;

use crate::chat::chats::ChatManager;
use crate::chat::friends::FriendManager;
use crate::chat::messages::MessageStore;
use crate::core::auth::AuthManager;
use crate::realtime::RealtimeHub;

/// Settings for the optional message rewrite step
#[derive(Clone, Debug)]
pub struct AiConfig {
    /// When false, outbound text is the sender's text unchanged
    pub enabled: bool,
    /// Style hint passed to the rewriter
    pub tone: String,
    /// Model identifier understood by genai (provider inferred from the name)
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tone: "nice".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.5,
            max_tokens: 50,
            top_p: 1.0,
        }
    }
}

/// Configuration for the PairChat server
#[derive(Clone, Debug)]
pub struct ChatServerConfig {
    /// Address the HTTP listener binds to
    pub bind_addr: SocketAddr,
    /// SQLite database URL, also the target of the persistence queue
    pub database_url: String,
    /// Rewrite step settings
    pub ai: AiConfig,
    /// Per-session outbound queue depth. Delivery never waits: a peer whose
    /// queue is full misses the event (logged as a delivery failure).
    pub session_outbox_capacity: usize,
    /// Broadcast frames that fail validation verbatim instead of dropping them
    pub relay_malformed_events: bool,
    /// Origins allowed by CORS (credentials enabled)
    pub cors_origins: Vec<String>,
    /// bcrypt cost for stored passwords
    pub bcrypt_cost: u32,
}

impl Default for ChatServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            database_url: "sqlite://chat_app.db".to_string(),
            ai: AiConfig::default(),
            session_outbox_capacity: 64,
            relay_malformed_events: true,
            cors_origins: vec![
                "http://localhost".to_string(),
                "http://localhost:8080".to_string(),
            ],
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl ChatServerConfig {
    /// Build a config from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let ai_defaults = AiConfig::default();

        let cors_origins = lookup("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or(defaults.cors_origins);

        Self {
            bind_addr: parse_or(&lookup, "BIND_ADDR", defaults.bind_addr),
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            ai: AiConfig {
                enabled: parse_flag(&lookup, "AI_ENABLED", ai_defaults.enabled),
                tone: lookup("AI_TONE").unwrap_or(ai_defaults.tone),
                model: lookup("AI_MODEL").unwrap_or(ai_defaults.model),
                temperature: parse_or(&lookup, "AI_TEMPERATURE", ai_defaults.temperature),
                max_tokens: parse_or(&lookup, "AI_MAX_TOKENS", ai_defaults.max_tokens),
                top_p: parse_or(&lookup, "AI_TOP_P", ai_defaults.top_p),
            },
            session_outbox_capacity: parse_or(
                &lookup,
                "SESSION_OUTBOX_CAPACITY",
                defaults.session_outbox_capacity,
            )
            .max(1),
            relay_malformed_events: parse_flag(
                &lookup,
                "RELAY_MALFORMED_EVENTS",
                defaults.relay_malformed_events,
            ),
            cors_origins,
            bcrypt_cost: parse_or(&lookup, "BCRYPT_COST", defaults.bcrypt_cost),
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("Ignoring invalid value for {}: {:?}", key, raw);
                default
            }
        },
        None => default,
    }
}

fn parse_flag(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    match lookup(key).map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        Some(v) => {
            warn!("Ignoring invalid flag for {}: {:?}", key, v);
            default
        }
        None => default,
    }
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: ChatServerConfig,
    pub auth: Arc<AuthManager>,
    pub friends: Arc<FriendManager>,
    pub chats: Arc<ChatManager>,
    pub messages: Arc<MessageStore>,
    pub realtime: Arc<RealtimeHub>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_env_empty() {
        let config = ChatServerConfig::from_lookup(|_| None);
        assert!(config.ai.enabled);
        assert_eq!(config.ai.tone, "nice");
        assert_eq!(config.bind_addr.port(), 8000);
        assert!(config.relay_malformed_events);
        assert_eq!(config.cors_origins.len(), 2);
    }

    #[test]
    fn test_overrides_from_env() {
        let config = ChatServerConfig::from_lookup(lookup_from(&[
            ("AI_ENABLED", "false"),
            ("AI_TONE", "formal"),
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("SESSION_OUTBOX_CAPACITY", "0"),
            ("CORS_ORIGINS", "http://a.test, http://b.test"),
        ]));
        assert!(!config.ai.enabled);
        assert_eq!(config.ai.tone, "formal");
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.session_outbox_capacity, 1);
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = ChatServerConfig::from_lookup(lookup_from(&[
            ("AI_ENABLED", "maybe"),
            ("AI_MAX_TOKENS", "lots"),
        ]));
        assert!(config.ai.enabled);
        assert_eq!(config.ai.max_tokens, 50);
    }
}
