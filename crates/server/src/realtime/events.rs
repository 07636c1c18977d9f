//! Wire payloads for the real-time channel.
//!
//! Inbound frames are plain JSON objects. Outbound frames come in three
//! shapes (presence, chat, relayed) that share one socket, so they are
//! modelled as one enum serialized untagged.

use chrono::Local;
use serde::Serialize;
use serde_json::Value;

/// `MM/DD/YYYY, HH:MM:SS` in local time
pub const TIMESTAMP_FORMAT: &str = "%m/%d/%Y, %H:%M:%S";

pub fn timestamp_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// A validated inbound chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    pub chat_id: i64,
    pub sender_id: i64,
    pub message: String,
}

/// An inbound frame that is not a chat message, kept verbatim
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedEvent {
    pub payload: Value,
    pub reason: String,
}

impl MalformedEvent {
    fn new(payload: Value, reason: impl Into<String>) -> Self {
        Self {
            payload,
            reason: reason.into(),
        }
    }
}

/// Check that a frame carries `chat_id`, `sender_id` and `message`.
///
/// Ids may be JSON integers or numeric strings; the browser client sends
/// form values as strings.
pub fn validate(raw: Value) -> Result<ChatEvent, MalformedEvent> {
    let Some(fields) = raw.as_object() else {
        return Err(MalformedEvent::new(raw, "frame is not a JSON object"));
    };

    let chat_id = match fields.get("chat_id").map(as_id) {
        Some(Some(id)) => id,
        Some(None) => return Err(MalformedEvent::new(raw, "chat_id is not an integer")),
        None => return Err(MalformedEvent::new(raw, "missing chat_id")),
    };
    let sender_id = match fields.get("sender_id").map(as_id) {
        Some(Some(id)) => id,
        Some(None) => return Err(MalformedEvent::new(raw, "sender_id is not an integer")),
        None => return Err(MalformedEvent::new(raw, "missing sender_id")),
    };
    let message = match fields.get("message") {
        Some(Value::String(text)) => text.clone(),
        Some(_) => return Err(MalformedEvent::new(raw, "message is not a string")),
        None => return Err(MalformedEvent::new(raw, "missing message")),
    };

    Ok(ChatEvent {
        chat_id,
        sender_id,
        message,
    })
}

fn as_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PresenceStatus {
    #[serde(rename = "got connected")]
    Connected,
    #[serde(rename = "left")]
    Left,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresenceEvent {
    pub sender: String,
    #[serde(rename = "message")]
    pub status: PresenceStatus,
    pub created_at: String,
}

impl PresenceEvent {
    pub fn new(sender: impl Into<String>, status: PresenceStatus) -> Self {
        Self {
            sender: sender.into(),
            status,
            created_at: timestamp_now(),
        }
    }
}

/// Persistence outcome reported alongside a chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DbStatus {
    pub status: bool,
    pub message: String,
}

impl DbStatus {
    /// Reported as soon as the write is queued, not when it lands
    pub fn submitted() -> Self {
        Self {
            status: true,
            message: "Message sent successfully".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatBroadcast {
    pub sender: String,
    pub message: String,
    pub created_at: String,
    pub db_status: DbStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutboundEvent {
    Presence(PresenceEvent),
    Chat(ChatBroadcast),
    /// A malformed inbound frame passed through unchanged
    Relay(Value),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use serde_json::json;

    #[test]
    fn test_validate_accepts_numeric_and_string_ids() {
        let event = validate(json!({"chat_id": 1, "sender_id": 2, "message": "hi"})).unwrap();
        assert_eq!(
            event,
            ChatEvent {
                chat_id: 1,
                sender_id: 2,
                message: "hi".to_string()
            }
        );

        let event = validate(json!({"chat_id": "4", "sender_id": "5", "message": "yo"})).unwrap();
        assert_eq!((event.chat_id, event.sender_id), (4, 5));
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        let raw = json!({"chat_id": 1, "message": "hi"});
        let err = validate(raw.clone()).unwrap_err();
        assert_eq!(err.payload, raw);
        assert_eq!(err.reason, "missing sender_id");

        assert!(validate(json!("hello")).is_err());
        assert!(validate(json!({"chat_id": "x", "sender_id": 1, "message": "m"})).is_err());
        assert!(validate(json!({"chat_id": 1, "sender_id": 1, "message": 5})).is_err());
    }

    #[test]
    fn test_outbound_wire_shapes() {
        let presence = OutboundEvent::Presence(PresenceEvent {
            sender: "alice".to_string(),
            status: PresenceStatus::Connected,
            created_at: "01/02/2024, 03:04:05".to_string(),
        });
        assert_eq!(
            serde_json::to_value(&presence).unwrap(),
            json!({"sender": "alice", "message": "got connected", "created_at": "01/02/2024, 03:04:05"})
        );

        let chat = OutboundEvent::Chat(ChatBroadcast {
            sender: "bob".to_string(),
            message: "hi".to_string(),
            created_at: "01/02/2024, 03:04:05".to_string(),
            db_status: DbStatus::submitted(),
        });
        assert_eq!(
            serde_json::to_value(&chat).unwrap(),
            json!({
                "sender": "bob",
                "message": "hi",
                "created_at": "01/02/2024, 03:04:05",
                "db_status": {"status": true, "message": "Message sent successfully"}
            })
        );

        let relayed = json!({"chat_id": 1, "message": "hi"});
        assert_eq!(
            serde_json::to_value(OutboundEvent::Relay(relayed.clone())).unwrap(),
            relayed
        );
    }

    #[test]
    fn test_timestamp_format() {
        let stamp = timestamp_now();
        assert!(NaiveDateTime::parse_from_str(&stamp, TIMESTAMP_FORMAT).is_ok());
        assert_eq!(stamp.len(), "01/02/2024, 03:04:05".len());
    }
}
