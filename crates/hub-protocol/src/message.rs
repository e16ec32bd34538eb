//! Protocol message types for the session WebSocket.
//!
//! Wire format: JSON text frames with a `type` discriminant in PascalCase
//! and camelCase field names, e.g.
//! `{"type":"AssistantMessageChunk","messageId":"m1","sessionId":"s1","textChunk":"Hel"}`.
//!
//! Chunk events carry no sequence number; ordering is defined entirely by
//! the connection's in-order, single-context delivery.

use hub_core::{SessionId, SessionSummary};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Commands sent by a client to the hub.
///
/// Every command except `Ping` carries the identifier of the session the
/// connection is attached to; a connection attaches to exactly one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Command {
    /// Binds the connection to one session. Sent exactly once, as the
    /// first command after the transport opens.
    JoinSession { session_id: SessionId },

    /// A user turn for the attached session.
    UserMessage {
        session_id: SessionId,
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        meta: Option<Value>,
    },

    /// Connection heartbeat. May be sent any time after the transport
    /// opens; the server's reaction to it is unspecified.
    Ping { timestamp: i64 },
}

impl Command {
    /// Creates a join command.
    pub fn join(session_id: impl Into<SessionId>) -> Self {
        Self::JoinSession {
            session_id: session_id.into(),
        }
    }

    /// Creates a user message command without metadata.
    pub fn user_message(session_id: impl Into<SessionId>, content: impl Into<String>) -> Self {
        Self::UserMessage {
            session_id: session_id.into(),
            content: content.into(),
            meta: None,
        }
    }

    /// Creates a ping command stamped with the current time.
    pub fn ping_now() -> Self {
        Self::Ping {
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Returns the session identifier the command is scoped to, if any.
    pub fn session_id(&self) -> Option<&SessionId> {
        match self {
            Self::JoinSession { session_id } | Self::UserMessage { session_id, .. } => {
                Some(session_id)
            }
            Self::Ping { .. } => None,
        }
    }
}

/// Events sent by the hub to an attached client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Event {
    /// Acknowledges the join; the only transition out of the unjoined state.
    SessionJoined { session_id: SessionId },

    /// A new assistant message began streaming.
    AssistantMessageStart {
        message_id: String,
        session_id: SessionId,
    },

    /// An incremental fragment of assistant output, ordered by arrival.
    AssistantMessageChunk {
        message_id: String,
        session_id: SessionId,
        text_chunk: String,
    },

    /// The assistant message identified by `message_id` is complete.
    AssistantMessageComplete {
        message_id: String,
        session_id: SessionId,
    },

    /// Server-authoritative metadata; replaces the cached summary wholesale.
    SessionUpdated { session: SessionSummary },

    /// Application-level error; the session remains attached.
    Error { code: String, message: String },
}

impl Event {
    /// Creates a join acknowledgement.
    pub fn session_joined(session_id: impl Into<SessionId>) -> Self {
        Self::SessionJoined {
            session_id: session_id.into(),
        }
    }

    /// Creates a message-start event.
    pub fn start(message_id: impl Into<String>, session_id: impl Into<SessionId>) -> Self {
        Self::AssistantMessageStart {
            message_id: message_id.into(),
            session_id: session_id.into(),
        }
    }

    /// Creates a chunk event.
    pub fn chunk(
        message_id: impl Into<String>,
        session_id: impl Into<SessionId>,
        text_chunk: impl Into<String>,
    ) -> Self {
        Self::AssistantMessageChunk {
            message_id: message_id.into(),
            session_id: session_id.into(),
            text_chunk: text_chunk.into(),
        }
    }

    /// Creates a message-complete event.
    pub fn complete(message_id: impl Into<String>, session_id: impl Into<SessionId>) -> Self {
        Self::AssistantMessageComplete {
            message_id: message_id.into(),
            session_id: session_id.into(),
        }
    }

    /// Creates an error event.
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_command_wire_shape() {
        let cmd = Command::join("s1");
        let json = serde_json::to_string(&cmd).unwrap();
        assert_eq!(json, r#"{"type":"JoinSession","sessionId":"s1"}"#);
    }

    #[test]
    fn test_user_message_omits_empty_meta() {
        let cmd = Command::user_message("s1", "hi");
        let json = serde_json::to_string(&cmd).unwrap();
        assert_eq!(
            json,
            r#"{"type":"UserMessage","sessionId":"s1","content":"hi"}"#
        );
    }

    #[test]
    fn test_user_message_carries_meta() {
        let cmd = Command::UserMessage {
            session_id: SessionId::new("s1"),
            content: "hi".to_string(),
            meta: Some(serde_json::json!({"source": "cli"})),
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains(r#""meta":{"source":"cli"}"#));
    }

    #[test]
    fn test_ping_wire_shape() {
        let cmd = Command::Ping { timestamp: 1700000000000 };
        let json = serde_json::to_string(&cmd).unwrap();
        assert_eq!(json, r#"{"type":"Ping","timestamp":1700000000000}"#);
    }

    #[test]
    fn test_command_session_id() {
        assert_eq!(
            Command::join("s1").session_id().map(SessionId::as_str),
            Some("s1")
        );
        assert_eq!(Command::ping_now().session_id(), None);
    }

    #[test]
    fn test_chunk_event_roundtrip() {
        let json = r#"{"type":"AssistantMessageChunk","messageId":"m1","sessionId":"s1","textChunk":"Hel"}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event, Event::chunk("m1", "s1", "Hel"));
        assert_eq!(serde_json::to_string(&event).unwrap(), json);
    }

    #[test]
    fn test_session_joined_roundtrip() {
        let json = r#"{"type":"SessionJoined","sessionId":"s1"}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event, Event::session_joined("s1"));
    }

    #[test]
    fn test_error_event_fields() {
        let json = r#"{"type":"Error","code":"RATE_LIMIT","message":"slow down"}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event, Event::error("RATE_LIMIT", "slow down"));
    }

    #[test]
    fn test_session_updated_parses_summary() {
        let json = r#"{
            "type": "SessionUpdated",
            "session": {
                "id": "s1",
                "name": "Scratch",
                "profile": "default",
                "createdAt": "2024-03-01T10:00:00Z",
                "updatedAt": "2024-03-01T10:05:00Z",
                "llmConfig": {"provider": "dummy", "model": "dummy-orchestrator"}
            }
        }"#;
        let event: Event = serde_json::from_str(json).unwrap();
        match event {
            Event::SessionUpdated { session } => {
                assert_eq!(session.id.as_str(), "s1");
                assert_eq!(session.profile, "default");
            }
            other => panic!("expected SessionUpdated, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_event_type_is_a_parse_error() {
        let json = r#"{"type":"SomethingNew","sessionId":"s1"}"#;
        assert!(serde_json::from_str::<Event>(json).is_err());
    }
}
