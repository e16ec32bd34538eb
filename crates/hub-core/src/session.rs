//! Session identity and server-authoritative session metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// ============================================================================
// Type-Safe Identifiers
// ============================================================================

/// Unique identifier for a hub session.
///
/// Opaque string supplied by the server (or by the caller when attaching).
/// The client never generates session identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a new SessionId from a string.
    ///
    /// Note: This does not validate the format. The hub provides the
    /// identifier, so we trust its shape.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the underlying string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a shortened display form (first 8 characters).
    #[must_use]
    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// LLM Configuration
// ============================================================================

/// Backend provider a session is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    /// Deterministic echo provider used by the hub for local development.
    Dummy,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::Anthropic => write!(f, "anthropic"),
            Self::Dummy => write!(f, "dummy"),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "dummy" => Ok(Self::Dummy),
            other => Err(format!(
                "unknown provider '{other}' (expected openai, anthropic or dummy)"
            )),
        }
    }
}

/// Provider/model configuration attached to a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmConfig {
    pub provider: ProviderKind,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

// ============================================================================
// Session Metadata
// ============================================================================

/// Server-authoritative session metadata.
///
/// Received over the wire in `SessionUpdated` events and directory
/// responses. A newly received summary replaces, never merges with,
/// the locally cached one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: SessionId,
    pub name: String,
    pub profile: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub llm_config: LlmConfig,
    #[serde(default)]
    pub meta: Value,
}

/// A single message in a session's persisted history.
///
/// Only seen in directory responses; live assistant output arrives as
/// chunk events instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMessage {
    pub id: String,
    pub role: crate::chat::Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub meta: Value,
}

/// Session metadata plus its full ordered message history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDetail {
    #[serde(flatten)]
    pub summary: SessionSummary,
    pub messages: Vec<SessionMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_display_and_short() {
        let id = SessionId::new("8e11bfb5-7dc2-432b-9206-928fa5c35731");
        assert_eq!(format!("{id}"), "8e11bfb5-7dc2-432b-9206-928fa5c35731");
        assert_eq!(id.short(), "8e11bfb5");
    }

    #[test]
    fn test_session_id_short_on_short_input() {
        let id = SessionId::new("s1");
        assert_eq!(id.short(), "s1");
    }

    #[test]
    fn test_provider_kind_wire_names() {
        assert_eq!(
            serde_json::to_string(&ProviderKind::OpenAi).unwrap(),
            "\"openai\""
        );
        assert_eq!(
            serde_json::to_string(&ProviderKind::Anthropic).unwrap(),
            "\"anthropic\""
        );
        assert_eq!(
            serde_json::to_string(&ProviderKind::Dummy).unwrap(),
            "\"dummy\""
        );
    }

    #[test]
    fn test_provider_kind_parses_wire_names() {
        assert_eq!("openai".parse(), Ok(ProviderKind::OpenAi));
        assert_eq!("anthropic".parse(), Ok(ProviderKind::Anthropic));
        assert_eq!("dummy".parse(), Ok(ProviderKind::Dummy));
        assert!("gpt4".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_session_summary_camel_case_fields() {
        let json = r#"{
            "id": "s1",
            "name": "Scratch",
            "profile": "default",
            "createdAt": "2024-03-01T10:00:00Z",
            "updatedAt": "2024-03-01T10:05:00Z",
            "llmConfig": {"provider": "dummy", "model": "dummy-orchestrator"}
        }"#;

        let summary: SessionSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.id.as_str(), "s1");
        assert_eq!(summary.llm_config.provider, ProviderKind::Dummy);
        assert!(summary.llm_config.temperature.is_none());
        assert!(summary.meta.is_null());
    }

    #[test]
    fn test_session_detail_flattens_summary() {
        let json = r#"{
            "id": "s1",
            "name": "Scratch",
            "profile": "default",
            "createdAt": "2024-03-01T10:00:00Z",
            "updatedAt": "2024-03-01T10:05:00Z",
            "llmConfig": {"provider": "anthropic", "model": "claude-3-5-sonnet", "temperature": 0.2},
            "messages": [
                {
                    "id": "m1",
                    "role": "user",
                    "content": "hello",
                    "timestamp": "2024-03-01T10:01:00Z"
                }
            ]
        }"#;

        let detail: SessionDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.summary.name, "Scratch");
        assert_eq!(detail.messages.len(), 1);
        assert_eq!(detail.messages.first().map(|m| m.content.as_str()), Some("hello"));
    }
}
