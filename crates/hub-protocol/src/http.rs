//! Request/response payloads for the HTTP session directory.

use hub_core::{ProviderKind, SessionDetail, SessionId, SessionSummary};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `GET /sessions` response.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionSummary>,
}

/// `GET /sessions/:id` and `POST /sessions` response.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionDetailResponse {
    pub session: SessionDetail,
}

/// Alias kept separate so call sites read as what they do.
pub type CreateSessionResponse = SessionDetailResponse;

/// `DELETE /sessions/:id` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSessionResponse {
    pub session_id: SessionId,
}

/// Partial LLM configuration for session creation; unset fields fall back
/// to the server's profile defaults.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmConfigPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// `POST /sessions` request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub name: String,
    pub profile: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_config: Option<LlmConfigPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl CreateSessionRequest {
    /// Creates a request that takes every default from the named profile.
    pub fn new(name: impl Into<String>, profile: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            profile: profile.into(),
            llm_config: None,
            meta: None,
        }
    }
}

/// One prompt-profile bundle available on the hub.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub modes: Vec<String>,
}

/// `GET /profiles` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileListResponse {
    pub profiles: Vec<ProfileSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_minimal_body() {
        let request = CreateSessionRequest::new("Scratch", "default");
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"name":"Scratch","profile":"default"}"#);
    }

    #[test]
    fn test_create_request_with_overrides() {
        let request = CreateSessionRequest {
            llm_config: Some(LlmConfigPatch {
                provider: Some(ProviderKind::Anthropic),
                model: Some("claude-3-5-sonnet".to_string()),
                temperature: None,
            }),
            ..CreateSessionRequest::new("Scratch", "default")
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains(r#""llmConfig":{"provider":"anthropic","model":"claude-3-5-sonnet"}"#));
    }

    #[test]
    fn test_session_list_response_parses() {
        let json = r#"{"sessions": [{
            "id": "s1",
            "name": "Scratch",
            "profile": "default",
            "createdAt": "2024-03-01T10:00:00Z",
            "updatedAt": "2024-03-01T10:05:00Z",
            "llmConfig": {"provider": "openai", "model": "gpt-4o-mini"}
        }]}"#;
        let response: SessionListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.sessions.len(), 1);
    }

    #[test]
    fn test_delete_response_parses() {
        let response: DeleteSessionResponse =
            serde_json::from_str(r#"{"sessionId":"s1"}"#).unwrap();
        assert_eq!(response.session_id.as_str(), "s1");
    }

    #[test]
    fn test_profile_list_tolerates_missing_optionals() {
        let json = r#"{"profiles":[{"id":"default","name":"Default"}]}"#;
        let response: ProfileListResponse = serde_json::from_str(json).unwrap();
        let profile = response.profiles.first().expect("one profile");
        assert!(profile.description.is_none());
        assert!(profile.modes.is_empty());
    }
}
