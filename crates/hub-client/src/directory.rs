//! HTTP session directory client.
//!
//! Request/response access to the hub's directory endpoints: listing,
//! creating, fetching and deleting sessions, and listing prompt-profile
//! bundles. Fetching a session's detail is how a front end seeds its
//! view state with prior history before attaching the stream.

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::{HubConfig, AUTH_HEADER};
use crate::error::{HubClientError, Result};
use hub_core::{SessionDetail, SessionId, SessionSummary};
use hub_protocol::{
    CreateSessionRequest, DeleteSessionResponse, ProfileListResponse, ProfileSummary,
    SessionDetailResponse, SessionListResponse,
};

/// Client for the hub's HTTP directory.
#[derive(Debug, Clone)]
pub struct SessionDirectory {
    config: HubConfig,
    http: Client,
}

impl SessionDirectory {
    /// Creates a directory client for one hub.
    pub fn new(config: HubConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    /// Lists all sessions on the hub.
    pub async fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        let response: SessionListResponse = self.get("/sessions").await?;
        Ok(response.sessions)
    }

    /// Fetches one session with its full message history.
    pub async fn fetch_session(&self, session_id: &SessionId) -> Result<SessionDetail> {
        let path = format!("/sessions/{session_id}");
        let response: SessionDetailResponse = self.get(&path).await?;
        Ok(response.session)
    }

    /// Creates a session and returns its initial detail.
    pub async fn create_session(&self, request: &CreateSessionRequest) -> Result<SessionDetail> {
        let url = self.config.http_url("/sessions");
        debug!(url = %url, name = %request.name, "Creating session");
        let response = self
            .authorized(self.http.post(&url))
            .json(request)
            .send()
            .await?;
        let response: SessionDetailResponse = parse(response).await?;
        Ok(response.session)
    }

    /// Deletes a session; returns the id the server confirmed.
    pub async fn delete_session(&self, session_id: &SessionId) -> Result<SessionId> {
        let url = self.config.http_url(&format!("/sessions/{session_id}"));
        debug!(url = %url, "Deleting session");
        let response = self.authorized(self.http.delete(&url)).send().await?;
        let response: DeleteSessionResponse = parse(response).await?;
        Ok(response.session_id)
    }

    /// Lists the prompt-profile bundles available on the hub.
    pub async fn list_profiles(&self) -> Result<Vec<ProfileSummary>> {
        let response: ProfileListResponse = self.get("/profiles").await?;
        Ok(response.profiles)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.config.http_url(path);
        debug!(url = %url, "Directory request");
        let response = self.authorized(self.http.get(&url)).send().await?;
        parse(response).await
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.config.shared_secret {
            Some(secret) => builder.header(AUTH_HEADER, secret),
            None => builder,
        }
    }
}

/// Maps non-success statuses to a typed API error, otherwise decodes JSON.
async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(HubClientError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Scheme;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves a single canned HTTP response and captures the request head.
    async fn one_shot_server(
        status_line: &'static str,
        body: &'static str,
    ) -> (HubConfig, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.expect("accept");
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = stream.read(&mut buf).await.expect("read");
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let response = format!(
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.expect("write");
            stream.shutdown().await.ok();
            String::from_utf8_lossy(&request).into_owned()
        });
        let config = HubConfig {
            host: "127.0.0.1".to_string(),
            http_port: port,
            scheme: Scheme::Http,
            shared_secret: Some("s3cret".to_string()),
            ..HubConfig::default()
        };
        (config, handle)
    }

    #[tokio::test]
    async fn test_list_sessions_parses_and_sends_auth_header() {
        let body = r#"{"sessions":[{"id":"s1","name":"Scratch","profile":"default","createdAt":"2024-03-01T10:00:00Z","updatedAt":"2024-03-01T10:05:00Z","llmConfig":{"provider":"dummy","model":"dummy-orchestrator"}}]}"#;
        let (config, server) = one_shot_server("HTTP/1.1 200 OK", body).await;

        let directory = SessionDirectory::new(config);
        let sessions = directory.list_sessions().await.expect("list");

        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions.first().map(|s| s.id.as_str()), Some("s1"));

        let request = server.await.expect("server task");
        assert!(request.starts_with("GET /sessions HTTP/1.1"));
        assert!(request.to_lowercase().contains("x-agent-hub-auth: s3cret"));
    }

    #[tokio::test]
    async fn test_non_success_maps_to_api_error() {
        let (config, server) =
            one_shot_server("HTTP/1.1 404 Not Found", r#"{"error":"session not found"}"#).await;

        let directory = SessionDirectory::new(config);
        let result = directory.fetch_session(&SessionId::new("missing")).await;

        match result {
            Err(HubClientError::Api { status, body }) => {
                assert_eq!(status, 404);
                assert!(body.contains("session not found"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }

        let request = server.await.expect("server task");
        assert!(request.starts_with("GET /sessions/missing HTTP/1.1"));
    }
}
