//! Hub endpoint configuration.
//!
//! One explicit `HubConfig` is constructed at process start (usually via
//! [`HubConfig::from_env`]) and passed by reference into the connection
//! manager and directory client. Nothing reads configuration implicitly
//! mid-flow.

use std::fmt;

/// Header carrying the static shared secret, when one is configured.
pub const AUTH_HEADER: &str = "x-agent-hub-auth";

/// Scheme the hub is served over. Selects ws/wss for the stream endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    fn http_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }

    fn ws_str(self) -> &'static str {
        match self {
            Self::Http => "ws",
            Self::Https => "wss",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.http_str())
    }
}

/// Resolved endpoint configuration for one hub.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Host the hub listens on.
    pub host: String,

    /// Port of the HTTP session directory.
    pub http_port: u16,

    /// Port of the session WebSocket endpoint.
    pub ws_port: u16,

    /// Scheme for both endpoints.
    pub scheme: Scheme,

    /// Static shared secret sent as the `x-agent-hub-auth` header on every
    /// request and at WebSocket open. Not renegotiated mid-connection.
    pub shared_secret: Option<String>,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            http_port: 42001,
            ws_port: 42002,
            scheme: Scheme::Http,
            shared_secret: None,
        }
    }
}

impl HubConfig {
    /// Resolves configuration from `AGENT_HUB_*` environment variables,
    /// falling back to local defaults.
    pub fn from_env() -> Self {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Resolves configuration from an arbitrary variable source.
    ///
    /// Unparseable ports and unknown schemes fall back to defaults rather
    /// than failing; a misconfigured environment should not prevent
    /// talking to a local hub.
    pub fn resolve(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let scheme = match var("AGENT_HUB_PROTOCOL").as_deref() {
            Some("https") => Scheme::Https,
            Some("http") | None => Scheme::Http,
            Some(_) => defaults.scheme,
        };

        Self {
            host: var("AGENT_HUB_HOST").unwrap_or(defaults.host),
            http_port: var("AGENT_HUB_HTTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.http_port),
            ws_port: var("AGENT_HUB_WS_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.ws_port),
            scheme,
            shared_secret: var("AGENT_HUB_SECRET").filter(|s| !s.is_empty()),
        }
    }

    /// Builds a directory URL, e.g. `http://127.0.0.1:42001/sessions`.
    pub fn http_url(&self, path: &str) -> String {
        format!(
            "{}://{}:{}{}",
            self.scheme.http_str(),
            self.host,
            self.http_port,
            path
        )
    }

    /// Builds a stream URL, e.g. `ws://127.0.0.1:42002/sessions`.
    pub fn ws_url(&self, path: &str) -> String {
        format!(
            "{}://{}:{}{}",
            self.scheme.ws_str(),
            self.host,
            self.ws_port,
            path
        )
    }
}
