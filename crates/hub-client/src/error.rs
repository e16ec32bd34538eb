//! Error types for the hub client.
//!
//! The taxonomy mirrors how failures are handled: transport errors close
//! the connection, protocol and decode errors are recoverable
//! notifications, and misuse variants mark caller contract violations.

use thiserror::Error;

/// Errors produced by the connection manager and session directory.
#[derive(Error, Debug)]
pub enum HubClientError {
    /// The WebSocket transport could not be opened.
    #[error("Failed to connect to hub: {0}")]
    Connect(String),

    /// The server rejected the connection handshake, typically a missing
    /// or invalid shared-secret header.
    #[error("Hub rejected the connection handshake (HTTP {status})")]
    HandshakeRejected {
        /// HTTP status returned during the WebSocket upgrade.
        status: u16,
    },

    /// Transport-level failure on an established connection.
    #[error("Transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    /// A session command was sent before the join acknowledgement
    /// arrived. This is a caller contract violation, not a fault to
    /// recover from.
    #[error("Session not joined yet; wait for SessionJoined before sending")]
    NotJoined,

    /// A second join was attempted on a connection that already attached.
    /// Re-attachment requires a new connection.
    #[error("Connection is already attached to a session")]
    AlreadyJoined,

    /// The connection is closed (locally, remotely, or by error).
    #[error("Connection is closed")]
    ConnectionClosed,

    /// A payload could not be serialized or deserialized.
    #[error("Failed to parse message: {0}")]
    Decode(#[from] serde_json::Error),

    /// The peer violated message sequencing rules.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// HTTP-level failure talking to the session directory.
    #[error("Directory request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The session directory answered with a non-success status.
    #[error("Directory returned HTTP {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim.
        body: String,
    },
}

/// Convenience Result type alias for hub client operations.
pub type Result<T> = std::result::Result<T, HubClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_error_display() {
        let error = HubClientError::Connect("connection refused".to_string());
        let display = format!("{error}");
        assert!(display.contains("Failed to connect to hub"));
        assert!(display.contains("connection refused"));
    }

    #[test]
    fn test_handshake_rejected_display() {
        let error = HubClientError::HandshakeRejected { status: 401 };
        assert!(format!("{error}").contains("401"));
    }

    #[test]
    fn test_not_joined_display() {
        let display = format!("{}", HubClientError::NotJoined);
        assert!(display.contains("SessionJoined"));
    }

    #[test]
    fn test_api_error_display() {
        let error = HubClientError::Api {
            status: 404,
            body: "session not found".to_string(),
        };
        let display = format!("{error}");
        assert!(display.contains("404"));
        assert!(display.contains("session not found"));
    }

    #[test]
    fn test_decode_error_from_conversion() {
        let parse_result: std::result::Result<serde_json::Value, _> =
            serde_json::from_str("{ invalid json }");
        let json_error = parse_result.unwrap_err();
        let error: HubClientError = json_error.into();
        assert!(matches!(error, HubClientError::Decode(_)));
    }
}
