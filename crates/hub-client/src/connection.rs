//! Session connection manager.
//!
//! This module provides the `SessionConnection` which handles:
//! - One persistent WebSocket bound to exactly one session
//! - The join handshake (`JoinSession` is the first command on the wire)
//! - Fire-and-forget command sending with fail-fast state checks
//! - Sequential, single-context delivery of inbound events
//!
//! There is no automatic reconnection: transport-level closure surfaces a
//! terminal `Closed` notification and the caller decides whether to
//! re-attach with a fresh connection (and a fresh assembler, since
//! message ids are not stable across connections).
//!
//! **Panic-Free Policy:** This module follows the project's panic-free
//! guidelines. No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`,
//! or `todo!()` outside tests.

use std::sync::{Arc, Mutex};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{HubConfig, AUTH_HEADER};
use crate::error::{HubClientError, Result};
use hub_core::SessionId;
use hub_protocol::{Command, Event};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Path of the session stream endpoint on the hub.
const STREAM_PATH: &str = "/sessions";

// ============================================================================
// Connection State
// ============================================================================

/// Lifecycle of one session connection.
///
/// `SessionJoined` is the only transition out of `Open`; transport-level
/// closure from any state lands in `Closed`. A closed connection is never
/// reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport yet.
    Idle,
    /// WebSocket handshake in progress.
    Connecting,
    /// Transport open, join not yet acknowledged.
    Open,
    /// Join acknowledged; session commands may be sent.
    Joined,
    /// Local teardown requested.
    Closing,
    /// Transport gone. Terminal.
    Closed,
}

/// Why the connection ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// `close()` was called locally.
    Local,
    /// The server closed the connection.
    Remote,
    /// The transport failed.
    Error(String),
}

/// Notifications delivered to the front end, in arrival order, on the
/// connection's single processing context.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    /// A decoded server event that passed state gating.
    Protocol(Event),
    /// An inbound payload could not be parsed. The connection stays up.
    DecodeError(String),
    /// The connection ended. Emitted exactly once, last.
    Closed(CloseReason),
}

// ============================================================================
// Session Connection
// ============================================================================

/// Handle to one persistent connection attached to one session.
///
/// Created by [`SessionConnection::attach`], which also returns the single
/// event receiver. Because one receiver is consumed by one loop, events
/// are processed strictly sequentially and the assembler downstream needs
/// no locking.
///
/// Multiple sessions may be attached concurrently from one process, one
/// `SessionConnection` each; instances share no mutable state.
///
/// # Example
///
/// ```rust,ignore
/// let config = HubConfig::from_env();
/// let (conn, mut events) = SessionConnection::attach(&config, "s1".into()).await?;
/// while let Some(event) = events.recv().await {
///     // feed the assembler / view state
/// }
/// ```
pub struct SessionConnection {
    session_id: SessionId,
    state: Arc<Mutex<ConnectionState>>,
    outbound_tx: mpsc::UnboundedSender<Message>,
    cancel: CancellationToken,
}

impl SessionConnection {
    /// Opens the transport and binds it to `session_id`.
    ///
    /// On success the `JoinSession` command has already been transmitted
    /// as the first frame; the caller should wait for the
    /// `SessionJoined` event before sending session-scoped commands.
    ///
    /// Does not retry: a refused transport or rejected handshake is
    /// returned to the caller as a terminal error.
    pub async fn attach(
        config: &HubConfig,
        session_id: SessionId,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ConnectionEvent>)> {
        let state = Arc::new(Mutex::new(ConnectionState::Idle));
        set_state(&state, ConnectionState::Connecting);

        let url = config.ws_url(STREAM_PATH);
        debug!(url = %url, session_id = %session_id, "Connecting to hub");

        let mut request = url
            .into_client_request()
            .map_err(|e| HubClientError::Connect(e.to_string()))?;
        if let Some(secret) = &config.shared_secret {
            let value = HeaderValue::from_str(secret).map_err(|_| {
                HubClientError::Connect("shared secret is not a valid header value".to_string())
            })?;
            request.headers_mut().insert(AUTH_HEADER, value);
        }

        let (socket, _response) = connect_async(request).await.map_err(map_connect_error)?;
        set_state(&state, ConnectionState::Open);
        info!(session_id = %session_id, "Connected to hub");

        let (mut sink, stream) = socket.split();

        // JoinSession is the first and only attach command on this
        // connection; re-attachment requires a new connection.
        let join = serde_json::to_string(&Command::join(session_id.clone()))?;
        sink.send(Message::text(join)).await?;

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        tokio::spawn(writer_task(sink, outbound_rx, cancel.clone()));
        tokio::spawn(reader_task(
            stream,
            event_tx,
            outbound_tx.clone(),
            Arc::clone(&state),
            cancel.clone(),
            session_id.clone(),
        ));

        let connection = Self {
            session_id,
            state,
            outbound_tx,
            cancel,
        };
        Ok((connection, event_rx))
    }

    /// Serializes and enqueues a command, fire-and-forget.
    ///
    /// Fails fast when the connection is not in a state that permits the
    /// command: session commands require `Joined`, `Ping` only requires
    /// an open transport, and a second `JoinSession` is always rejected.
    pub fn send(&self, command: Command) -> Result<()> {
        if matches!(command, Command::JoinSession { .. }) {
            return Err(HubClientError::AlreadyJoined);
        }

        match self.state() {
            ConnectionState::Closing | ConnectionState::Closed => {
                return Err(HubClientError::ConnectionClosed)
            }
            ConnectionState::Joined => {}
            ConnectionState::Open if matches!(command, Command::Ping { .. }) => {}
            _ => return Err(HubClientError::NotJoined),
        }

        let json = serde_json::to_string(&command)?;
        debug!(session_id = %self.session_id, "Sending command");
        self.outbound_tx
            .send(Message::text(json))
            .map_err(|_| HubClientError::ConnectionClosed)?;
        Ok(())
    }

    /// Requests teardown. Idempotent: the transport is torn down exactly
    /// once whether closure is local, remote, or caused by an error, and
    /// the `Closed` notification is emitted exactly once.
    pub fn close(&self) {
        {
            if let Ok(mut guard) = self.state.lock() {
                if *guard != ConnectionState::Closed {
                    *guard = ConnectionState::Closing;
                }
            }
        }
        self.cancel.cancel();
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.state
            .lock()
            .map(|guard| *guard)
            .unwrap_or(ConnectionState::Closed)
    }

    /// Returns true once the join has been acknowledged.
    #[must_use]
    pub fn is_joined(&self) -> bool {
        self.state() == ConnectionState::Joined
    }

    /// The session this connection is attached to.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }
}

impl Drop for SessionConnection {
    /// Scoped release: dropping the handle tears the transport down the
    /// same way an explicit `close()` would.
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn map_connect_error(error: WsError) -> HubClientError {
    match error {
        WsError::Http(response) => HubClientError::HandshakeRejected {
            status: response.status().as_u16(),
        },
        other => HubClientError::Connect(other.to_string()),
    }
}

fn set_state(state: &Arc<Mutex<ConnectionState>>, next: ConnectionState) {
    if let Ok(mut guard) = state.lock() {
        *guard = next;
    }
}

fn current_state(state: &Arc<Mutex<ConnectionState>>) -> ConnectionState {
    state
        .lock()
        .map(|guard| *guard)
        .unwrap_or(ConnectionState::Closed)
}

// ============================================================================
// Writer Task
// ============================================================================

/// Drains the outbound queue into the sink. Sending never blocks inbound
/// processing; the reader owns the other half of the socket.
async fn writer_task(
    mut sink: SplitSink<WsStream, Message>,
    mut outbound_rx: mpsc::UnboundedReceiver<Message>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            maybe_frame = outbound_rx.recv() => {
                match maybe_frame {
                    Some(frame) => {
                        if let Err(e) = sink.send(frame).await {
                            warn!(error = %e, "Failed to write frame, closing");
                            cancel.cancel();
                            break;
                        }
                    }
                    None => break,
                }
            }
            _ = cancel.cancelled() => {
                // Best-effort close frame; the peer may already be gone.
                let _ = sink.send(Message::Close(None)).await;
                break;
            }
        }
    }
    debug!("Writer task finished");
}

// ============================================================================
// Reader Task
// ============================================================================

/// The connection's single processing context. Decodes frames, applies
/// state gating, and forwards events in arrival order. One event is
/// handled to completion before the next is read, so consumers never see
/// interleaved delivery.
async fn reader_task(
    mut stream: SplitStream<WsStream>,
    event_tx: mpsc::UnboundedSender<ConnectionEvent>,
    outbound_tx: mpsc::UnboundedSender<Message>,
    state: Arc<Mutex<ConnectionState>>,
    cancel: CancellationToken,
    session_id: SessionId,
) {
    let reason = loop {
        tokio::select! {
            _ = cancel.cancelled() => break CloseReason::Local,
            frame = stream.next() => {
                match frame {
                    None => break CloseReason::Remote,
                    Some(Err(e)) => break CloseReason::Error(e.to_string()),
                    Some(Ok(Message::Text(text))) => {
                        handle_frame(text.as_str(), &event_tx, &state, &session_id);
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        let _ = outbound_tx.send(Message::Pong(payload));
                    }
                    Some(Ok(Message::Close(_))) => break CloseReason::Remote,
                    Some(Ok(_)) => {
                        // Binary and pong frames carry nothing for us.
                    }
                }
            }
        }
    };

    set_state(&state, ConnectionState::Closed);
    cancel.cancel();
    info!(session_id = %session_id, reason = ?reason, "Connection closed");
    let _ = event_tx.send(ConnectionEvent::Closed(reason));
}

/// Decodes one text frame and forwards it if the state machine allows.
///
/// Before the join acknowledgement only `SessionJoined` and `Error` may
/// pass; anything else is a protocol violation, logged and dropped so it
/// can never be mistaken for assistant content. Malformed payloads are
/// local decode errors and do not count against sequencing.
fn handle_frame(
    text: &str,
    event_tx: &mpsc::UnboundedSender<ConnectionEvent>,
    state: &Arc<Mutex<ConnectionState>>,
    session_id: &SessionId,
) {
    let event: Event = match serde_json::from_str(text) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "Failed to decode inbound payload");
            let _ = event_tx.send(ConnectionEvent::DecodeError(e.to_string()));
            return;
        }
    };

    let joined = current_state(state) == ConnectionState::Joined;
    match &event {
        Event::SessionJoined { session_id: acked } => {
            if joined {
                warn!(session_id = %acked, "Duplicate SessionJoined dropped");
                return;
            }
            if acked != session_id {
                warn!(
                    expected = %session_id,
                    got = %acked,
                    "SessionJoined for a different session dropped"
                );
                return;
            }
            set_state(state, ConnectionState::Joined);
            debug!(session_id = %acked, "Join acknowledged");
        }
        Event::Error { code, message } => {
            debug!(code = %code, message = %message, "Server error event");
        }
        _ if !joined => {
            warn!(session_id = %session_id, "Event before join acknowledgement dropped");
            return;
        }
        _ => {}
    }

    let _ = event_tx.send(ConnectionEvent::Protocol(event));
}

// ============================================================================
// Tests
// ============================================================================
