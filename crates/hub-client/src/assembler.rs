//! Message assembler.
//!
//! Folds the chunk stream into complete, ordered assistant messages and
//! drives the session view state. Chunks are concatenated strictly in
//! arrival order; the protocol carries no sequence number, so ordering
//! correctness rests on the connection's in-order, single-context
//! delivery.
//!
//! One assembler belongs to one connection and must be discarded (not
//! reused) across reconnects, since message ids are not guaranteed
//! stable across connections.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::view::SessionViewState;
use hub_protocol::Event;

/// Error code attached to notices raised for sequencing violations.
const VIOLATION_CODE: &str = "protocol-violation";

/// Accumulates in-flight assistant messages keyed by message id.
///
/// An in-flight message is created on `AssistantMessageStart`, grown
/// append-only by `AssistantMessageChunk`, and removed (finalized) on
/// `AssistantMessageComplete`. At most one in-flight message exists per
/// id.
#[derive(Debug, Default)]
pub struct MessageAssembler {
    in_flight: HashMap<String, String>,
}

impl MessageAssembler {
    /// Creates an empty assembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of started-but-not-complete messages.
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Applies one server event to the view state.
    ///
    /// Events referencing unknown message ids never crash and never
    /// create a chat entry; they raise a recoverable notice instead.
    pub fn apply(&mut self, event: Event, view: &mut SessionViewState) {
        match event {
            Event::SessionJoined { session_id } => {
                debug!(session_id = %session_id, "Session joined");
            }

            Event::AssistantMessageStart { message_id, .. } => {
                if self.in_flight.contains_key(&message_id) {
                    warn!(message_id = %message_id, "Duplicate AssistantMessageStart dropped");
                    view.apply_error(
                        VIOLATION_CODE,
                        format!("duplicate start for message {message_id}"),
                    );
                    return;
                }
                self.in_flight.insert(message_id.clone(), String::new());
                view.upsert_assistant_entry(&message_id, "");
            }

            Event::AssistantMessageChunk {
                message_id,
                text_chunk,
                ..
            } => match self.in_flight.get_mut(&message_id) {
                Some(accumulated) => {
                    // Verbatim append: no trimming, no deduplication
                    accumulated.push_str(&text_chunk);
                    let text = accumulated.clone();
                    view.upsert_assistant_entry(&message_id, text);
                }
                None => {
                    warn!(message_id = %message_id, "Chunk for unknown message dropped");
                    view.apply_error(
                        VIOLATION_CODE,
                        format!("chunk for unknown message {message_id}"),
                    );
                }
            },

            Event::AssistantMessageComplete { message_id, .. } => {
                match self.in_flight.remove(&message_id) {
                    Some(text) => {
                        view.finalize_assistant_entry(&message_id, text);
                    }
                    None if view.has_final_assistant_entry(&message_id) => {
                        // Networks may redeliver; a late duplicate
                        // completion is a no-op, not an error.
                        debug!(message_id = %message_id, "Duplicate completion ignored");
                    }
                    None => {
                        warn!(message_id = %message_id, "Completion for unknown message dropped");
                        view.apply_error(
                            VIOLATION_CODE,
                            format!("completion for unknown message {message_id}"),
                        );
                    }
                }
            }

            Event::SessionUpdated { session } => {
                view.apply_session_summary(session);
            }

            Event::Error { code, message } => {
                view.apply_error(code, message);
            }
        }
    }
}
