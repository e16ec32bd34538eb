//! Client-local session view state.
//!
//! The read model front ends render. It is mutated from exactly two
//! places: the message assembler (assistant entries, session metadata)
//! and the local echo of user input. Chat entries are append-only and
//! ordered by arrival; protocol events never delete an entry.
//!
//! One view instance belongs to one connection's processing context, so
//! no internal synchronization is needed.

use std::collections::VecDeque;

use hub_core::{ChatEntry, EntryState, Role, SessionDetail, SessionId, SessionSummary};
use tracing::debug;

/// Transient notification surfaced to the front end; never part of chat
/// history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub code: String,
    pub message: String,
}

/// The client-side mirror of one session.
#[derive(Debug, Default)]
pub struct SessionViewState {
    session_id: SessionId,
    entries: Vec<ChatEntry>,
    summary: Option<SessionSummary>,
    notices: VecDeque<Notice>,
    next_local_id: u64,
}

impl SessionViewState {
    /// Creates an empty view for one session.
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            ..Self::default()
        }
    }

    /// Seeds the view from a fetched session detail (persisted history
    /// plus current metadata), before attaching the stream.
    pub fn seed_from_detail(&mut self, detail: &SessionDetail) {
        self.summary = Some(detail.summary.clone());
        self.entries = detail
            .messages
            .iter()
            .map(|msg| ChatEntry::complete(msg.id.clone(), msg.role, msg.content.clone()))
            .collect();
        debug!(
            session_id = %self.session_id,
            count = self.entries.len(),
            "View seeded from session history"
        );
    }

    /// Appends an optimistic user echo, before any server acknowledgement,
    /// and returns the locally assigned entry id.
    ///
    /// There is no rollback: the protocol carries no correlation data, so
    /// a server-side failure leaves the entry shown (and pending).
    pub fn add_user_entry(&mut self, text: impl Into<String>) -> String {
        self.next_local_id += 1;
        let id = format!("local-{}", self.next_local_id);
        self.entries.push(ChatEntry::user(id.clone(), text));
        id
    }

    /// Inserts or replaces the assistant entry with the given id.
    ///
    /// Insertion appends (arrival order); replacement swaps the text of
    /// the existing entry in place while it streams.
    pub fn upsert_assistant_entry(&mut self, message_id: &str, text: impl Into<String>) {
        let text = text.into();
        match self.entry_mut(message_id) {
            Some(entry) => entry.text = text,
            None => {
                let mut entry = ChatEntry::assistant(message_id);
                entry.text = text;
                self.entries.push(entry);
            }
        }
    }

    /// Marks the assistant entry finalized with its definitive text.
    /// No further mutation is expected afterwards.
    pub fn finalize_assistant_entry(&mut self, message_id: &str, text: String) {
        match self.entry_mut(message_id) {
            Some(entry) => {
                entry.text = text;
                entry.state = EntryState::Complete;
            }
            None => {
                self.entries
                    .push(ChatEntry::complete(message_id, Role::Assistant, text));
            }
        }
    }

    /// Returns true if a finalized assistant entry with this id exists.
    /// Used to tell redelivered completions apart from orphan ones.
    #[must_use]
    pub fn has_final_assistant_entry(&self, message_id: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.id == message_id && e.role == Role::Assistant && e.is_final())
    }

    /// Replaces the cached session metadata wholesale. Never touches
    /// chat entries.
    pub fn apply_session_summary(&mut self, summary: SessionSummary) {
        debug!(session_id = %summary.id, "Session metadata replaced");
        self.summary = Some(summary);
    }

    /// Records a transient error notification. Never mutates chat history.
    pub fn apply_error(&mut self, code: impl Into<String>, message: impl Into<String>) {
        self.notices.push_back(Notice {
            code: code.into(),
            message: message.into(),
        });
    }

    /// Drains the oldest pending notification, if any.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notices.pop_front()
    }

    /// The ordered chat entries.
    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    /// The cached server-authoritative metadata, if any has arrived.
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    /// The session this view mirrors.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    fn entry_mut(&mut self, id: &str) -> Option<&mut ChatEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }
}
