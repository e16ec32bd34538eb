//! Chat entries rendered by front ends.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a chat entry or persisted session message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// Delivery state of a chat entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Optimistic local echo, not yet acknowledged by the server.
    ///
    /// The protocol carries no correlation data, so a pending entry is
    /// never reconciled against a server-side failure; it stays pending.
    Pending,
    /// Assistant entry whose chunk stream has started but not completed.
    Streaming,
    /// Finalized entry; no further mutation expected.
    Complete,
}

/// A single rendered line of conversation.
///
/// User entries are created locally the moment a message is sent;
/// assistant entries are created and grown only by the message assembler.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatEntry {
    pub id: String,
    pub role: Role,
    pub text: String,
    pub state: EntryState,
}

impl ChatEntry {
    /// Creates an optimistic user echo.
    pub fn user(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::User,
            text: text.into(),
            state: EntryState::Pending,
        }
    }

    /// Creates a streaming assistant entry (empty until chunks arrive).
    pub fn assistant(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::Assistant,
            text: String::new(),
            state: EntryState::Streaming,
        }
    }

    /// Creates an already-complete entry, e.g. from persisted history.
    pub fn complete(id: impl Into<String>, role: Role, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            text: text.into(),
            state: EntryState::Complete,
        }
    }

    /// Returns true once the entry will no longer change.
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.state == EntryState::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
        let role: Role = serde_json::from_str("\"system\"").unwrap();
        assert_eq!(role, Role::System);
    }

    #[test]
    fn test_user_entry_starts_pending() {
        let entry = ChatEntry::user("local-1", "hi");
        assert_eq!(entry.role, Role::User);
        assert_eq!(entry.state, EntryState::Pending);
        assert!(!entry.is_final());
    }

    #[test]
    fn test_assistant_entry_starts_empty_and_streaming() {
        let entry = ChatEntry::assistant("m1");
        assert_eq!(entry.text, "");
        assert_eq!(entry.state, EntryState::Streaming);
    }

    #[test]
    fn test_complete_entry_is_final() {
        let entry = ChatEntry::complete("m1", Role::Assistant, "done");
        assert!(entry.is_final());
    }
}
