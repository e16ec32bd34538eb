//! Hub Core - Shared domain types for the Agent Hub client
//!
//! This crate provides the types shared between the wire protocol
//! (hub-protocol) and the connection/view layer (hub-client).
//!
//! All code follows the panic-free policy: no `.unwrap()`, `.expect()`,
//! `panic!()`, `unreachable!()`, `todo!()`, or direct indexing `[i]`.

pub mod chat;
pub mod session;

// Re-exports for convenience
pub use chat::{ChatEntry, EntryState, Role};
pub use session::{
    LlmConfig, ProviderKind, SessionDetail, SessionId, SessionMessage, SessionSummary,
};
