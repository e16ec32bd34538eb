//! Hub Protocol - Wire protocol for Agent Hub communication
//!
//! This crate provides the message vocabulary exchanged with the hub:
//! the commands and events carried over the per-session WebSocket, and
//! the request/response payloads of the HTTP session directory.
//!
//! These are pure data definitions; all behavior lives in hub-client.

pub mod http;
pub mod message;

pub use http::{
    CreateSessionRequest, CreateSessionResponse, DeleteSessionResponse, LlmConfigPatch,
    ProfileListResponse, ProfileSummary, SessionDetailResponse, SessionListResponse,
};
pub use message::{Command, Event};
