//! Hub Client - Session streaming client for the Agent Hub
//!
//! This library owns the connection logic that every front end shares
//! instead of reimplementing:
//!
//! 1. **Connection** (`connection`): one persistent WebSocket bound to one
//!    session, with a strict join handshake and sequential event delivery.
//! 2. **Assembler** (`assembler`): folds the chunk stream into complete,
//!    ordered assistant messages.
//! 3. **View** (`view`): the client-local mirror of a session's chat
//!    history and metadata that front ends render.
//! 4. **Directory** (`directory`): the HTTP session directory used to
//!    list/create sessions and seed the view before attaching.
//!
//! All code follows the panic-free policy: no `.unwrap()`, `.expect()`,
//! `panic!()`, `unreachable!()`, or `todo!()` outside tests.

pub mod assembler;
pub mod config;
pub mod connection;
pub mod directory;
pub mod error;
pub mod view;

// Re-export commonly used types
pub use assembler::MessageAssembler;
pub use config::HubConfig;
pub use connection::{CloseReason, ConnectionEvent, ConnectionState, SessionConnection};
pub use directory::SessionDirectory;
pub use error::{HubClientError, Result};
pub use view::{Notice, SessionViewState};
