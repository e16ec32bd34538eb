//! Agent Hub CLI - terminal client for hub sessions
//!
//! Session directory commands plus an interactive `attach` loop that
//! streams assistant output for one session.
//!
//! # Usage
//!
//! ```text
//! hub sessions list
//! hub sessions new --name "Scratch" --profile default
//! hub sessions show <session-id>
//! hub sessions delete <session-id>
//! hub profiles
//! hub attach <session-id>
//! ```
//!
//! Endpoints and the optional shared secret come from `AGENT_HUB_*`
//! environment variables, resolved once at startup.

use std::io::Write;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use hub_client::{
    CloseReason, ConnectionEvent, HubConfig, MessageAssembler, SessionConnection,
    SessionDirectory, SessionViewState,
};
use hub_core::{ProviderKind, SessionId};
use hub_protocol::{Command, CreateSessionRequest, Event, LlmConfigPatch};

// ============================================================================
// CLI Arguments
// ============================================================================

/// Interact with an Agent Hub server.
#[derive(Parser, Debug)]
#[command(name = "hub")]
#[command(about = "Interact with an Agent Hub server")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Manage sessions
    Sessions {
        #[command(subcommand)]
        action: SessionsCmd,
    },
    /// List prompt-profile bundles available on the hub
    Profiles,
    /// Attach to a running session and chat interactively
    Attach {
        /// Session identifier
        session_id: String,
    },
}

#[derive(Subcommand, Debug)]
enum SessionsCmd {
    /// List sessions on the server
    List,
    /// Create a new session
    New {
        /// Human friendly name
        #[arg(short, long)]
        name: String,
        /// Profile id to load
        #[arg(short, long)]
        profile: String,
        /// LLM provider override
        #[arg(long)]
        provider: Option<ProviderKind>,
        /// LLM model override
        #[arg(long)]
        model: Option<String>,
    },
    /// Show a session with its message history
    Show {
        /// Session identifier
        session_id: String,
    },
    /// Delete a session
    Delete {
        /// Session identifier
        session_id: String,
    },
}

// ============================================================================
// Directory Commands
// ============================================================================

async fn list_sessions(directory: &SessionDirectory) -> Result<()> {
    let sessions = directory.list_sessions().await?;
    if sessions.is_empty() {
        println!("No sessions found.");
        return Ok(());
    }
    for session in sessions {
        println!(
            "{} | {} | profile={} | provider={}",
            session.id, session.name, session.profile, session.llm_config.provider
        );
    }
    Ok(())
}

async fn create_session(
    directory: &SessionDirectory,
    name: String,
    profile: String,
    provider: Option<ProviderKind>,
    model: Option<String>,
) -> Result<()> {
    let llm_config = if provider.is_some() || model.is_some() {
        Some(LlmConfigPatch {
            provider,
            model,
            temperature: None,
        })
    } else {
        None
    };
    let request = CreateSessionRequest {
        llm_config,
        ..CreateSessionRequest::new(name, profile)
    };

    let session = directory.create_session(&request).await?;
    println!(
        "Session created: {} ({})",
        session.summary.id, session.summary.name
    );
    Ok(())
}

async fn show_session(directory: &SessionDirectory, session_id: SessionId) -> Result<()> {
    let detail = directory.fetch_session(&session_id).await?;
    println!(
        "{} | {} | profile={} | provider={} | model={}",
        detail.summary.id,
        detail.summary.name,
        detail.summary.profile,
        detail.summary.llm_config.provider,
        detail.summary.llm_config.model
    );
    for message in &detail.messages {
        println!("[{}] {}", message.role, message.content);
    }
    Ok(())
}

async fn delete_session(directory: &SessionDirectory, session_id: SessionId) -> Result<()> {
    let deleted = directory.delete_session(&session_id).await?;
    println!("Session deleted: {deleted}");
    Ok(())
}

async fn list_profiles(directory: &SessionDirectory) -> Result<()> {
    let profiles = directory.list_profiles().await?;
    if profiles.is_empty() {
        println!("No profiles found.");
        return Ok(());
    }
    for profile in profiles {
        let modes = if profile.modes.is_empty() {
            String::new()
        } else {
            format!(" | modes={}", profile.modes.join(","))
        };
        println!("{} | {}{}", profile.id, profile.name, modes);
    }
    Ok(())
}

// ============================================================================
// Attach Loop
// ============================================================================

/// Renders one server event to the terminal, streaming chunks in place.
/// Server errors are rendered from the view's notice queue instead, so
/// they are not printed here.
fn render_event(event: &Event) {
    match event {
        Event::SessionJoined { session_id } => {
            println!("Session acknowledged: {session_id}");
        }
        Event::AssistantMessageStart { message_id, .. } => {
            println!();
            println!("[assistant:{message_id}]");
        }
        Event::AssistantMessageChunk { text_chunk, .. } => {
            print!("{text_chunk}");
            let _ = std::io::stdout().flush();
        }
        Event::AssistantMessageComplete { .. } => {
            println!();
        }
        Event::SessionUpdated { session } => {
            println!();
            println!("Session updated: {} ({})", session.id, session.name);
        }
        Event::Error { .. } => {}
    }
}

fn print_history(view: &SessionViewState) {
    for entry in view.entries() {
        println!("[{}] {}", entry.role, entry.text);
    }
}

async fn attach(config: HubConfig, session_id: SessionId) -> Result<()> {
    let directory = SessionDirectory::new(config.clone());
    let mut view = SessionViewState::new(session_id.clone());

    // Seed prior history so /history shows the whole conversation
    match directory.fetch_session(&session_id).await {
        Ok(detail) => view.seed_from_detail(&detail),
        Err(e) => warn!(error = %e, "Could not fetch session history, attaching anyway"),
    }

    println!("Connecting to {}...", config.ws_url("/sessions"));
    let (conn, mut events) = SessionConnection::attach(&config, session_id.clone())
        .await
        .context("failed to attach to session")?;
    let mut assembler = MessageAssembler::new();

    println!("Joining session {session_id}. Type /exit to leave, /history to reprint.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            maybe_event = events.recv() => {
                match maybe_event {
                    None => break,
                    Some(ConnectionEvent::Protocol(event)) => {
                        render_event(&event);
                        assembler.apply(event, &mut view);
                        while let Some(notice) = view.take_notice() {
                            eprintln!("Error ({}): {}", notice.code, notice.message);
                        }
                    }
                    Some(ConnectionEvent::DecodeError(error)) => {
                        eprintln!("Failed to parse message: {error}");
                    }
                    Some(ConnectionEvent::Closed(reason)) => {
                        match reason {
                            CloseReason::Local => println!("Connection closed."),
                            CloseReason::Remote => println!("Connection closed by server."),
                            CloseReason::Error(e) => eprintln!("Connection lost: {e}"),
                        }
                        break;
                    }
                }
            }
            maybe_line = lines.next_line() => {
                match maybe_line? {
                    None => {
                        // stdin closed (EOF)
                        conn.close();
                    }
                    Some(line) => {
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }
                        if line == "/exit" {
                            conn.close();
                            continue;
                        }
                        if line == "/history" {
                            print_history(&view);
                            continue;
                        }
                        if !conn.is_joined() {
                            eprintln!("Not joined yet; wait for the session acknowledgement.");
                            continue;
                        }
                        // Optimistic echo first, then fire-and-forget send
                        view.add_user_entry(line);
                        if let Err(e) = conn.send(Command::user_message(session_id.clone(), line)) {
                            eprintln!("Failed to send: {e}");
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = HubConfig::from_env();
    debug!(host = %config.host, http_port = config.http_port, ws_port = config.ws_port, "Resolved hub config");

    let directory = SessionDirectory::new(config.clone());

    match args.command {
        Cmd::Sessions { action } => match action {
            SessionsCmd::List => list_sessions(&directory).await,
            SessionsCmd::New {
                name,
                profile,
                provider,
                model,
            } => create_session(&directory, name, profile, provider, model).await,
            SessionsCmd::Show { session_id } => {
                show_session(&directory, SessionId::new(session_id)).await
            }
            SessionsCmd::Delete { session_id } => {
                delete_session(&directory, SessionId::new(session_id)).await
            }
        },
        Cmd::Profiles => list_profiles(&directory).await,
        Cmd::Attach { session_id } => attach(config, SessionId::new(session_id)).await,
    }
}
