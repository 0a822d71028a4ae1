//! Interactive booking chat.
//!
//! Uses `rustyline` for line editing with persistent history. Inbound
//! messages are printed by a background task as they arrive.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, warn};
use uuid::Uuid;

use parkshare_chat::{ChatEvent, ChatSessionManager, EventHandler, SessionState, TungsteniteConnector};
use parkshare_core::config::load_config;
use parkshare_core::utils::get_history_path;
use parkshare_core::BookingId;

use crate::helpers;

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// How long to wait for the chat handshake.
const OPEN_TIMEOUT: Duration = Duration::from_secs(10);

/// How long to let the socket close and pending events print on exit.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Run the chat REPL for one booking.
pub async fn run(booking_id: BookingId) -> Result<()> {
    let config = load_config(None);
    let token = helpers::require_token(&config)?;

    // Best effort: only used to label our own messages.
    let me = match helpers::api_client(&config)?.current_user(&token).await {
        Ok(user) => Some(user.id),
        Err(e) => {
            warn!(error = %e, "could not fetch current user");
            None
        }
    };

    let manager = ChatSessionManager::new(&config.chat, Arc::new(TungsteniteConnector))
        .context("invalid chat configuration")?;
    let (handler, events) = EventHandler::channel();
    let mut handle = manager.open(booking_id, &token, Arc::new(handler))?;

    match tokio::time::timeout(OPEN_TIMEOUT, handle.wait_open()).await {
        Ok(Ok(())) => {}
        Ok(Err(_)) => {
            // The error event carries the reason.
            let printer = tokio::spawn(print_events(events, me));
            manager.close_all();
            let _ = tokio::time::timeout(DRAIN_TIMEOUT, printer).await;
            bail!("could not open chat for booking #{booking_id}");
        }
        Err(_) => {
            manager.close_all();
            bail!("timed out connecting to chat for booking #{booking_id}");
        }
    }

    helpers::print_banner(booking_id);
    let printer = tokio::spawn(print_events(events, me));

    let mut editor = create_editor()?;

    loop {
        let input = match tokio::task::block_in_place(|| editor.readline("> ")) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }

        if is_exit_command(trimmed) {
            break;
        }

        if handle.state() == SessionState::Closed {
            println!("{}", "Chat session has ended.".dimmed());
            break;
        }

        let _ = editor.add_history_entry(&input);

        if let Err(e) = manager.send(booking_id, trimmed) {
            eprintln!("{} {e}", "✗".red());
        }
    }

    save_history(&mut editor);

    manager.close_all();
    drop(manager);
    let _ = tokio::time::timeout(DRAIN_TIMEOUT, printer).await;

    println!("\nGoodbye! 👋");
    Ok(())
}

/// Print chat events until every session holding the handler is gone.
async fn print_events(mut events: UnboundedReceiver<ChatEvent>, me: Option<Uuid>) {
    while let Some(event) = events.recv().await {
        match event {
            ChatEvent::Opened { booking_id } => debug!(booking_id, "chat opened"),
            ChatEvent::Message(message) => println!("{}", helpers::chat_line(&message, me)),
            ChatEvent::Error { error, .. } => {
                eprintln!("{} {error}", "✗ chat error:".red().bold());
            }
            ChatEvent::Closed { .. } => {
                println!("{}", "The other side closed the chat.".dimmed());
            }
        }
    }
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded chat history from {}", history_path.display());
    }

    Ok(editor)
}

fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

fn history_path() -> std::path::PathBuf {
    get_history_path().join("chat_history")
}

fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
