//! Realtime WebSocket Chat Client - Entry Point
//!
//! A minimal line-oriented front: the first line joins the chat, every
//! later line sends a message. Incoming messages, status changes, and the
//! typing summary are printed as they arrive.

use std::env;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use chat_client::{ChannelConfig, ChatClient, ConnectionStatus, MessageKind, UiState};

/// Default relay endpoint
const DEFAULT_URL: &str = "ws://127.0.0.1:8080";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=chat_client=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chat_client=info")),
        )
        .init();

    // Get relay URL from command line or use default
    let url = env::args().nth(1).unwrap_or_else(|| DEFAULT_URL.to_string());
    println!("Connecting to {url} ...");

    let (client, ui) = ChatClient::start(ChannelConfig::new(url));

    tokio::spawn(render(ui.clone()));

    println!("Enter a display name to join the chat:");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        if ui.borrow().joined {
            client.send_message(&line).await?;
        } else {
            client.submit_name(&line).await?;
        }
    }

    Ok(())
}

/// Print state changes: new messages, status transitions, typing summary
async fn render(mut ui: watch::Receiver<UiState>) {
    let mut printed = 0usize;
    let mut status = ConnectionStatus::Disconnected;
    let mut typing: Option<String> = None;

    while ui.changed().await.is_ok() {
        let state = ui.borrow_and_update().clone();

        if state.status != status {
            status = state.status;
            match status {
                ConnectionStatus::Connected => println!("* connected ({} online)", state.online),
                other => println!("* {other}"),
            }
        }

        for message in &state.messages[printed..] {
            match message.kind {
                MessageKind::System => println!("-- {}", message.text),
                MessageKind::User => println!("<{}> {}", message.sender, message.text),
            }
        }
        printed = state.messages.len();

        let summary = state.typing_summary();
        if summary != typing {
            if let Some(who) = &summary {
                println!("({who} typing...)");
            }
            typing = summary;
        }
    }
}
