//! Realtime WebSocket Chat Client Library
//!
//! A chat client core built with tokio-tungstenite using the Actor pattern
//! for state management. It owns the connection lifecycle, reconnection,
//! event-driven state transitions, and outbound typing-signal debouncing;
//! rendering is left to the embedding front end.
//!
//! # Features
//! - WebSocket connection with capped automatic reconnection
//! - Join lifecycle (display name submitted once per session)
//! - Real-time chat messaging with optimistic local echo
//! - Typing indicators with debounced stop signals
//! - Online-participant counting and join notices
//! - Observable UI state snapshots over a watch channel
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `ChatClient` is the central actor owning all session state
//! - The channel task translates socket I/O into typed `ClientCommand`s
//! - Debounce timers post expiries back into the same command queue
//! - No locks needed - all state access goes through message passing
//!
//! # Example
//! ```ignore
//! use chat_client::{ChannelConfig, ChatClient};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (client, mut ui) = ChatClient::start(ChannelConfig::new("ws://127.0.0.1:8080"));
//!
//!     // wait until connected, then join and chat
//!     while ui.changed().await.is_ok() {
//!         let state = ui.borrow_and_update().clone();
//!         if state.status == chat_client::ConnectionStatus::Connected && !state.joined {
//!             client.submit_name("Ann").await.unwrap();
//!             client.send_message("hello everyone").await.unwrap();
//!         }
//!     }
//! }
//! ```

pub mod channel;
pub mod client;
pub mod conversation;
pub mod error;
pub mod message;
pub mod presence;
pub mod session;
pub mod typing;
pub mod types;

// Re-export main types for convenience
pub use channel::{ChannelConfig, ChannelHandle};
pub use client::{ChatClient, ChatClientHandle, ClientCommand, UiState};
pub use conversation::ConversationLog;
pub use error::{ClientError, SendError};
pub use message::{ChatMessage, ClientEvent, Message, MessageKind, ServerEvent};
pub use presence::Presence;
pub use session::{ConnectionStatus, Session};
pub use typing::TypingDebouncer;
pub use types::MessageId;
