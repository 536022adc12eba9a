//! Message and wire protocol definitions
//!
//! JSON-based bidirectional event protocol using Serde's adjacently tagged
//! enums: every frame is `{"event": <name>, "data": <payload>}`, matching
//! the relay's named-event contract.

use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::types::{unix_millis, MessageId};

/// Maximum chat message body length, enforced at the local input boundary.
///
/// Remote peers violating the cap are displayed verbatim rather than
/// truncated.
pub const MAX_MESSAGE_LEN: usize = 1000;

/// Sender name attached to locally generated system messages.
pub const SYSTEM_SENDER: &str = "System";

/// Chat message as it crosses the wire.
///
/// Timestamps are client-local epoch milliseconds; ids are minted by the
/// sending client and trusted verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub sender: String,
    pub text: String,
    pub ts: u64,
}

/// Client → Relay event
///
/// All events emitted by this client. Event names match the relay protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Announce the chosen display name
    Join(String),
    /// Broadcast a chat message
    #[serde(rename = "chat-message")]
    Chat(ChatMessage),
    /// Local participant started typing
    Typing(String),
    /// Local participant went quiet
    StopTyping(String),
}

/// Relay → Client event
///
/// All events consumed from the relay. Event names match the relay protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Another participant joined the chat
    ParticipantJoined(String),
    /// A chat message from another participant
    #[serde(rename = "chat-message")]
    Chat(ChatMessage),
    /// A remote participant started typing
    Typing(String),
    /// A remote participant stopped typing
    StopTyping(String),
}

/// Message kind for differentiated rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Sent by a participant (local or remote)
    User,
    /// Generated locally (welcome, join notices, connection failures)
    System,
}

/// A message in the conversation log.
///
/// User and system messages share one sequence; the kind tag is local only
/// and never crosses the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub sender: String,
    pub text: String,
    pub ts: u64,
    pub kind: MessageKind,
}

impl Message {
    /// Build a user message from raw input.
    ///
    /// Trims surrounding whitespace and rejects empty or oversized input.
    /// This is the input boundary: no network call happens on rejection.
    pub fn compose(sender: &str, raw: &str) -> Result<Self, ClientError> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(ClientError::EmptyInput);
        }
        if text.chars().count() > MAX_MESSAGE_LEN {
            return Err(ClientError::MessageTooLong);
        }
        Ok(Self {
            id: MessageId::new(),
            sender: sender.to_string(),
            text: text.to_string(),
            ts: unix_millis(),
            kind: MessageKind::User,
        })
    }

    /// Build a locally generated system message
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            sender: SYSTEM_SENDER.to_string(),
            text: text.into(),
            ts: unix_millis(),
            kind: MessageKind::System,
        }
    }

    /// The wire payload for this message
    pub fn to_wire(&self) -> ChatMessage {
        ChatMessage {
            id: self.id,
            sender: self.sender.clone(),
            text: self.text.clone(),
            ts: self.ts,
        }
    }
}

/// Inbound chat messages are displayed verbatim as user messages
impl From<ChatMessage> for Message {
    fn from(wire: ChatMessage) -> Self {
        Self {
            id: wire.id,
            sender: wire.sender,
            text: wire.text,
            ts: wire.ts,
            kind: MessageKind::User,
        }
    }
}
