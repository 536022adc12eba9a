//! Error types for the chat client
//!
//! Defines application-level errors and internal channel send errors.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

use crate::message::MAX_MESSAGE_LEN;
use crate::session::MAX_NAME_LEN;

/// Application-level errors
///
/// Covers both transport errors (connection lost, retries exhausted) and
/// local rejections (input gated before any network call is made).
#[derive(Debug, Error)]
pub enum ClientError {
    /// WebSocket protocol error (connection ends)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// All configured reconnection attempts failed (terminal)
    #[error("connection attempts exhausted after {attempts} tries")]
    RetriesExhausted { attempts: u32 },

    /// Outbound action attempted while not connected
    #[error("not connected to the relay")]
    NotConnected,

    /// Chat/typing attempted before submitting a display name
    #[error("display name not submitted")]
    NotJoined,

    /// Display name already submitted this session
    #[error("already joined")]
    AlreadyJoined,

    /// Blank name or message after trimming
    #[error("input is empty")]
    EmptyInput,

    /// Display name over the input cap
    #[error("display name exceeds {} characters", MAX_NAME_LEN)]
    NameTooLong,

    /// Message body over the input cap
    #[error("message exceeds {} characters", MAX_MESSAGE_LEN)]
    MessageTooLong,
}

/// Message send errors
///
/// Occurs when driving the client through a handle after the actor stopped.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,
}
