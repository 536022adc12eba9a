//! Session state
//!
//! Holds the local identity, connection status, and join lifecycle.
//! Status transitions come only from channel lifecycle events; `joined`
//! flips only on an explicit name submission while connected.

use crate::error::ClientError;

/// Maximum display name length, enforced at the local input boundary.
pub const MAX_NAME_LEN: usize = 30;

/// Connection status as reported by the channel adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// No channel established
    #[default]
    Disconnected,
    /// Connect or reconnect attempt in flight
    Connecting,
    /// Channel open, sends permitted
    Connected,
    /// Reconnection attempts exhausted (terminal)
    Error,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// Local session state
///
/// The display name is set exactly once per session. A connection drop does
/// not reset `joined`, so the UI can show a reconnecting chat view instead
/// of re-prompting for a name; outbound actions stay gated on status.
#[derive(Debug, Default)]
pub struct Session {
    name: Option<String>,
    status: ConnectionStatus,
    joined: bool,
}

impl Session {
    /// Create a new session (disconnected, not joined)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn joined(&self) -> bool {
        self.joined
    }

    /// The chosen display name, if submitted
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Display name, or "Unknown" before join
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }

    /// Apply a channel lifecycle transition
    pub fn set_status(&mut self, status: ConnectionStatus) {
        self.status = status;
    }

    /// Whether join/system signals may go out
    pub fn can_send(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    /// Whether chat/typing signals may go out
    pub fn can_chat(&self) -> bool {
        self.can_send() && self.joined
    }

    /// Check the chat gate, reporting which condition failed
    pub fn ensure_can_chat(&self) -> Result<(), ClientError> {
        if !self.can_send() {
            return Err(ClientError::NotConnected);
        }
        if !self.joined {
            return Err(ClientError::NotJoined);
        }
        Ok(())
    }

    /// Submit the display name and enter the chat.
    ///
    /// Valid only while connected and not yet joined. Trims the name and
    /// rejects empty or oversized input before any network call. Returns
    /// the accepted name.
    pub fn join(&mut self, raw: &str) -> Result<String, ClientError> {
        if !self.can_send() {
            return Err(ClientError::NotConnected);
        }
        if self.joined {
            return Err(ClientError::AlreadyJoined);
        }
        let name = raw.trim();
        if name.is_empty() {
            return Err(ClientError::EmptyInput);
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(ClientError::NameTooLong);
        }
        self.name = Some(name.to_string());
        self.joined = true;
        Ok(name.to_string())
    }
}
