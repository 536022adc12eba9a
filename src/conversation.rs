//! Conversation log
//!
//! Append-only ordered sequence of chat and system messages.

use crate::message::Message;

/// The ordered message sequence.
///
/// Append order is display order: entries are never mutated, removed, or
/// re-sorted by timestamp. Duplicate identifiers are accepted as distinct
/// entries since ids are generated locally or trusted from the relay.
#[derive(Debug, Default)]
pub struct ConversationLog {
    entries: Vec<Message>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message to the end of the sequence
    pub fn append(&mut self, message: Message) {
        self.entries.push(message);
    }

    /// Append a locally generated system message
    pub fn append_system(&mut self, text: impl Into<String>) {
        self.entries.push(Message::system(text));
    }

    /// All messages in arrival order
    pub fn entries(&self) -> &[Message] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recently appended message
    pub fn last(&self) -> Option<&Message> {
        self.entries.last()
    }
}
