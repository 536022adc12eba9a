//! Presence tracking
//!
//! Maintains the online-participant counter and the set of currently
//! typing participants, driven by inbound relay events.

/// How many typing names are listed verbatim before summarizing
const MAX_NAMED_TYPERS: usize = 2;

/// Presence state for the chat
///
/// The online count starts at 1 (the local participant) and is only ever
/// incremented: the relay has no leave event. The typing set preserves
/// first-insertion order for display and holds no duplicates.
#[derive(Debug)]
pub struct Presence {
    online: u32,
    typers: Vec<String>,
}

impl Presence {
    pub fn new() -> Self {
        Self {
            online: 1,
            typers: Vec::new(),
        }
    }

    pub fn online(&self) -> u32 {
        self.online
    }

    /// Names currently typing, in first-insertion order
    pub fn typers(&self) -> &[String] {
        &self.typers
    }

    /// Record a participant-joined notice
    pub fn participant_joined(&mut self) {
        self.online += 1;
    }

    /// Add a name to the typing set.
    ///
    /// Idempotent: repeated signals from the same name are ignored.
    /// Returns true if the name was newly added.
    pub fn start_typing(&mut self, name: &str) -> bool {
        if self.typers.iter().any(|t| t == name) {
            return false;
        }
        self.typers.push(name.to_string());
        true
    }

    /// Remove a name from the typing set, if present.
    ///
    /// Returns true if the name was removed.
    pub fn stop_typing(&mut self, name: &str) -> bool {
        match self.typers.iter().position(|t| t == name) {
            Some(idx) => {
                self.typers.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Display summary of who is typing
    pub fn summary(&self) -> Option<String> {
        summarize(&self.typers)
    }
}

impl Default for Presence {
    fn default() -> Self {
        Self::new()
    }
}

/// Render the typing display rule: at most the first two names verbatim,
/// with any remainder summarized as a count.
pub fn summarize(names: &[String]) -> Option<String> {
    if names.is_empty() {
        return None;
    }
    let shown = names
        .iter()
        .take(MAX_NAMED_TYPERS)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    if names.len() > MAX_NAMED_TYPERS {
        Some(format!("{shown} and {} others", names.len() - MAX_NAMED_TYPERS))
    } else {
        Some(shown)
    }
}
