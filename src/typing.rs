//! Typing signal debouncing
//!
//! Converts raw local input changes into rate-limited stop-typing signals
//! using a single-shot timer. There is at most one pending timer at any
//! time; each arming invalidates the previous one.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::client::ClientCommand;

/// Quiet interval after the last keystroke before stop-typing is sent
pub const TYPING_IDLE: Duration = Duration::from_millis(1000);

#[derive(Debug)]
struct PendingTimer {
    epoch: u64,
    handle: JoinHandle<()>,
}

/// Single-shot debounce timer for the local typing indicator.
///
/// `rearm` aborts the previous sleep task and records a fresh epoch; an
/// expiry is honored only if its epoch is still current, so a timer that
/// fires concurrently with a re-arm can never produce a second stop signal.
/// The timer task posts back into the client's command queue, keeping all
/// state mutation on the owning task.
#[derive(Debug)]
pub struct TypingDebouncer {
    idle: Duration,
    epoch: u64,
    timer: Option<PendingTimer>,
}

impl TypingDebouncer {
    pub fn new(idle: Duration) -> Self {
        Self {
            idle,
            epoch: 0,
            timer: None,
        }
    }

    /// Whether a timer is currently pending
    pub fn is_armed(&self) -> bool {
        self.timer.is_some()
    }

    /// Arm the timer, replacing any pending one.
    ///
    /// After the quiet interval the spawned task posts
    /// `ClientCommand::TypingExpired` carrying this arming's epoch.
    pub fn rearm(&mut self, cmd_tx: mpsc::Sender<ClientCommand>) {
        if let Some(prev) = self.timer.take() {
            prev.handle.abort();
        }
        self.epoch += 1;
        let epoch = self.epoch;
        let idle = self.idle;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(idle).await;
            let _ = cmd_tx.send(ClientCommand::TypingExpired { epoch }).await;
        });
        self.timer = Some(PendingTimer { epoch, handle });
    }

    /// Handle a timer expiry.
    ///
    /// Returns true exactly once per arming: only when the epoch matches
    /// the currently pending timer. Stale expiries (from an aborted timer
    /// whose message was already queued) are ignored.
    pub fn expire(&mut self, epoch: u64) -> bool {
        match &self.timer {
            Some(pending) if pending.epoch == epoch => {
                self.timer = None;
                true
            }
            _ => {
                debug!(epoch, "stale typing timer ignored");
                false
            }
        }
    }

    /// Cancel the pending timer, if any.
    ///
    /// Returns true if a timer was pending (i.e. typing was signaled and
    /// no stop has gone out yet).
    pub fn cancel(&mut self) -> bool {
        match self.timer.take() {
            Some(pending) => {
                pending.handle.abort();
                true
            }
            None => false,
        }
    }
}
