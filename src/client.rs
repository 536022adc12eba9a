//! ChatClient actor implementation
//!
//! The state-owning actor for the chat session. All mutation of the
//! session, presence, conversation log, and debounce timer happens here,
//! serially, in reaction to typed commands: channel lifecycle and relay
//! events posted by the channel task, user actions posted through the
//! [`ChatClientHandle`], and debounce timer expiries.

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::channel::{self, ChannelConfig, ChannelHandle};
use crate::conversation::ConversationLog;
use crate::error::SendError;
use crate::message::{ChatMessage, ClientEvent, Message, ServerEvent};
use crate::presence::{summarize, Presence};
use crate::session::{ConnectionStatus, Session};
use crate::typing::{TypingDebouncer, TYPING_IDLE};

/// Buffer size for the actor's command queue
pub const COMMAND_BUFFER_SIZE: usize = 256;

/// Commands processed by the [`ChatClient`] actor.
///
/// The typed union of everything that can mutate client state: channel
/// lifecycle notices, inbound relay events, local user actions, and the
/// debounce timer.
#[derive(Debug)]
pub enum ClientCommand {
    /// Connect or reconnect attempt started
    Connecting,
    /// Channel established
    Opened,
    /// Channel dropped
    Closed,
    /// Reconnection attempts exhausted (terminal)
    Errored { reason: String },
    /// A participant joined the chat
    ParticipantJoined { name: String },
    /// A chat message arrived from the relay
    Chat { message: ChatMessage },
    /// A remote participant started typing
    Typing { name: String },
    /// A remote participant stopped typing
    StopTyping { name: String },
    /// User submitted a display name
    SubmitName { name: String },
    /// User changed the message input text
    InputChanged { text: String },
    /// User submitted a message
    SendMessage { text: String },
    /// The typing debounce timer elapsed
    TypingExpired { epoch: u64 },
}

impl From<ServerEvent> for ClientCommand {
    fn from(event: ServerEvent) -> Self {
        match event {
            ServerEvent::ParticipantJoined(name) => Self::ParticipantJoined { name },
            ServerEvent::Chat(message) => Self::Chat { message },
            ServerEvent::Typing(name) => Self::Typing { name },
            ServerEvent::StopTyping(name) => Self::StopTyping { name },
        }
    }
}

/// Snapshot of the observable UI state.
///
/// Published on a watch channel after every processed command; rendering
/// layers read it and never touch the actor's state directly.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub status: ConnectionStatus,
    pub joined: bool,
    pub name: Option<String>,
    pub online: u32,
    pub typers: Vec<String>,
    pub messages: Vec<Message>,
}

impl UiState {
    /// Display summary of who is typing
    pub fn typing_summary(&self) -> Option<String> {
        summarize(&self.typers)
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            joined: false,
            name: None,
            online: 1,
            typers: Vec::new(),
            messages: Vec::new(),
        }
    }
}

/// Cloneable front for driving the client from a UI or input loop
#[derive(Debug, Clone)]
pub struct ChatClientHandle {
    cmd_tx: mpsc::Sender<ClientCommand>,
}

impl ChatClientHandle {
    /// Submit the display name and join the chat
    pub async fn submit_name(&self, name: &str) -> Result<(), SendError> {
        self.command(ClientCommand::SubmitName {
            name: name.to_string(),
        })
        .await
    }

    /// Report a change of the message input text
    pub async fn input_changed(&self, text: &str) -> Result<(), SendError> {
        self.command(ClientCommand::InputChanged {
            text: text.to_string(),
        })
        .await
    }

    /// Send a chat message
    pub async fn send_message(&self, text: &str) -> Result<(), SendError> {
        self.command(ClientCommand::SendMessage {
            text: text.to_string(),
        })
        .await
    }

    async fn command(&self, cmd: ClientCommand) -> Result<(), SendError> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| SendError::ChannelClosed)
    }
}

/// The chat client actor
///
/// Owns all session state and processes commands from its single queue.
pub struct ChatClient {
    session: Session,
    presence: Presence,
    log: ConversationLog,
    debouncer: TypingDebouncer,
    /// Outbound side of the channel adapter (constructor-injected)
    channel: ChannelHandle,
    /// Command queue; the timer task posts expiries back through this
    cmd_tx: mpsc::Sender<ClientCommand>,
    receiver: mpsc::Receiver<ClientCommand>,
    ui: watch::Sender<UiState>,
}

impl ChatClient {
    /// Connect to the relay and start the client actor.
    ///
    /// Returns the handle for user actions and the watch receiver carrying
    /// [`UiState`] snapshots.
    pub fn start(config: ChannelConfig) -> (ChatClientHandle, watch::Receiver<UiState>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER_SIZE);
        let channel = channel::spawn(config, cmd_tx.clone());
        Self::start_with_channel(channel, cmd_tx, cmd_rx)
    }

    /// Start the actor on an existing channel handle.
    ///
    /// This is the seam for tests: pass a handle backed by a plain mpsc
    /// receiver to observe outbound events without a socket.
    pub fn start_with_channel(
        channel: ChannelHandle,
        cmd_tx: mpsc::Sender<ClientCommand>,
        cmd_rx: mpsc::Receiver<ClientCommand>,
    ) -> (ChatClientHandle, watch::Receiver<UiState>) {
        let (ui_tx, ui_rx) = watch::channel(UiState::default());
        let client = Self {
            session: Session::new(),
            presence: Presence::new(),
            log: ConversationLog::new(),
            debouncer: TypingDebouncer::new(TYPING_IDLE),
            channel,
            cmd_tx: cmd_tx.clone(),
            receiver: cmd_rx,
            ui: ui_tx,
        };
        tokio::spawn(client.run());
        (ChatClientHandle { cmd_tx }, ui_rx)
    }

    /// Run the client event loop
    ///
    /// Continuously receives and processes commands until all senders are
    /// dropped, publishing a state snapshot after each one.
    pub async fn run(mut self) {
        info!("chat client started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
            self.ui.send_replace(self.snapshot());
        }

        info!("chat client shutting down");
    }

    fn snapshot(&self) -> UiState {
        UiState {
            status: self.session.status(),
            joined: self.session.joined(),
            name: self.session.name().map(str::to_string),
            online: self.presence.online(),
            typers: self.presence.typers().to_vec(),
            messages: self.log.entries().to_vec(),
        }
    }

    /// Process a single command
    fn handle_command(&mut self, cmd: ClientCommand) {
        match cmd {
            ClientCommand::Connecting => {
                self.session.set_status(ConnectionStatus::Connecting);
            }
            ClientCommand::Opened => self.handle_opened(),
            ClientCommand::Closed => self.handle_closed(),
            ClientCommand::Errored { reason } => self.handle_errored(reason),
            ClientCommand::ParticipantJoined { name } => self.handle_participant_joined(name),
            ClientCommand::Chat { message } => self.handle_chat(message),
            ClientCommand::Typing { name } => {
                self.presence.start_typing(&name);
            }
            ClientCommand::StopTyping { name } => {
                self.presence.stop_typing(&name);
            }
            ClientCommand::SubmitName { name } => self.handle_submit_name(name),
            ClientCommand::InputChanged { text } => self.handle_input_changed(text),
            ClientCommand::SendMessage { text } => self.handle_send_message(text),
            ClientCommand::TypingExpired { epoch } => self.handle_typing_expired(epoch),
        }
    }

    fn handle_opened(&mut self) {
        info!("connected to relay");
        self.session.set_status(ConnectionStatus::Connected);
    }

    fn handle_closed(&mut self) {
        // joined survives the drop; sends stay gated until reconnected
        info!("disconnected from relay");
        self.session.set_status(ConnectionStatus::Disconnected);
    }

    fn handle_errored(&mut self, reason: String) {
        warn!("connection gave up: {reason}");
        self.session.set_status(ConnectionStatus::Error);
        self.log
            .append_system("Connection failed. Please check your connection.");
    }

    fn handle_participant_joined(&mut self, name: String) {
        self.presence.participant_joined();
        self.log.append_system(format!("{name} joined the chat"));
        info!(online = self.presence.online(), "'{name}' joined");
    }

    fn handle_chat(&mut self, message: ChatMessage) {
        self.log.append(message.into());
    }

    fn handle_submit_name(&mut self, raw: String) {
        let name = match self.session.join(&raw) {
            Ok(name) => name,
            Err(e) => {
                warn!("join rejected: {e}");
                return;
            }
        };

        // optimistic: announce and welcome without waiting for the relay
        self.channel.emit(ClientEvent::Join(name.clone()));
        self.log
            .append_system(format!("Welcome to the chat, {name}! 👋"));
        info!("joined as '{name}'");
    }

    fn handle_input_changed(&mut self, text: String) {
        if text.is_empty() {
            // going quiet: flush the pending stop signal instead of letting
            // the timer fire late
            if self.debouncer.cancel() {
                self.emit_stop_typing();
            }
            return;
        }

        if let Err(e) = self.session.ensure_can_chat() {
            debug!("typing signal suppressed: {e}");
            return;
        }

        let name = self.session.display_name().to_string();
        self.channel.emit(ClientEvent::Typing(name));
        self.debouncer.rearm(self.cmd_tx.clone());
    }

    fn handle_send_message(&mut self, raw: String) {
        if let Err(e) = self.session.ensure_can_chat() {
            warn!("send rejected: {e}");
            return;
        }

        let message = match Message::compose(self.session.display_name(), &raw) {
            Ok(message) => message,
            Err(e) => {
                debug!("message rejected: {e}");
                return;
            }
        };

        // optimistic local echo, then the identical payload to the relay
        self.channel.emit(ClientEvent::Chat(message.to_wire()));
        self.log.append(message);

        if self.debouncer.cancel() {
            self.emit_stop_typing();
        }
    }

    fn handle_typing_expired(&mut self, epoch: u64) {
        if self.debouncer.expire(epoch) {
            self.emit_stop_typing();
        }
    }

    fn emit_stop_typing(&mut self) {
        if self.session.can_send() {
            let name = self.session.display_name().to_string();
            self.channel.emit(ClientEvent::StopTyping(name));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::time::timeout;

    use crate::message::{MessageKind, SYSTEM_SENDER};
    use crate::types::{unix_millis, MessageId};

    struct Harness {
        cmd_tx: mpsc::Sender<ClientCommand>,
        ui: watch::Receiver<UiState>,
        outbound: mpsc::Receiver<ClientEvent>,
        open: Arc<AtomicBool>,
    }

    impl Harness {
        /// Actor wired to a fake channel instead of a socket
        fn start() -> Self {
            let (outbound_tx, outbound) = mpsc::channel(32);
            let open = Arc::new(AtomicBool::new(false));
            let channel = ChannelHandle::new(outbound_tx, open.clone());
            let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER_SIZE);
            let (_, ui) = ChatClient::start_with_channel(channel, cmd_tx.clone(), cmd_rx);
            Self {
                cmd_tx,
                ui,
                outbound,
                open,
            }
        }

        /// Post a command and wait for the state snapshot that follows it
        async fn drive(&mut self, cmd: ClientCommand) -> UiState {
            self.cmd_tx.send(cmd).await.unwrap();
            self.ui.changed().await.unwrap();
            self.ui.borrow_and_update().clone()
        }

        /// Bring the session to connected (socket open)
        async fn connect(&mut self) -> UiState {
            self.open.store(true, Ordering::SeqCst);
            self.drive(ClientCommand::Opened).await
        }

        /// Bring the session to connected and joined as the given name
        async fn join_as(&mut self, name: &str) -> UiState {
            self.connect().await;
            self.drive(ClientCommand::SubmitName {
                name: name.to_string(),
            })
            .await
        }

        fn wire_message(sender: &str, text: &str) -> ChatMessage {
            ChatMessage {
                id: MessageId::new(),
                sender: sender.to_string(),
                text: text.to_string(),
                ts: unix_millis(),
            }
        }
    }

    #[tokio::test]
    async fn test_lifecycle_commands_drive_status() {
        let mut h = Harness::start();

        let state = h.drive(ClientCommand::Connecting).await;
        assert_eq!(state.status, ConnectionStatus::Connecting);

        let state = h.connect().await;
        assert_eq!(state.status, ConnectionStatus::Connected);

        let state = h.drive(ClientCommand::Closed).await;
        assert_eq!(state.status, ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_errored_sets_status_and_appends_notice() {
        let mut h = Harness::start();

        let state = h
            .drive(ClientCommand::Errored {
                reason: "connection attempts exhausted after 5 tries".to_string(),
            })
            .await;

        assert_eq!(state.status, ConnectionStatus::Error);
        let last = state.messages.last().unwrap();
        assert_eq!(last.kind, MessageKind::System);
        assert!(last.text.starts_with("Connection failed"));
    }

    #[tokio::test]
    async fn test_join_appends_welcome_and_announces() {
        let mut h = Harness::start();
        let state = h.join_as("Ann").await;

        assert!(state.joined);
        assert_eq!(state.name.as_deref(), Some("Ann"));
        // online count unchanged by self-join
        assert_eq!(state.online, 1);

        assert_eq!(state.messages.len(), 1);
        let welcome = &state.messages[0];
        assert_eq!(welcome.kind, MessageKind::System);
        assert_eq!(welcome.sender, SYSTEM_SENDER);
        assert_eq!(welcome.text, "Welcome to the chat, Ann! 👋");

        assert_eq!(
            h.outbound.try_recv().unwrap(),
            ClientEvent::Join("Ann".to_string())
        );
    }

    #[tokio::test]
    async fn test_join_while_disconnected_rejected() {
        let mut h = Harness::start();

        let state = h
            .drive(ClientCommand::SubmitName {
                name: "Ann".to_string(),
            })
            .await;

        assert!(!state.joined);
        assert!(state.messages.is_empty());
        assert!(h.outbound.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_participant_joined_increments_and_notices() {
        let mut h = Harness::start();
        h.join_as("Ann").await;

        let state = h
            .drive(ClientCommand::ParticipantJoined {
                name: "Bob".to_string(),
            })
            .await;

        assert_eq!(state.online, 2);
        let notice = state.messages.last().unwrap();
        assert_eq!(notice.kind, MessageKind::System);
        assert_eq!(notice.text, "Bob joined the chat");
    }

    #[tokio::test]
    async fn test_send_trims_echoes_and_emits() {
        let mut h = Harness::start();
        h.join_as("Ann").await;
        let _ = h.outbound.try_recv(); // join event

        let state = h
            .drive(ClientCommand::SendMessage {
                text: "  hello  ".to_string(),
            })
            .await;

        let echoed = state.messages.last().unwrap();
        assert_eq!(echoed.text, "hello");
        assert_eq!(echoed.sender, "Ann");
        assert_eq!(echoed.kind, MessageKind::User);

        // the emitted payload is the same message
        match h.outbound.try_recv().unwrap() {
            ClientEvent::Chat(wire) => {
                assert_eq!(wire.id, echoed.id);
                assert_eq!(wire.text, "hello");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_while_disconnected_no_emit_no_echo() {
        let mut h = Harness::start();
        h.join_as("Ann").await;
        let _ = h.outbound.try_recv();
        let before = h.drive(ClientCommand::Closed).await.messages.len();

        let state = h
            .drive(ClientCommand::SendMessage {
                text: "hello".to_string(),
            })
            .await;

        assert_eq!(state.messages.len(), before);
        assert!(h.outbound.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_blank_send_is_silently_dropped() {
        let mut h = Harness::start();
        h.join_as("Ann").await;
        let _ = h.outbound.try_recv();
        let before = h.ui.borrow().messages.len();

        let state = h
            .drive(ClientCommand::SendMessage {
                text: "   ".to_string(),
            })
            .await;

        assert_eq!(state.messages.len(), before);
        assert!(h.outbound.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_inbound_chat_appended_verbatim() {
        let mut h = Harness::start();
        h.join_as("Ann").await;

        let wire = Harness::wire_message("Bob", "hi Ann");
        let state = h
            .drive(ClientCommand::Chat {
                message: wire.clone(),
            })
            .await;

        let received = state.messages.last().unwrap();
        assert_eq!(received.id, wire.id);
        assert_eq!(received.text, "hi Ann");
        assert_eq!(received.kind, MessageKind::User);
    }

    #[tokio::test]
    async fn test_remote_typing_set_updates() {
        let mut h = Harness::start();

        h.drive(ClientCommand::Typing {
            name: "Bob".to_string(),
        })
        .await;
        let state = h
            .drive(ClientCommand::Typing {
                name: "Bob".to_string(),
            })
            .await;
        assert_eq!(state.typers, ["Bob"]);

        let state = h
            .drive(ClientCommand::StopTyping {
                name: "Bob".to_string(),
            })
            .await;
        assert!(state.typers.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_one_stop_after_burst() {
        let mut h = Harness::start();
        h.join_as("Ann").await;
        let _ = h.outbound.try_recv();

        // rapid keystrokes: one typing emit per change
        for text in ["h", "he", "hey"] {
            h.drive(ClientCommand::InputChanged {
                text: text.to_string(),
            })
            .await;
        }
        for _ in 0..3 {
            assert_eq!(
                h.outbound.recv().await.unwrap(),
                ClientEvent::Typing("Ann".to_string())
            );
        }

        // quiet interval elapses: exactly one stop-typing
        assert_eq!(
            h.outbound.recv().await.unwrap(),
            ClientEvent::StopTyping("Ann".to_string())
        );
        assert!(timeout(Duration::from_secs(5), h.outbound.recv())
            .await
            .is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_flushes_pending_stop_signal() {
        let mut h = Harness::start();
        h.join_as("Ann").await;
        let _ = h.outbound.try_recv();

        h.drive(ClientCommand::InputChanged {
            text: "hey".to_string(),
        })
        .await;
        assert_eq!(
            h.outbound.recv().await.unwrap(),
            ClientEvent::Typing("Ann".to_string())
        );

        h.drive(ClientCommand::SendMessage {
            text: "hey".to_string(),
        })
        .await;

        assert!(matches!(
            h.outbound.recv().await.unwrap(),
            ClientEvent::Chat(_)
        ));
        assert_eq!(
            h.outbound.recv().await.unwrap(),
            ClientEvent::StopTyping("Ann".to_string())
        );

        // the cancelled timer stays quiet afterwards
        assert!(timeout(Duration::from_secs(5), h.outbound.recv())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_typing_before_join_suppressed() {
        let mut h = Harness::start();
        h.connect().await;

        h.drive(ClientCommand::InputChanged {
            text: "hello".to_string(),
        })
        .await;

        assert!(h.outbound.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_disconnect_preserves_joined_view() {
        let mut h = Harness::start();
        h.join_as("Ann").await;

        let state = h.drive(ClientCommand::Closed).await;

        // reconnecting chat view: still joined, name kept, log intact
        assert!(state.joined);
        assert_eq!(state.name.as_deref(), Some("Ann"));
        assert_eq!(state.messages.len(), 1);
    }
}
