//! Channel adapter
//!
//! Wraps the bidirectional WebSocket connection to the relay. A background
//! task owns the socket, drives connect/reconnect with a capped retry
//! policy, and translates socket I/O into typed [`ClientCommand`]s posted
//! to the client actor. The [`ChannelHandle`] is the outbound side: `emit`
//! is a silent no-op while the socket is closed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use rand::Rng;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use crate::client::ClientCommand;
use crate::error::ClientError;
use crate::message::{ClientEvent, ServerEvent};

/// Buffer size for outbound events awaiting the socket
const OUTBOUND_BUFFER_SIZE: usize = 64;

/// Connection configuration, fixed at construction.
///
/// Only the endpoint URL is required; the remaining knobs carry defaults
/// suitable for a local relay.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Relay endpoint, e.g. `ws://127.0.0.1:8080`
    pub url: String,
    /// Time limit for a single connect attempt
    pub connect_timeout: Duration,
    /// Whether to reconnect after failures and drops
    pub reconnect: bool,
    /// Base delay between attempts (jitter of up to half is added)
    pub reconnect_delay: Duration,
    /// Consecutive failed attempts before giving up
    pub max_reconnect_attempts: u32,
}

impl ChannelConfig {
    /// Configuration for the given endpoint with default retry policy:
    /// 20 s connect timeout, reconnection on, 1 s delay, 5 attempts.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_timeout: Duration::from_secs(20),
            reconnect: true,
            reconnect_delay: Duration::from_secs(1),
            max_reconnect_attempts: 5,
        }
    }
}

/// Outbound half of the channel.
///
/// Cloneable; owned by the client actor (constructor-injected so tests can
/// substitute a fake backed by a plain mpsc receiver).
#[derive(Debug, Clone)]
pub struct ChannelHandle {
    outbound: mpsc::Sender<ClientEvent>,
    open: Arc<AtomicBool>,
}

impl ChannelHandle {
    /// Build a handle around an outbound queue and an open flag.
    ///
    /// [`spawn`] wires this to a real socket task; tests pass their own
    /// receiver end and flag.
    pub fn new(outbound: mpsc::Sender<ClientEvent>, open: Arc<AtomicBool>) -> Self {
        Self { outbound, open }
    }

    /// Whether the underlying socket is currently open
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Send an event to the relay.
    ///
    /// No-op (never an error) while the socket is closed; gating sends on
    /// session status remains the caller's responsibility.
    pub fn emit(&self, event: ClientEvent) {
        if !self.is_open() {
            debug!(?event, "channel closed, dropping outbound event");
            return;
        }
        if self.outbound.try_send(event).is_err() {
            warn!("outbound queue unavailable, dropping event");
        }
    }
}

/// Start the channel task for the given configuration.
///
/// Lifecycle and inbound relay events arrive on `cmd_tx` as typed commands:
/// `Connecting` per attempt, `Opened`/`Closed` around each live session,
/// and a terminal `Errored` once the retry attempts are exhausted.
pub fn spawn(config: ChannelConfig, cmd_tx: mpsc::Sender<ClientCommand>) -> ChannelHandle {
    let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_BUFFER_SIZE);
    let open = Arc::new(AtomicBool::new(false));
    let handle = ChannelHandle::new(outbound_tx, open.clone());
    tokio::spawn(run_channel(config, cmd_tx, outbound_rx, open));
    handle
}

/// Connection lifecycle loop.
///
/// Counts consecutive failed connect attempts; a successful connection
/// resets the counter. Exits on retry exhaustion (after posting `Errored`),
/// on a final close with reconnection disabled, or when the actor goes away.
async fn run_channel(
    config: ChannelConfig,
    cmd_tx: mpsc::Sender<ClientCommand>,
    mut outbound_rx: mpsc::Receiver<ClientEvent>,
    open: Arc<AtomicBool>,
) {
    let mut attempts: u32 = 0;

    loop {
        if cmd_tx.send(ClientCommand::Connecting).await.is_err() {
            return;
        }

        match timeout(config.connect_timeout, connect_async(&config.url)).await {
            Ok(Ok((socket, _))) => {
                attempts = 0;
                // events emitted while closed are dropped, not replayed
                while outbound_rx.try_recv().is_ok() {}
                open.store(true, Ordering::SeqCst);
                info!(url = %config.url, "channel open");
                if cmd_tx.send(ClientCommand::Opened).await.is_err() {
                    return;
                }

                let result = drive_session(socket, &mut outbound_rx, &cmd_tx).await;
                open.store(false, Ordering::SeqCst);
                match result {
                    Ok(()) => info!("channel closed"),
                    Err(e) => warn!("channel session ended: {e}"),
                }
                if cmd_tx.send(ClientCommand::Closed).await.is_err() {
                    return;
                }
            }
            Ok(Err(e)) => {
                attempts += 1;
                warn!(attempt = attempts, "connect failed: {e}");
            }
            Err(_) => {
                attempts += 1;
                warn!(
                    attempt = attempts,
                    timeout_secs = config.connect_timeout.as_secs(),
                    "connect timed out"
                );
            }
        }

        let exhausted = attempts >= config.max_reconnect_attempts && attempts > 0;
        if exhausted || (!config.reconnect && attempts > 0) {
            let reason = ClientError::RetriesExhausted { attempts }.to_string();
            error!("{reason}");
            let _ = cmd_tx.send(ClientCommand::Errored { reason }).await;
            return;
        }
        if !config.reconnect {
            // clean close, reconnection disabled
            return;
        }

        tokio::time::sleep(jittered(config.reconnect_delay)).await;
    }
}

/// Base delay plus random jitter of up to half the delay
fn jittered(delay: Duration) -> Duration {
    let base = delay.as_millis() as u64;
    if base == 0 {
        return delay;
    }
    delay + Duration::from_millis(rand::thread_rng().gen_range(0..=base / 2))
}

/// Pump one live socket session.
///
/// Serializes outbound events onto the socket and parses inbound text
/// frames into [`ServerEvent`]s, delivering each exactly once, in arrival
/// order, to the actor queue. Returns when the socket closes or errors.
async fn drive_session(
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
    outbound_rx: &mut mpsc::Receiver<ClientEvent>,
    cmd_tx: &mpsc::Sender<ClientCommand>,
) -> Result<(), ClientError> {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => {
                let Some(event) = outbound else {
                    // actor dropped its handle; close the socket
                    let _ = ws_sender.close().await;
                    return Ok(());
                };
                let json = serde_json::to_string(&event)?;
                ws_sender.send(Message::Text(json.into())).await?;
            }
            inbound = ws_receiver.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ServerEvent>(&text) {
                            Ok(event) => {
                                if cmd_tx.send(event.into()).await.is_err() {
                                    return Ok(());
                                }
                            }
                            Err(e) => warn!("invalid frame from relay: {e}"),
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        debug!("relay sent close frame");
                        return Ok(());
                    }
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                        // pong replies are handled by tungstenite
                    }
                    Some(Ok(_)) => {
                        // binary or other frame types - ignore
                    }
                    Some(Err(e)) => return Err(e.into()),
                    None => return Ok(()),
                }
            }
        }
    }
}
