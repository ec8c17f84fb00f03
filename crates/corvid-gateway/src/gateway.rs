//! The realtime Gateway connection and its lifecycle.
//!
//! A [`Gateway`] owns one realtime session per bootstrap invocation and
//! moves through `start` → `run` → `stop`. Resume, reconnection, and
//! heartbeating are internal to this collaborator; callers only observe
//! the three lifecycle operations and the [`ShutdownHandle`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use corvid_core::{Event, EventHandler, Intents, Ready};
use tokio::sync::{Mutex, broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use crate::connection::{self, WsReader, WsWriter};
use crate::error::{GatewayError, GatewayResult};
use crate::heartbeat::{AckTracker, Heartbeater};
use crate::protocol::{self, GatewayPayload, Hello, opcode};
use crate::reconnect::ReconnectPolicy;
use crate::rest::RestClient;

/// Timeout for receiving Hello after the socket opens.
const HELLO_TIMEOUT: Duration = Duration::from_secs(30);

/// Grace period for the writer task to flush before being aborted.
const WRITER_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Outbound payload channel depth.
const OUTBOUND_BUFFER: usize = 64;

/// Close codes treated as a deliberate end of session by the remote.
const CLEAN_CLOSE_CODES: [u16; 2] = [1000, 1001];

// ── Lifecycle Contract ───────────────────────────────────────

/// Lifecycle contract of a realtime connection.
///
/// `start` establishes the session or fails fatally; `run` blocks until
/// the connection ends; `stop` releases resources, runs no matter how
/// `run` returned, and must be a harmless no-op on a connection that was
/// never started.
#[async_trait]
pub trait Connection: Send {
    /// Establish the realtime session.
    async fn start(&mut self) -> GatewayResult<()>;

    /// Block until the connection is closed by the remote side, by
    /// policy, or by a shutdown signal.
    async fn run(&mut self) -> GatewayResult<()>;

    /// Release resources. Idempotent.
    async fn stop(&mut self);
}

// ── Configuration ────────────────────────────────────────────

/// Tuning knobs for the Gateway connection.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Reconnect attempts before `run` gives up.
    pub max_reconnect_attempts: u32,
    /// Base delay for exponential backoff (milliseconds).
    pub backoff_base_ms: u64,
    /// Backoff delay cap (milliseconds).
    pub backoff_cap_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_reconnect_attempts: u32::MAX,
            backoff_base_ms: 1000,
            backoff_cap_ms: 60_000,
        }
    }
}

// ── Shutdown ─────────────────────────────────────────────────

/// Makes a blocking [`Connection::run`] return promptly.
///
/// Clonable; any clone may signal. Signalling more than once, or before
/// `run` begins, is harmless.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: broadcast::Sender<()>,
}

impl ShutdownHandle {
    /// Request shutdown.
    pub fn signal(&self) {
        let _ = self.tx.send(());
    }
}

// ── Session State ────────────────────────────────────────────

/// Resume state carried across reconnections.
struct SessionState {
    session_id: Option<String>,
    sequence: Option<u64>,
    resume_gateway_url: Option<String>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            session_id: None,
            sequence: None,
            resume_gateway_url: None,
        }
    }

    fn can_resume(&self) -> bool {
        self.session_id.is_some() && self.resume_gateway_url.is_some()
    }

    fn clear_session(&mut self) {
        self.session_id = None;
        self.resume_gateway_url = None;
    }
}

/// What the event loop decided to do with the current socket.
enum LoopAction {
    Shutdown,
    CleanClose,
    Resume,
    Reconnect,
}

/// Background tasks and channels for one open socket.
struct Live {
    reader: WsReader,
    outbound_tx: mpsc::Sender<GatewayPayload>,
    acks: Arc<AckTracker>,
    heartbeat: JoinHandle<()>,
    writer: JoinHandle<()>,
    zombie_rx: oneshot::Receiver<()>,
}

// ── Gateway ──────────────────────────────────────────────────

/// The realtime Gateway connection.
///
/// Built from the privilege mask computed by intent inference, the REST
/// transport handle, and the event-dispatch engine; constructed once per
/// bootstrap invocation, after both are known.
pub struct Gateway {
    token: String,
    intents: Intents,
    rest: RestClient,
    handler: Arc<dyn EventHandler>,
    config: GatewayConfig,
    state: SessionState,
    /// Last dispatch sequence, shared with the heartbeat task.
    sequence: Arc<Mutex<Option<u64>>>,
    live: Option<Live>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Gateway {
    /// Create a Gateway with default configuration. Does not connect.
    #[must_use]
    pub fn new(
        token: impl Into<String>,
        intents: Intents,
        rest: RestClient,
        handler: Arc<dyn EventHandler>,
    ) -> Self {
        Self::with_config(token, intents, rest, handler, GatewayConfig::default())
    }

    /// Create a Gateway with explicit configuration. Does not connect.
    #[must_use]
    pub fn with_config(
        token: impl Into<String>,
        intents: Intents,
        rest: RestClient,
        handler: Arc<dyn EventHandler>,
        config: GatewayConfig,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            token: token.into(),
            intents,
            rest,
            handler,
            config,
            state: SessionState::new(),
            sequence: Arc::new(Mutex::new(None)),
            live: None,
            shutdown_tx,
        }
    }

    /// The privilege mask this connection identifies with.
    #[must_use]
    pub const fn intents(&self) -> Intents {
        self.intents
    }

    /// A handle that makes the blocking `run` return promptly.
    #[must_use]
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: self.shutdown_tx.clone(),
        }
    }

    /// Open a socket, perform the Hello handshake, and send Identify or
    /// Resume.
    async fn open_connection(&mut self) -> GatewayResult<Live> {
        let base_url = self.resolve_gateway_url().await?;
        let url = format!("{base_url}?v=10&encoding=json");
        info!(url = %url, "Connecting to the Gateway");

        let (writer, mut reader) = connection::connect(&url).await?;
        let hello = wait_for_hello(&mut reader).await?;

        *self.sequence.lock().await = self.state.sequence;
        let acks = Arc::new(AckTracker::default());
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_BUFFER);
        let (zombie_tx, zombie_rx) = oneshot::channel();

        let heartbeat = tokio::spawn(
            Heartbeater {
                sequence: Arc::clone(&self.sequence),
                acks: Arc::clone(&acks),
                outbound_tx: outbound_tx.clone(),
            }
            .run(
                hello.heartbeat_interval,
                zombie_tx,
                self.shutdown_tx.subscribe(),
            ),
        );
        let writer = spawn_writer(writer, outbound_rx);

        let auth = if self.state.can_resume() {
            let session_id = self.state.session_id.as_deref().unwrap_or("");
            protocol::resume(&self.token, session_id, self.state.sequence.unwrap_or(0))
        } else {
            protocol::identify(&self.token, self.intents)
        };
        outbound_tx
            .send(auth)
            .await
            .map_err(|_| GatewayError::Protocol("writer channel closed".into()))?;

        Ok(Live {
            reader,
            outbound_tx,
            acks,
            heartbeat,
            writer,
            zombie_rx,
        })
    }

    /// Resume URL when resumable, otherwise a fresh fetch over REST.
    async fn resolve_gateway_url(&mut self) -> GatewayResult<String> {
        if self.state.can_resume() {
            let url = self.state.resume_gateway_url.clone().unwrap_or_default();
            if protocol::is_valid_resume_url(&url) {
                return Ok(url);
            }
            warn!(url = %url, "Invalid resume URL, fetching fresh");
            self.state.clear_session();
        }
        Ok(self.rest.get_gateway_bot().await?.url)
    }

    /// Event loop over one open socket.
    async fn drive(
        &mut self,
        live: &mut Live,
        shutdown_rx: &mut broadcast::Receiver<()>,
        policy: &mut ReconnectPolicy,
    ) -> GatewayResult<LoopAction> {
        loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.recv() => {
                    info!("Gateway received shutdown signal");
                    return Ok(LoopAction::Shutdown);
                }

                _ = &mut live.zombie_rx => {
                    warn!("Zombie connection detected; reconnecting");
                    return Ok(self.resume_or_reconnect());
                }

                payload = connection::next_payload(&mut live.reader) => {
                    match payload {
                        Ok(Some(payload)) => {
                            if let Some(action) = self.handle_payload(payload, live, policy).await {
                                return Ok(action);
                            }
                        },
                        Ok(None) => {
                            warn!("WebSocket stream ended");
                            return Ok(self.resume_or_reconnect());
                        },
                        Err(GatewayError::Closed(code)) => {
                            if let Some(fatal) = protocol::fatal_close(code) {
                                error!(code, "Fatal close code from the Gateway");
                                return Err(fatal);
                            }
                            if CLEAN_CLOSE_CODES.contains(&code) {
                                info!(code, "Connection closed by the remote side");
                                return Ok(LoopAction::CleanClose);
                            }
                            warn!(code, "Connection closed");
                            return Ok(self.resume_or_reconnect());
                        },
                        Err(e) => {
                            warn!(error = %e, "WebSocket read error");
                            return Ok(self.resume_or_reconnect());
                        },
                    }
                }
            }
        }
    }

    /// Handle one payload. Returns `Some(action)` to leave the loop.
    async fn handle_payload(
        &mut self,
        payload: GatewayPayload,
        live: &mut Live,
        policy: &mut ReconnectPolicy,
    ) -> Option<LoopAction> {
        match payload.op {
            opcode::DISPATCH => {
                self.handle_dispatch(payload, policy).await;
                None
            },
            opcode::HEARTBEAT => {
                let seq = *self.sequence.lock().await;
                let _ = live.outbound_tx.send(protocol::heartbeat(seq)).await;
                None
            },
            opcode::HEARTBEAT_ACK => {
                live.acks.ack();
                None
            },
            opcode::RECONNECT => {
                info!("Server requested reconnect");
                Some(self.resume_or_reconnect())
            },
            opcode::INVALID_SESSION => {
                let resumable = payload
                    .d
                    .as_ref()
                    .and_then(serde_json::Value::as_bool)
                    .unwrap_or(false);
                warn!(resumable, "Session invalidated by the Gateway");
                if resumable && self.state.can_resume() {
                    Some(LoopAction::Resume)
                } else {
                    self.state.clear_session();
                    Some(LoopAction::Reconnect)
                }
            },
            opcode::HELLO => {
                warn!("Unexpected Hello mid-session");
                None
            },
            op => {
                debug!(op, "Unknown Gateway opcode");
                None
            },
        }
    }

    /// Decode a dispatch event and hand it to the dispatch engine.
    async fn handle_dispatch(&mut self, payload: GatewayPayload, policy: &mut ReconnectPolicy) {
        if let Some(seq) = payload.s {
            *self.sequence.lock().await = Some(seq);
            self.state.sequence = Some(seq);
        }

        let name = payload.t.unwrap_or_default();
        let data = payload.d.unwrap_or(serde_json::Value::Null);

        match Event::from_dispatch(&name, data) {
            Ok(Some(event)) => {
                match &event {
                    Event::Ready(ready) => {
                        info!(user = %ready.user.id, "Gateway session established");
                        self.capture_session(ready);
                        policy.record_success();
                    },
                    Event::Resumed => {
                        info!("Gateway session resumed");
                        policy.record_success();
                    },
                    _ => {},
                }
                self.handler.handle_event(event);
            },
            Ok(None) => trace!(name, "Unmodelled dispatch event"),
            Err(e) => warn!(name, error = %e, "Failed to decode dispatch payload"),
        }
    }

    /// Record session state from READY for later resumes.
    fn capture_session(&mut self, ready: &Ready) {
        self.state.session_id = Some(ready.session_id.clone());
        if protocol::is_valid_resume_url(&ready.resume_gateway_url) {
            self.state.resume_gateway_url = Some(ready.resume_gateway_url.clone());
        } else {
            warn!(url = %ready.resume_gateway_url, "Ignoring invalid resume URL");
            self.state.resume_gateway_url = None;
        }
    }

    fn resume_or_reconnect(&self) -> LoopAction {
        if self.state.can_resume() {
            LoopAction::Resume
        } else {
            LoopAction::Reconnect
        }
    }
}

#[async_trait]
impl Connection for Gateway {
    async fn start(&mut self) -> GatewayResult<()> {
        if self.live.is_some() {
            warn!("start called on an already-started Gateway");
            return Ok(());
        }
        let live = self.open_connection().await?;
        self.live = Some(live);
        Ok(())
    }

    async fn run(&mut self) -> GatewayResult<()> {
        if self.live.is_none() {
            return Err(GatewayError::NotStarted);
        }

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let mut policy = ReconnectPolicy::new(&self.config);

        loop {
            let mut live = match self.live.take() {
                Some(live) => live,
                None => match self.open_connection().await {
                    Ok(live) => live,
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        warn!(error = %e, "Connection attempt failed");
                        self.state.clear_session();
                        let delay = policy.next_attempt()?;
                        info!(
                            delay_ms = delay.as_millis() as u64,
                            failures = policy.failures(),
                            "Retrying after backoff"
                        );
                        if sleep_or_shutdown(&mut shutdown_rx, delay).await {
                            continue;
                        }
                        return Ok(());
                    },
                },
            };

            let outcome = self.drive(&mut live, &mut shutdown_rx, &mut policy).await;
            teardown(live).await;

            match outcome {
                Ok(LoopAction::Shutdown) => return Ok(()),
                Ok(LoopAction::CleanClose) => return Ok(()),
                Ok(LoopAction::Resume) => {
                    let delay = Duration::from_millis(fastrand::u64(1000..=5000));
                    info!(delay_ms = delay.as_millis() as u64, "Attempting resume");
                    if !sleep_or_shutdown(&mut shutdown_rx, delay).await {
                        return Ok(());
                    }
                },
                Ok(LoopAction::Reconnect) => {
                    self.state.clear_session();
                    let delay = policy.next_attempt()?;
                    info!(
                        delay_ms = delay.as_millis() as u64,
                        failures = policy.failures(),
                        "Reconnecting after backoff"
                    );
                    if !sleep_or_shutdown(&mut shutdown_rx, delay).await {
                        return Ok(());
                    }
                },
                Err(e) => {
                    error!(error = %e, "Fatal Gateway error");
                    return Err(e);
                },
            }
        }
    }

    async fn stop(&mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(live) = self.live.take() {
            teardown(live).await;
        }
        debug!("Gateway stopped");
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        if let Some(live) = self.live.take() {
            live.heartbeat.abort();
            live.writer.abort();
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────

/// Await the Hello payload, bounded by [`HELLO_TIMEOUT`].
async fn wait_for_hello(reader: &mut WsReader) -> GatewayResult<Hello> {
    let payload = tokio::time::timeout(HELLO_TIMEOUT, connection::next_payload(reader))
        .await
        .map_err(|_| GatewayError::HelloTimeout)??;
    let Some(payload) = payload else {
        return Err(GatewayError::Protocol("stream ended before Hello".into()));
    };
    if payload.op != opcode::HELLO {
        return Err(GatewayError::Protocol(format!(
            "expected Hello, got opcode {}",
            payload.op
        )));
    }
    let data = payload
        .d
        .ok_or_else(|| GatewayError::Protocol("Hello without data".into()))?;
    Ok(serde_json::from_value(data)?)
}

/// Forward outbound payloads to the socket until the channel drains.
fn spawn_writer(
    mut writer: WsWriter,
    mut outbound_rx: mpsc::Receiver<GatewayPayload>,
) -> JoinHandle<()> {
    use futures::SinkExt;

    tokio::spawn(async move {
        while let Some(payload) = outbound_rx.recv().await {
            if let Err(e) = connection::send_payload(&mut writer, &payload).await {
                debug!(error = %e, "Writer task: send failed");
                break;
            }
        }
        let _ = writer.close().await;
    })
}

/// Stop the background tasks of one socket, giving the writer a short
/// window to flush.
async fn teardown(live: Live) {
    live.heartbeat.abort();
    let Live {
        outbound_tx,
        mut writer,
        ..
    } = live;
    drop(outbound_tx);
    tokio::select! {
        _ = &mut writer => {},
        () = tokio::time::sleep(WRITER_FLUSH_TIMEOUT) => {
            writer.abort();
        },
    }
}

/// Sleep unless shutdown fires first. Returns `false` on shutdown.
async fn sleep_or_shutdown(shutdown_rx: &mut broadcast::Receiver<()>, delay: Duration) -> bool {
    tokio::select! {
        biased;
        _ = shutdown_rx.recv() => false,
        () = tokio::time::sleep(delay) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DiscardEvents;

    impl EventHandler for DiscardEvents {
        fn handle_event(&self, _event: Event) {}
    }

    fn test_gateway() -> Gateway {
        Gateway::new(
            "token",
            Intents::NON_PRIVILEGED,
            RestClient::new("token"),
            Arc::new(DiscardEvents),
        )
    }

    #[tokio::test]
    async fn stop_on_never_started_gateway_is_a_noop() {
        let mut gateway = test_gateway();
        gateway.stop().await;
        gateway.stop().await;
    }

    #[tokio::test]
    async fn run_before_start_fails() {
        let mut gateway = test_gateway();
        assert!(matches!(gateway.run().await, Err(GatewayError::NotStarted)));
    }

    #[tokio::test]
    async fn shutdown_handle_signals_without_receivers() {
        let gateway = test_gateway();
        let handle = gateway.shutdown_handle();
        handle.signal();
        handle.clone().signal();
    }

    #[test]
    fn default_config_never_gives_up() {
        let config = GatewayConfig::default();
        assert_eq!(config.max_reconnect_attempts, u32::MAX);
        assert_eq!(config.backoff_base_ms, 1000);
        assert_eq!(config.backoff_cap_ms, 60_000);
    }

    #[test]
    fn session_state_resume_requires_id_and_url() {
        let mut state = SessionState::new();
        assert!(!state.can_resume());
        state.session_id = Some("sess".into());
        assert!(!state.can_resume());
        state.resume_gateway_url = Some("wss://gateway.discord.gg".into());
        assert!(state.can_resume());
        state.clear_session();
        assert!(!state.can_resume());
    }
}
