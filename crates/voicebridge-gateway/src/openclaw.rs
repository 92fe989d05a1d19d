//! Reference persistent gateway: one long-lived WebSocket per process,
//! multiplexing concurrent chat requests by correlation id. Grounded in
//! the original `services/gateways/openclaw.py`'s handshake/request
//! protocol, reimplemented on `tokio-tungstenite` (async) rather than the
//! sync `tungstenite` client seen in
//! `nganlinh4-screen-grounded-translator/src/api/tts/worker.rs`, since
//! this server is async/tokio-first throughout.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio_tungstenite::tungstenite::Message;

use voicebridge_core::event::GatewayEvent;
use voicebridge_core::ports::{GatewayError, GatewayPort, GatewayRequestOpts};

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);
const RECONNECT_BACKOFF_CAP: Duration = Duration::from_secs(30);
const MAX_CONNECT_ATTEMPTS: u32 = 5;
/// Safety net releasing a session's lock if a request's terminal event is
/// never observed (matches the correlation-map cleanup window).
const SESSION_LOCK_SAFETY_NET: Duration = Duration::from_secs(310);

#[derive(Debug, Clone)]
pub struct OpenClawConfig {
    pub ws_url: String,
    pub auth_token: Option<String>,
    pub client_id: String,
}

/// Per-request correlation state: the channel the dispatch loop forwards
/// inbound frames for this request onto, plus a one-shot fired once its
/// terminal event has been dispatched.
struct PendingEntry {
    tx: mpsc::UnboundedSender<GatewayEvent>,
    done: Option<oneshot::Sender<()>>,
}

type PendingMap = Arc<Mutex<HashMap<String, PendingEntry>>>;
type SessionLocks = Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>;

pub struct OpenClawGateway {
    config: OpenClawConfig,
    pending: PendingMap,
    outbound: Mutex<Option<mpsc::UnboundedSender<Message>>>,
    /// One mutex per session key so at most one request frame for a given
    /// session is ever in flight at a time; concurrent callers queue.
    session_locks: SessionLocks,
}

impl OpenClawGateway {
    #[must_use]
    pub fn new(config: OpenClawConfig) -> Self {
        Self {
            config,
            pending: Arc::new(Mutex::new(HashMap::new())),
            outbound: Mutex::new(None),
            session_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Ensures the transport is connected, spawning the dial + dispatch
    /// loop on first use. Reconnects with exponential backoff capped at
    /// 30s if the previous connection dropped or never came up.
    async fn ensure_connected(&self) -> Result<mpsc::UnboundedSender<Message>, GatewayError> {
        let mut guard = self.outbound.lock().await;
        if let Some(tx) = guard.as_ref() {
            if !tx.is_closed() {
                return Ok(tx.clone());
            }
        }

        let mut last_err = None;
        for attempt in 0..MAX_CONNECT_ATTEMPTS {
            if attempt > 0 {
                tokio::time::sleep(backoff_for_attempt(attempt)).await;
            }
            match connect_once(&self.config, self.pending.clone()).await {
                Ok(tx) => {
                    *guard = Some(tx.clone());
                    return Ok(tx);
                }
                Err(e) => {
                    tracing::warn!("openclaw connect attempt {attempt} failed: {e}");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| GatewayError::Transport("connect retries exhausted".to_string())))
    }

    /// Returns the lock guarding `session_key`, creating it on first use.
    async fn session_mutex(&self, session_key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.session_locks.lock().await;
        locks.entry(session_key.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }
}

async fn connect_once(
    config: &OpenClawConfig,
    pending: PendingMap,
) -> Result<mpsc::UnboundedSender<Message>, GatewayError> {
    let (socket, _) = tokio::time::timeout(HANDSHAKE_TIMEOUT, tokio_tungstenite::connect_async(&config.ws_url))
        .await
        .map_err(|_| GatewayError::Timeout(HANDSHAKE_TIMEOUT.as_secs()))?
        .map_err(|e| GatewayError::Transport(e.to_string()))?;

    let (mut write, mut read) = socket.split();

    // Handshake: wait for `connect.challenge`, reply `connect`, expect `hello`.
    let challenge = tokio::time::timeout(HANDSHAKE_TIMEOUT, read.next())
        .await
        .map_err(|_| GatewayError::Timeout(HANDSHAKE_TIMEOUT.as_secs()))?
        .ok_or_else(|| GatewayError::Transport("socket closed before challenge".to_string()))?
        .map_err(|e| GatewayError::Transport(e.to_string()))?;
    tracing::debug!("openclaw: received challenge frame: {challenge:?}");

    let connect_frame = json!({
        "type": "connect",
        "client_id": config.client_id,
        "auth_token": config.auth_token,
        "protocol": { "min": 1, "max": 1 },
    });
    write
        .send(Message::Text(connect_frame.to_string()))
        .await
        .map_err(|e| GatewayError::Transport(e.to_string()))?;

    let hello = tokio::time::timeout(HANDSHAKE_TIMEOUT, read.next())
        .await
        .map_err(|_| GatewayError::Timeout(HANDSHAKE_TIMEOUT.as_secs()))?
        .ok_or_else(|| GatewayError::Transport("socket closed before hello".to_string()))?
        .map_err(|e| GatewayError::Transport(e.to_string()))?;
    if let Message::Text(raw) = &hello {
        let parsed: serde_json::Value = serde_json::from_str(raw).unwrap_or_default();
        if parsed.get("type").and_then(|t| t.as_str()) == Some("error") {
            return Err(GatewayError::Transport(format!("handshake rejected: {raw}")));
        }
    }

    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Message>();

    // Writer task: serializes all outbound frames through one mutex-free
    // channel so concurrent requests never interleave partial frames.
    tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            if write.send(msg).await.is_err() {
                break;
            }
        }
    });

    // Reader/dispatch task: demultiplexes inbound frames by correlation id
    // onto each request's own channel.
    tokio::spawn(dispatch_loop(read, pending));

    Ok(out_tx)
}

async fn dispatch_loop(
    mut read: futures_util::stream::SplitStream<
        tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
    >,
    pending: PendingMap,
) {
    while let Some(frame) = read.next().await {
        let Ok(Message::Text(raw)) = frame else { continue };
        let Ok(parsed) = serde_json::from_str::<InboundFrame>(&raw) else { continue };

        let is_terminal = matches!(parsed.kind.as_str(), "chat.done" | "chat.final" | "error");

        if is_terminal {
            // Deregister before sending so the request's session lock is
            // released (by the stream()-spawned releaser task) as soon as
            // the terminal event reaches the caller, not after the
            // correlation-cleanup safety net.
            let entry = pending.lock().await.remove(&parsed.request_id);
            let Some(entry) = entry else { continue };
            match parsed.kind.as_str() {
                "chat.done" | "chat.final" => {
                    let _ = entry.tx.send(GatewayEvent::TextDone {
                        response: parsed.text,
                        actions: parsed.actions.unwrap_or_default(),
                    });
                }
                "error" => {
                    let _ = entry.tx.send(GatewayEvent::Error { error: parsed.error.unwrap_or_default() });
                }
                _ => unreachable!(),
            }
            if let Some(done) = entry.done {
                let _ = done.send(());
            }
            continue;
        }

        let map = pending.lock().await;
        let Some(entry) = map.get(&parsed.request_id) else { continue };
        match parsed.kind.as_str() {
            "chat.response" => {
                if let Some(text) = parsed.text {
                    let _ = entry.tx.send(GatewayEvent::Delta { text });
                }
            }
            "chat.tool_start" | "chat.tool_end" => {
                let _ = entry.tx.send(GatewayEvent::Action { action: parsed.payload.unwrap_or_default() });
            }
            _ => {} // heartbeat/presence/unrelated — drop
        }
    }

    // Transport dropped mid-flight: fail every outstanding request and
    // release their session locks.
    let mut map = pending.lock().await;
    for (_, entry) in map.drain() {
        let _ = entry.tx.send(GatewayEvent::Error { error: "openclaw transport disconnected".to_string() });
        if let Some(done) = entry.done {
            let _ = done.send(());
        }
    }
}

#[derive(Debug, Deserialize)]
struct InboundFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    request_id: String,
    text: Option<String>,
    payload: Option<serde_json::Value>,
    #[serde(default)]
    actions: Option<Vec<serde_json::Value>>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct OutboundChatRequest<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    request_id: &'a str,
    session_key: &'a str,
    message: &'a str,
    agent_id: Option<&'a str>,
}

#[async_trait]
impl GatewayPort for OpenClawGateway {
    fn id(&self) -> &str {
        "openclaw"
    }

    fn is_persistent(&self) -> bool {
        true
    }

    fn is_configured(&self) -> bool {
        !self.config.ws_url.is_empty()
    }

    async fn stream(
        &self,
        message: String,
        session_key: String,
        opts: GatewayRequestOpts,
        tx: mpsc::UnboundedSender<GatewayEvent>,
    ) -> Result<(), GatewayError> {
        // At most one request frame per session key in flight at a time:
        // a concurrent call for the same session blocks here until the
        // previous one's terminal event has been dispatched.
        let session_lock = self.session_mutex(&session_key).await;
        let guard = session_lock.lock_owned().await;

        let outbound = self.ensure_connected().await?;
        let request_id = uuid::Uuid::new_v4().to_string();
        let (done_tx, done_rx) = oneshot::channel();

        self.pending
            .lock()
            .await
            .insert(request_id.clone(), PendingEntry { tx: tx.clone(), done: Some(done_tx) });

        let frame = OutboundChatRequest {
            kind: "chat.request",
            request_id: &request_id,
            session_key: &session_key,
            message: &message,
            agent_id: opts.agent_id.as_deref(),
        };
        let start = std::time::Instant::now();
        outbound
            .send(Message::Text(serde_json::to_string(&frame).unwrap()))
            .map_err(|_| GatewayError::Transport("writer task gone".to_string()))?;
        let _ = tx.send(GatewayEvent::Handshake { ms: start.elapsed().as_millis() as u64 });

        // The dispatch loop forwards events directly into `tx` and fires
        // `done_rx` once it has dispatched this request's terminal event,
        // releasing the session lock for the next queued request. The
        // sleep is a safety net for abandoned requests the dispatch loop
        // never resolves (matches the old correlation-cleanup window).
        let pending = self.pending.clone();
        tokio::spawn(async move {
            let _guard = guard;
            tokio::select! {
                _ = done_rx => {}
                () = tokio::time::sleep(SESSION_LOCK_SAFETY_NET) => {}
            }
            pending.lock().await.remove(&request_id);
        });

        Ok(())
    }
}

#[must_use]
pub fn backoff_for_attempt(attempt: u32) -> Duration {
    let secs = 2u64.saturating_pow(attempt.min(5));
    Duration::from_secs(secs).min(RECONNECT_BACKOFF_CAP)
}
