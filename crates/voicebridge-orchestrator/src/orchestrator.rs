//! Conversation Orchestrator: the streaming state machine that turns one
//! gateway's event stream into the client-facing NDJSON event stream,
//! spawning per-sentence TTS tasks as text arrives and draining them once
//! the gateway signals completion. Grounded in the original's
//! `ConversationOrchestrator.process_message` loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::Engine;
use regex::Regex;
use tokio::sync::mpsc;
use tokio::time::timeout;

use voicebridge_core::event::{AudioFormat, AudioTiming, ClientEvent, GatewayEvent, TimingInfo, TtsErrorReason};
use voicebridge_core::model::{ConversationTurn, Role};
use voicebridge_core::ports::{GatewayRequestOpts, SessionStorePort, TtsError};
use voicebridge_db::DurableSink;
use voicebridge_gateway::GatewayRegistry;
use voicebridge_normalize::SpeechNormalizer;
use voicebridge_profile::ProfileResolver;
use voicebridge_tts::TtsRegistry;

use crate::fallback::FallbackChain;
use crate::request::ConversationRequest;
use crate::sentence;

/// Minimum buffered length before the sentence extractor is tried (§4.8.1).
const MIN_SENTENCE: usize = 40;
const GATEWAY_IDLE_TIMEOUT: Duration = Duration::from_secs(310);
const TTS_CHUNK_TIMEOUT: Duration = Duration::from_secs(30);
const CONSECUTIVE_EMPTY_REASON: &str = "consecutive_empty";
const EXPLICIT_MARKER_REASON: &str = "explicit_marker";
const SESSION_RESET_MARKER: &str = "[SESSION_RESET]";

pub struct ConversationOrchestrator {
    session_store: Arc<dyn SessionStorePort>,
    gateways: Arc<GatewayRegistry>,
    tts: Arc<TtsRegistry>,
    normalizer: Arc<SpeechNormalizer>,
    profiles: Arc<ProfileResolver>,
    sink: DurableSink,
    fallback: Arc<FallbackChain>,
    session_prefix: String,
}

struct ResolvedSettings {
    gateway_id: String,
    tts_provider: Option<String>,
    voice: Option<String>,
    max_response_chars: Option<usize>,
    profile_id: String,
}

struct PendingTts {
    handle: tokio::task::JoinHandle<Result<voicebridge_core::AudioChunk, TtsError>>,
    spawned_at: Instant,
}

enum GatewayOutcome {
    TextDone { response: Option<String>, actions: Vec<serde_json::Value> },
    Failed(String),
}

impl ConversationOrchestrator {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session_store: Arc<dyn SessionStorePort>,
        gateways: Arc<GatewayRegistry>,
        tts: Arc<TtsRegistry>,
        normalizer: Arc<SpeechNormalizer>,
        profiles: Arc<ProfileResolver>,
        sink: DurableSink,
        fallback: Arc<FallbackChain>,
        session_prefix: impl Into<String>,
    ) -> Self {
        Self {
            session_store,
            gateways,
            tts,
            normalizer,
            profiles,
            sink,
            fallback,
            session_prefix: session_prefix.into(),
        }
    }

    /// Spawns the request's state machine and returns the channel it
    /// writes client events onto.
    pub fn handle(self: Arc<Self>, req: ConversationRequest) -> mpsc::UnboundedReceiver<ClientEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            self.run(req, tx).await;
        });
        rx
    }

    async fn run(&self, req: ConversationRequest, tx: mpsc::UnboundedSender<ClientEvent>) {
        let request_start = Instant::now();
        let voice_session_key = self.session_store.current(&self.session_prefix).await;
        let history_key = req.session_id.clone().unwrap_or_else(|| voice_session_key.clone());

        let profile = self.profiles.active().await;
        let resolved = ResolvedSettings {
            gateway_id: req.overrides.gateway_id.clone().unwrap_or_else(|| profile.gateway_id.clone()),
            tts_provider: req.overrides.tts_provider.clone().or_else(|| Some(profile.tts_provider.clone())),
            voice: req.overrides.voice.clone().or_else(|| Some(profile.voice.clone())),
            max_response_chars: req.overrides.max_response_chars.or(profile.max_response_chars),
            profile_id: profile.id.clone(),
        };

        let gateway_message = req.gateway_message();
        self.session_store.append(&history_key, ConversationTurn { role: Role::User, content: req.message.clone() }).await;

        let (tx_gw, mut rx_gw) = mpsc::unbounded_channel::<GatewayEvent>();
        {
            let gateways = self.gateways.clone();
            let gateway_id = resolved.gateway_id.clone();
            let msg = gateway_message.clone();
            let key = voice_session_key.clone();
            let opts = GatewayRequestOpts { agent_id: req.overrides.agent_id.clone() };
            tokio::spawn(async move {
                gateways.route(Some(&gateway_id), msg, key, opts, tx_gw).await;
            });
        }

        let mut buf = String::new();
        let mut pending: Vec<PendingTts> = Vec::new();
        let mut chunks_sent: u32 = 0;
        let mut captured_actions: Vec<serde_json::Value> = Vec::new();
        let mut handshake_ms: Option<u64> = None;
        let mut fallback_used = false;

        let outcome = loop {
            let next = timeout(GATEWAY_IDLE_TIMEOUT, rx_gw.recv()).await;
            let event = match next {
                Ok(Some(event)) => event,
                Ok(None) => break GatewayOutcome::Failed("gateway closed without a terminal event".to_string()),
                Err(_) => break GatewayOutcome::Failed("gateway idle timeout".to_string()),
            };

            match event {
                GatewayEvent::Handshake { ms } => {
                    handshake_ms = Some(ms);
                    let _ = tx.send(ClientEvent::Handshake { ms });
                }
                GatewayEvent::Delta { text } => {
                    buf.push_str(&text);
                    let _ = tx.send(ClientEvent::Delta { text });
                    while !sentence::has_open_tag(&buf) {
                        let Some((sentence_text, rest)) = sentence::extract_sentence(&buf, MIN_SENTENCE) else {
                            break;
                        };
                        buf = rest;
                        pending.push(self.spawn_tts(sentence_text, &resolved));
                    }
                }
                GatewayEvent::Action { action } => {
                    self.flush_completed(&mut pending, &mut chunks_sent, &tx).await;
                    captured_actions.push(action.clone());
                    let _ = tx.send(ClientEvent::Action { action });
                }
                GatewayEvent::TextDone { response, actions } => {
                    captured_actions.extend(actions.clone());
                    break GatewayOutcome::TextDone { response, actions };
                }
                GatewayEvent::Error { error } => break GatewayOutcome::Failed(error),
            }
        };

        let tool_call_count = captured_actions.len() as i64;

        let (mut response, actions, error_for_metrics) = match outcome {
            GatewayOutcome::TextDone { response, actions } => (response, actions, None),
            GatewayOutcome::Failed(reason) => {
                tracing::warn!("gateway failed ('{reason}'), invoking fallback chain");
                fallback_used = true;
                match self.fallback.run(&gateway_message, &voice_session_key).await {
                    Some(text) => (Some(text), Vec::new(), Some(reason)),
                    None => {
                        let _ = tx.send(ClientEvent::Error { error: reason.clone() });
                        let total_ms = request_start.elapsed().as_millis() as i64;
                        self.sink.record_metrics(
                            &history_key,
                            handshake_ms.map(i64::from),
                            Some(total_ms),
                            None,
                            Some(total_ms),
                            tool_call_count,
                            fallback_used,
                            Some(reason),
                        );
                        abort_remaining(pending);
                        return;
                    }
                }
            }
        };

        if let Some(max_len) = resolved.max_response_chars {
            if let Some(text) = &response {
                response = Some(truncate_to_sentence(text, max_len));
            }
        }

        let mut explicit_reset = false;
        if let Some(text) = &response {
            if text.contains(SESSION_RESET_MARKER) {
                explicit_reset = true;
                response = Some(text.replace(SESSION_RESET_MARKER, ""));
            }
        }

        let llm_ms = request_start.elapsed().as_millis() as u64;
        let was_empty = response.as_deref().map(str::trim).unwrap_or("").is_empty();

        let _ = tx.send(ClientEvent::TextDone {
            response: response.clone(),
            actions: actions.clone(),
            timing: TimingInfo { handshake_ms, llm_ms: Some(llm_ms), total_ms: Some(llm_ms) },
        });

        if req.is_sentinel() && is_bare_yes_no(response.as_deref().unwrap_or_default()) {
            let _ = tx.send(ClientEvent::NoAudio);
            self.finish(
                &history_key,
                &voice_session_key,
                response.as_deref().unwrap_or_default(),
                was_empty,
                explicit_reset,
                handshake_ms,
                llm_ms,
                0,
                tool_call_count,
                request_start,
                fallback_used,
                error_for_metrics,
                &tx,
            )
            .await;
            abort_remaining(pending);
            return;
        }

        let final_text = response.clone().unwrap_or_default();

        if let Some(audio_event) = self.try_audio_passthrough(&final_text).await {
            match audio_event {
                Ok(event) => {
                    let _ = tx.send(event);
                }
                Err(reason) => {
                    let _ = tx.send(ClientEvent::TtsError {
                        provider: resolved.tts_provider.clone().unwrap_or_default(),
                        reason: TtsErrorReason::FileReadError,
                        error: reason,
                    });
                }
            }
            self.finish(
                &history_key,
                &voice_session_key,
                &final_text,
                was_empty,
                explicit_reset,
                handshake_ms,
                llm_ms,
                0,
                tool_call_count,
                request_start,
                fallback_used,
                error_for_metrics,
                &tx,
            )
            .await;
            abort_remaining(pending);
            return;
        }

        if !buf.trim().is_empty() {
            let remainder = std::mem::take(&mut buf);
            pending.push(self.spawn_tts(remainder, &resolved));
        }
        if pending.is_empty() && !final_text.trim().is_empty() {
            pending.push(self.spawn_tts(final_text.clone(), &resolved));
        }

        if pending.is_empty() {
            let _ = tx.send(ClientEvent::NoAudio);
            self.finish(
                &history_key,
                &voice_session_key,
                &final_text,
                was_empty,
                explicit_reset,
                handshake_ms,
                llm_ms,
                0,
                tool_call_count,
                request_start,
                fallback_used,
                error_for_metrics,
                &tx,
            )
            .await;
            return;
        }

        let total_chunks = chunks_sent + pending.len() as u32;
        let mut tts_ms_total: i64 = 0;
        let mut pending_iter = pending.into_iter();
        while let Some(task) = pending_iter.next() {
            match timeout(TTS_CHUNK_TIMEOUT, task.handle).await {
                Ok(Ok(Ok(chunk))) => {
                    let tts_ms = task.spawned_at.elapsed().as_millis() as u64;
                    tts_ms_total += tts_ms as i64;
                    let total_ms = request_start.elapsed().as_millis() as u64;
                    let audio_format = match chunk.format {
                        voicebridge_core::AudioFormat::Wav => AudioFormat::Wav,
                        voicebridge_core::AudioFormat::Mp3 => AudioFormat::Mp3,
                        voicebridge_core::AudioFormat::RawPcm => AudioFormat::RawPcm,
                    };
                    let audio_b64 = base64::engine::general_purpose::STANDARD.encode(&chunk.bytes);
                    let _ = tx.send(ClientEvent::Audio {
                        audio: audio_b64,
                        audio_format,
                        chunk: chunks_sent,
                        total_chunks: Some(total_chunks),
                        timing: AudioTiming { tts_ms, total_ms },
                    });
                    chunks_sent += 1;
                }
                Ok(Ok(Err(e))) => {
                    let _ = tx.send(ClientEvent::TtsError {
                        provider: resolved.tts_provider.clone().unwrap_or_default(),
                        reason: tts_error_reason(&e),
                        error: e.to_string(),
                    });
                    abort_remaining(pending_iter);
                    break;
                }
                Ok(Err(_join_err)) => {
                    let _ = tx.send(ClientEvent::TtsError {
                        provider: resolved.tts_provider.clone().unwrap_or_default(),
                        reason: TtsErrorReason::Error,
                        error: "tts task panicked".to_string(),
                    });
                    abort_remaining(pending_iter);
                    break;
                }
                Err(_timeout) => {
                    let _ = tx.send(ClientEvent::TtsError {
                        provider: resolved.tts_provider.clone().unwrap_or_default(),
                        reason: TtsErrorReason::Error,
                        error: "tts chunk timed out".to_string(),
                    });
                    abort_remaining(pending_iter);
                    break;
                }
            }
        }

        self.finish(
            &history_key,
            &voice_session_key,
            &final_text,
            was_empty,
            explicit_reset,
            handshake_ms,
            llm_ms,
            tts_ms_total,
            tool_call_count,
            request_start,
            fallback_used,
            error_for_metrics,
            &tx,
        )
        .await;
    }

    fn spawn_tts(&self, text: String, resolved: &ResolvedSettings) -> PendingTts {
        let tts = self.tts.clone();
        let normalizer = self.normalizer.clone();
        let provider_id = resolved.tts_provider.clone();
        let voice = resolved.voice.clone();
        let profile_id = resolved.profile_id.clone();
        let spawned_at = Instant::now();
        let handle = tokio::spawn(async move {
            let cleaned = normalizer.normalize(&text, Some(profile_id.as_str()));
            if cleaned.trim().is_empty() {
                return Err(TtsError::Other("nothing left to speak after normalization".to_string()));
            }
            let provider = tts
                .get(provider_id.as_deref())
                .await
                .ok_or_else(|| TtsError::Other("no tts provider available".to_string()))?;
            voicebridge_audio::synthesize_chunked(
                &cleaned,
                provider.as_ref(),
                voice.as_deref(),
                voicebridge_audio::DEFAULT_MAX_CHARS,
            )
            .await
        });
        PendingTts { handle, spawned_at }
    }

    /// Flushes already-completed TTS tasks from the front of `pending`
    /// (§4.8.1's `action` row), preserving chunk order.
    async fn flush_completed(
        &self,
        pending: &mut Vec<PendingTts>,
        chunks_sent: &mut u32,
        tx: &mpsc::UnboundedSender<ClientEvent>,
    ) {
        while pending.first().is_some_and(|p| p.handle.is_finished()) {
            let task = pending.remove(0);
            let tts_ms = task.spawned_at.elapsed().as_millis() as u64;
            match task.handle.await {
                Ok(Ok(chunk)) => {
                    let audio_format = match chunk.format {
                        voicebridge_core::AudioFormat::Wav => AudioFormat::Wav,
                        voicebridge_core::AudioFormat::Mp3 => AudioFormat::Mp3,
                        voicebridge_core::AudioFormat::RawPcm => AudioFormat::RawPcm,
                    };
                    let audio_b64 = base64::engine::general_purpose::STANDARD.encode(&chunk.bytes);
                    let _ = tx.send(ClientEvent::Audio {
                        audio: audio_b64,
                        audio_format,
                        chunk: *chunks_sent,
                        total_chunks: None,
                        timing: AudioTiming { tts_ms, total_ms: tts_ms },
                    });
                }
                Ok(Err(e)) => {
                    let _ = tx.send(ClientEvent::TtsError {
                        provider: String::new(),
                        reason: tts_error_reason(&e),
                        error: e.to_string(),
                    });
                }
                Err(_join_err) => {
                    let _ = tx.send(ClientEvent::TtsError {
                        provider: String::new(),
                        reason: TtsErrorReason::Error,
                        error: "tts task panicked".to_string(),
                    });
                }
            }
            *chunks_sent += 1;
        }
    }

    /// Bare local-file passthrough (§4.8.5): if `text` is exactly an
    /// existing path with a recognized audio extension, read it directly
    /// instead of synthesizing.
    async fn try_audio_passthrough(&self, text: &str) -> Option<Result<ClientEvent, String>> {
        let trimmed = text.trim();
        let path = std::path::Path::new(trimmed);
        let ext = path.extension().and_then(|e| e.to_str())?;
        let format = match ext.to_ascii_lowercase().as_str() {
            "mp3" => AudioFormat::Mp3,
            "wav" => AudioFormat::Wav,
            "ogg" => AudioFormat::RawPcm,
            _ => return None,
        };
        if !path.is_file() {
            return None;
        }

        Some(match tokio::fs::read(path).await {
            Ok(bytes) => {
                let audio = base64::engine::general_purpose::STANDARD.encode(&bytes);
                Ok(ClientEvent::Audio {
                    audio,
                    audio_format: format,
                    chunk: 0,
                    total_chunks: Some(1),
                    timing: AudioTiming::default(),
                })
            }
            Err(e) => Err(e.to_string()),
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn finish(
        &self,
        history_key: &str,
        voice_session_key: &str,
        response_text: &str,
        was_empty: bool,
        explicit_reset: bool,
        handshake_ms: Option<u64>,
        llm_ms: u64,
        tts_ms: i64,
        tool_call_count: i64,
        request_start: Instant,
        fallback_used: bool,
        error: Option<String>,
        tx: &mpsc::UnboundedSender<ClientEvent>,
    ) {
        if !response_text.trim().is_empty() {
            self.session_store
                .append(history_key, ConversationTurn { role: Role::Assistant, content: response_text.to_string() })
                .await;
        }
        self.sink.append_history(history_key, "assistant", response_text, None, None);

        let total_ms = request_start.elapsed().as_millis() as i64;
        self.sink.record_metrics(
            history_key,
            handshake_ms.map(i64::from),
            Some(llm_ms as i64),
            Some(tts_ms),
            Some(total_ms),
            tool_call_count,
            fallback_used,
            error,
        );

        let auto_reset = self.session_store.record_text_done(&self.session_prefix, was_empty).await;
        if explicit_reset {
            self.emit_reset(voice_session_key, EXPLICIT_MARKER_REASON, tx).await;
        } else if auto_reset {
            self.emit_reset(voice_session_key, CONSECUTIVE_EMPTY_REASON, tx).await;
        }
    }

    async fn emit_reset(&self, old_key: &str, reason: &str, tx: &mpsc::UnboundedSender<ClientEvent>) {
        match self.session_store.bump(&self.session_prefix).await {
            Ok(new_key) => {
                let _ = tx.send(ClientEvent::SessionReset {
                    old: old_key.to_string(),
                    new: new_key,
                    reason: reason.to_string(),
                });
            }
            Err(e) => tracing::warn!("session reset bump failed: {e}"),
        }
    }
}

/// Aborts every still-in-flight TTS task so a request that ends early
/// (fallback with no text, sentinel suppression, audio passthrough, or a
/// mid-drain failure) doesn't leave synthesis work running in the
/// background for audio nothing will ever consume.
fn abort_remaining(pending: impl IntoIterator<Item = PendingTts>) {
    for task in pending {
        task.handle.abort();
    }
}

fn is_bare_yes_no(text: &str) -> bool {
    static PATTERN: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    let re = PATTERN.get_or_init(|| Regex::new(r"(?i)^\s*(no|yes)\.?\s*$").unwrap());
    re.is_match(text)
}

fn truncate_to_sentence(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_len).collect();
    if let Some(cut) = truncated.rfind(". ") {
        if cut > max_len / 2 {
            return text.chars().take(cut + 1).collect();
        }
    }
    let mut hard_cut: String = truncated.trim_end().to_string();
    hard_cut.push_str("...");
    hard_cut
}

fn tts_error_reason(e: &TtsError) -> TtsErrorReason {
    match e {
        TtsError::TermsRequired => TtsErrorReason::Terms,
        TtsError::RateLimitExceeded => TtsErrorReason::RateLimit,
        TtsError::InsufficientQuota => TtsErrorReason::NoCredits,
        TtsError::InvalidApiKey => TtsErrorReason::BadKey,
        TtsError::VoiceNotFound(_) | TtsError::Other(_) => TtsErrorReason::Error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::PathBuf;

    use voicebridge_core::ports::{GatewayError, GatewayPort};
    use voicebridge_gateway::GatewayRegistry;
    use voicebridge_normalize::SpeechNormalizer;
    use voicebridge_profile::ProfileResolver;
    use voicebridge_session::FileSessionStore;
    use voicebridge_tts::providers::LocalSilenceProvider;
    use voicebridge_tts::TtsRegistry;

    struct ScriptedGateway {
        events: Vec<GatewayEvent>,
    }

    #[async_trait]
    impl GatewayPort for ScriptedGateway {
        fn id(&self) -> &str {
            "openclaw"
        }
        fn is_persistent(&self) -> bool {
            false
        }
        fn is_configured(&self) -> bool {
            true
        }
        async fn stream(
            &self,
            _message: String,
            _session_key: String,
            _opts: GatewayRequestOpts,
            tx: mpsc::UnboundedSender<GatewayEvent>,
        ) -> Result<(), GatewayError> {
            for event in self.events.clone() {
                let _ = tx.send(event);
            }
            Ok(())
        }
    }

    async fn test_orchestrator(events: Vec<GatewayEvent>) -> (Arc<ConversationOrchestrator>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();

        let session_store: Arc<dyn SessionStorePort> =
            Arc::new(FileSessionStore::new(dir.path().join("counter")));

        let gateways = Arc::new(GatewayRegistry::new());
        gateways.register(Arc::new(ScriptedGateway { events })).await;

        let tts = Arc::new(TtsRegistry::new());
        tts.register(Arc::new(LocalSilenceProvider::default())).await;

        let normalizer = Arc::new(SpeechNormalizer::new(PathBuf::from("/nonexistent/speech_normalization.toml")));

        let profiles = Arc::new(ProfileResolver::new(dir.path().join("profiles"), dir.path().join("active")));

        let pool = voicebridge_db::setup_test_database().await.unwrap();
        let sink = voicebridge_db::DurableSink::spawn(pool);

        let fallback = Arc::new(FallbackChain::new(Vec::new()));

        let orchestrator = Arc::new(ConversationOrchestrator::new(
            session_store,
            gateways,
            tts,
            normalizer,
            profiles,
            sink,
            fallback,
            "voice-main",
        ));
        (orchestrator, dir)
    }

    fn basic_request(message: &str) -> ConversationRequest {
        ConversationRequest {
            message: message.to_string(),
            session_id: Some("sess-test".to_string()),
            overrides: voicebridge_core::model::RequestOverrides::default(),
            ui_context: voicebridge_core::model::UiContext::default(),
        }
    }

    #[tokio::test]
    async fn happy_path_emits_one_audio_chunk_then_ends() {
        let (orchestrator, _dir) = test_orchestrator(vec![
            GatewayEvent::Delta { text: "Hi ".to_string() },
            GatewayEvent::Delta { text: "there.".to_string() },
            GatewayEvent::TextDone { response: Some("Hi there.".to_string()), actions: vec![] },
        ])
        .await;

        let mut rx = orchestrator.handle(basic_request("Hi"));
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }

        assert!(matches!(events[0], ClientEvent::Delta { .. }));
        assert!(matches!(events[1], ClientEvent::Delta { .. }));
        assert!(matches!(events[2], ClientEvent::TextDone { .. }));
        assert!(matches!(events[3], ClientEvent::Audio { chunk: 0, .. }));
        assert_eq!(events.len(), 4);
    }

    #[tokio::test]
    async fn max_response_chars_truncates_at_sentence_boundary() {
        let (orchestrator, _dir) = test_orchestrator(vec![GatewayEvent::TextDone {
            response: Some("Sentence one. Sentence two. Sentence three.".to_string()),
            actions: vec![],
        }])
        .await;

        let mut req = basic_request("go");
        req.overrides.max_response_chars = Some(20);
        let mut rx = orchestrator.handle(req);

        let mut text_done_response = None;
        while let Some(event) = rx.recv().await {
            if let ClientEvent::TextDone { response, .. } = event {
                text_done_response = response;
            }
        }
        assert_eq!(text_done_response.as_deref(), Some("Sentence one."));
    }

    #[tokio::test]
    async fn sentinel_bare_no_suppresses_audio() {
        let (orchestrator, _dir) =
            test_orchestrator(vec![GatewayEvent::TextDone { response: Some("NO".to_string()), actions: vec![] }]).await;

        let mut rx = orchestrator.handle(basic_request("__session_start__"));
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }

        assert!(matches!(events[0], ClientEvent::TextDone { .. }));
        assert!(matches!(events[1], ClientEvent::NoAudio));
        assert_eq!(events.len(), 2);
    }
}
