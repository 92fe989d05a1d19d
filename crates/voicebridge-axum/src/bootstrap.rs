//! Composition root (§4.12): the only place concrete implementations are
//! wired together. Layers config as built-in defaults, an optional TOML
//! file, then environment-variable overrides; constructs the
//! SessionStore, Durable Sink, Gateway Registry (with plugin discovery),
//! TTS Registry, Profile Resolver, and Conversation Orchestrator in
//! dependency order.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;

use voicebridge_core::ports::SessionStorePort;
use voicebridge_db::DurableSink;
use voicebridge_gateway::{GatewayRegistry, OpenClawConfig, OpenClawGateway};
use voicebridge_normalize::SpeechNormalizer;
use voicebridge_orchestrator::{ApologyResponder, ConversationOrchestrator, FallbackChain};
use voicebridge_profile::ProfileResolver;
use voicebridge_session::FileSessionStore;
use voicebridge_tts::config_overlay;
use voicebridge_tts::providers::{HttpTtsConfig, HttpTtsProvider, LocalSilenceProvider};
use voicebridge_tts::TtsRegistry;

use crate::side_channel::SideChannel;

const SESSION_PREFIX: &str = "voice-main";

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    #[default]
    AllowAll,
    AllowOrigins(Vec<String>),
}

/// Layered server configuration (§4.12).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    pub plugins_dir: PathBuf,
    pub cors: CorsConfig,
}

/// Optional TOML overlay, every field defaulted so a partial file is
/// valid.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    port: Option<u16>,
    data_dir: Option<PathBuf>,
    plugins_dir: Option<PathBuf>,
}

impl ServerConfig {
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            port: 8080,
            data_dir: PathBuf::from("./data"),
            plugins_dir: PathBuf::from("./plugins"),
            cors: CorsConfig::default(),
        }
    }

    /// Defaults, overlaid by `VOICEBRIDGE_CONFIG_FILE` (or `./voicebridge.toml`
    /// if unset and present), overlaid by individual env var overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::with_defaults();

        let file_path = std::env::var("VOICEBRIDGE_CONFIG_FILE")
            .unwrap_or_else(|_| "voicebridge.toml".to_string());
        if let Ok(raw) = std::fs::read_to_string(&file_path) {
            let file_cfg: FileConfig =
                toml::from_str(&raw).with_context(|| format!("parsing {file_path}"))?;
            if let Some(port) = file_cfg.port {
                cfg.port = port;
            }
            if let Some(data_dir) = file_cfg.data_dir {
                cfg.data_dir = data_dir;
            }
            if let Some(plugins_dir) = file_cfg.plugins_dir {
                cfg.plugins_dir = plugins_dir;
            }
        }

        if let Ok(v) = std::env::var("VOICEBRIDGE_PORT") {
            cfg.port = v.parse().context("VOICEBRIDGE_PORT must be a u16")?;
        }
        if let Ok(v) = std::env::var("VOICEBRIDGE_DATA_DIR") {
            cfg.data_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("VOICEBRIDGE_PLUGINS_DIR") {
            cfg.plugins_dir = PathBuf::from(v);
        }

        Ok(cfg)
    }

    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.cors = CorsConfig::AllowOrigins(origins);
        self
    }
}

/// Application context: every shared service a handler might need.
pub struct AxumContext {
    pub session_store: Arc<dyn SessionStorePort>,
    pub gateways: Arc<GatewayRegistry>,
    pub tts: Arc<TtsRegistry>,
    pub profiles: Arc<ProfileResolver>,
    pub orchestrator: Arc<ConversationOrchestrator>,
    pub side_channel: Arc<SideChannel>,
    pub session_prefix: String,
}

/// Builds the optional cloud REST TTS provider from `CLOUD_TTS_*` env vars,
/// resolved through the same static-config + env-overlay path a plugin's
/// file-provided config would go through. Absent `CLOUD_TTS_BASE_URL`, no
/// cloud provider is registered and only the local fallback is available.
fn build_cloud_tts_provider() -> Option<HttpTtsProvider> {
    let base_url = std::env::var("CLOUD_TTS_BASE_URL").ok().filter(|s| !s.is_empty())?;

    let mut static_config = std::collections::HashMap::new();
    static_config.insert("id".to_string(), serde_json::Value::String("cloud".to_string()));
    static_config.insert("base_url".to_string(), serde_json::Value::String(base_url));
    static_config.insert(
        "api_key".to_string(),
        serde_json::Value::String("${CLOUD_TTS_API_KEY}".to_string()),
    );
    static_config.insert(
        "priority".to_string(),
        serde_json::Value::Number(
            std::env::var("CLOUD_TTS_PRIORITY").ok().and_then(|v| v.parse::<i64>().ok()).unwrap_or(50).into(),
        ),
    );

    let resolved = config_overlay::build_config(&static_config, None);
    let id = resolved.get("id")?.as_str()?.to_string();
    let base_url = resolved.get("base_url")?.as_str()?.to_string();
    let api_key = resolved
        .get("api_key")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty() && !s.starts_with("${"))
        .map(str::to_string);
    let priority = resolved.get("priority").and_then(serde_json::Value::as_i64).unwrap_or(50) as i32;

    if api_key.is_none() {
        tracing::warn!("CLOUD_TTS_BASE_URL set but CLOUD_TTS_API_KEY missing — cloud TTS provider not registered");
        return None;
    }

    Some(HttpTtsProvider::new(HttpTtsConfig {
        id,
        base_url,
        api_key,
        voices: Vec::new(),
        priority,
        format: voicebridge_core::AudioFormat::Mp3,
        sample_rate: 24_000,
    }))
}

/// Wires every component into one shared context, in dependency order.
pub async fn bootstrap(config: ServerConfig) -> Result<AxumContext> {
    tokio::fs::create_dir_all(&config.data_dir)
        .await
        .with_context(|| format!("creating data dir {}", config.data_dir.display()))?;

    let profiles_dir = config.data_dir.join("profiles");
    tokio::fs::create_dir_all(&profiles_dir)
        .await
        .with_context(|| format!("creating profiles dir {}", profiles_dir.display()))?;

    let counter_path = config.data_dir.join("session_counter.txt");
    let db_path = config.data_dir.join("voicebridge.db");
    let active_pointer = config.data_dir.join("active_profile");
    let speech_norm_path = config.data_dir.join("speech_normalization.toml");

    let session_store: Arc<dyn SessionStorePort> = Arc::new(FileSessionStore::new(counter_path));

    let pool = voicebridge_db::setup_database(&db_path)
        .await
        .with_context(|| format!("opening database {}", db_path.display()))?;
    let sink = DurableSink::spawn(pool);

    let gateways = Arc::new(GatewayRegistry::new());
    let openclaw_config = OpenClawConfig {
        ws_url: std::env::var("OPENCLAW_WS_URL").unwrap_or_default(),
        auth_token: std::env::var("OPENCLAW_AUTH_TOKEN").ok(),
        client_id: std::env::var("OPENCLAW_CLIENT_ID").unwrap_or_else(|_| "voicebridge".to_string()),
    };
    gateways.register(Arc::new(OpenClawGateway::new(openclaw_config))).await;
    gateways.load_plugins(&config.plugins_dir).await;

    let tts = Arc::new(TtsRegistry::new());
    tts.register(Arc::new(LocalSilenceProvider::default())).await;
    if let Some(cloud) = build_cloud_tts_provider() {
        tts.register(Arc::new(cloud)).await;
    }
    tts.set_default("local").await;

    let normalizer = Arc::new(SpeechNormalizer::new(speech_norm_path));
    let profiles = Arc::new(ProfileResolver::new(profiles_dir, active_pointer));

    let fallback = Arc::new(FallbackChain::new(vec![Arc::new(ApologyResponder::default())]));

    let orchestrator = Arc::new(ConversationOrchestrator::new(
        session_store.clone(),
        gateways.clone(),
        tts.clone(),
        normalizer.clone(),
        profiles.clone(),
        sink,
        fallback,
        SESSION_PREFIX,
    ));

    Ok(AxumContext {
        session_store,
        gateways,
        tts,
        profiles,
        orchestrator,
        side_channel: Arc::new(SideChannel::new()),
        session_prefix: SESSION_PREFIX.to_string(),
    })
}

/// Bootstraps the context and starts serving on `config.port`.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    let cors = config.cors.clone();
    let ctx = bootstrap(config.clone()).await?;
    let app = crate::routes::create_router(ctx, &cors);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    tracing::info!("voicebridge web server listening on http://{addr}");
    axum::serve(listener, app).await.context("serving")?;
    Ok(())
}
