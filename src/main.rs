//! Process entry point — the composition root (§4.12).
//!
//! Initializes logging, loads layered configuration, and starts the
//! Axum server. All actual service wiring lives in
//! `voicebridge_axum::bootstrap`; this binary only owns process-level
//! concerns (argv, env file loading, the tracing subscriber).

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use voicebridge_axum::ServerConfig;

#[derive(Parser, Debug)]
#[command(name = "voicebridge", about = "Voice-agent orchestration server")]
struct Cli {
    /// Override the listen port (same as VOICEBRIDGE_PORT).
    #[arg(long)]
    port: Option<u16>,

    /// Override the data directory (same as VOICEBRIDGE_DATA_DIR).
    #[arg(long)]
    data_dir: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = ServerConfig::load()?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    voicebridge_axum::start_server(config).await
}
