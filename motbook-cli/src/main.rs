//! motbook
//!
//! Terminal front end for booking MOT inspections: availability lookup,
//! booking with payment, and the admin tools.

mod commands;
mod config;
mod render;
mod shutdown;
mod state;

use clap::Parser;
use commands::Command;
use config::ConfigLoader;
use state::AppState;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

/// motbook - Book MOT inspections from the terminal
#[derive(Parser, Debug)]
#[command(name = "motbook")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./motbook.toml")]
    config: PathBuf,

    /// Override the backend URL (e.g., http://localhost:5000)
    #[arg(long, env = "MOTBOOK_API_URL")]
    api_url: Option<Url>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    tracing::debug!("Starting motbook v{}", env!("CARGO_PKG_VERSION"));

    let config_loader = ConfigLoader::new(&args.config, args.api_url);
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::debug!(
        base_url = %loaded_config.api.base_url,
        "Configuration loaded from {:?}",
        args.config
    );

    let state = AppState::new(loaded_config).map_err(|e| {
        tracing::error!("Failed to build HTTP clients: {}", e);
        e
    })?;
    let result = commands::dispatch(&state, args.command).await;

    // Flush pending notifications before reporting the result.
    state.finish().await;
    result
}

/// Initialize the tracing subscriber with environment-based filtering.
///
/// Logs go to stderr so they never interleave with command output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,motbook_core=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
