use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use everywhere::api::{AppState, create_router};
use everywhere::config::Config;

#[derive(Parser, Debug)]
#[command(name = "everywhere", about = "Everywhere Digital School web server")]
struct Cli {
    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory holding the HTML pages and public assets (overrides PUBLIC_DIR)
    #[arg(long)]
    public_dir: Option<PathBuf>,

    /// Directory served under /brand (overrides BRAND_DIR)
    #[arg(long)]
    brand_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber (handles both tracing and log crate)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(dir) = cli.public_dir {
        config.public_dir = dir;
    }
    if let Some(dir) = cli.brand_dir {
        config.brand_dir = dir;
    }

    if config.perplexity_api_key.is_empty() {
        tracing::warn!("PERPLEXITY_API_KEY is not set, upstream calls will be rejected");
    }
    if config.expose_perplexity_key {
        tracing::warn!("EXPOSE_PERPLEXITY_KEY is enabled, /api/config hands out the Perplexity key");
    }

    let port = config.port;
    let app = create_router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("Everywhere Digital School server running at http://localhost:{port}");
    axum::serve(listener, app).await?;

    Ok(())
}
