use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use catalog_api::config::{AppConfig, StoreBackend};
use catalog_api::server;

#[derive(Parser)]
#[command(name = "catalog-api")]
#[command(about = "Product catalog REST API")]
#[command(version)]
struct Cli {
    #[arg(long, help = "Interface to bind (overrides HOST)")]
    host: Option<String>,

    #[arg(long, help = "First port to try (overrides PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Storage backend: memory or postgres (overrides STORE_BACKEND)")]
    store: Option<StoreBackend>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::from_env().context("failed to read configuration")?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(store) = cli.store {
        config.database.backend = store;
    }
    config.validate().context("invalid configuration")?;

    tracing::info!(
        "Starting catalog API in {:?} mode with {:?} store",
        config.environment,
        config.database.backend
    );

    let state = server::build_state(&config).await?;
    let app = server::app(state, &config);

    let listener = server::bind_with_retry(
        &config.server.host,
        config.server.port,
        config.server.port_attempts,
    )
    .await?;
    let addr = listener.local_addr()?;

    match &config.server.public_url {
        Some(url) => tracing::info!("Catalog API listening on {} ({})", addr, url),
        None => tracing::info!("Catalog API listening on http://{}", addr),
    }

    server::serve(listener, app).await
}
