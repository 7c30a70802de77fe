use anyhow::Context;
use tracing_subscriber::EnvFilter;

use parc_edge::app::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up PARC_API_URL and friends
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("parc_edge=info,tower_http=info")),
        )
        .init();

    let config = parc_edge::config::config().clone();
    tracing::info!("Starting parc edge in {:?} mode", config.environment);
    tracing::info!("Identity backend: {}", config.api.base_url);

    let port = config.server.port;
    let state = AppState::new(config).context("invalid configuration")?;

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("parc edge listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
