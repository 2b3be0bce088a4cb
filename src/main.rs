use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use facts_api::app::{self, AppState};
use facts_api::config::{self, AuthMode};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, AUTH_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("facts_api=info,tower_http=info")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    info!("Starting Facts API in {:?} mode", config.environment);
    if facts_api::is_production!() && config.security.auth_mode == AuthMode::Jwt {
        warn!("Production is verifying tokens locally; set AUTH_MODE=remote to use session introspection");
    }

    let state = AppState::from_config(config).await?;
    let app = app::router(state, config);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Facts API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server")?;
    Ok(())
}
