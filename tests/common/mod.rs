#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use facts_api::app::{self, AppState};
use facts_api::auth::{issue_token, Claims, JwtVerifier, TokenVerifier};
use facts_api::config::AppConfig;
use facts_api::database::{Fact, FactStore, FactText, MemoryFactStore, StoreError};
use reqwest::StatusCode;
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-test-secret";
pub const AUDIENCE: &str = "authenticated";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub store: Arc<MemoryFactStore>,
}

impl TestServer {
    /// Start the router on a free port, backed by an in-memory store
    pub async fn spawn() -> Result<Self> {
        let store = Arc::new(MemoryFactStore::new(10));
        let verifier: Arc<dyn TokenVerifier> = Arc::new(JwtVerifier::new(JWT_SECRET, Some(AUDIENCE))?);
        let state = AppState::new(verifier, store.clone());

        let (port, base_url) = serve(state).await?;
        Ok(Self { port, base_url, store })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Serve `state` on a free port and wait until it answers
pub async fn serve(state: AppState) -> Result<(u16, String)> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let mut config = AppConfig::development();
    config.api.enable_request_logging = false;
    let router = app::router(state, &config);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    wait_ready(&base_url, Duration::from_secs(5)).await?;
    Ok((port, base_url))
}

async fn wait_ready(base_url: &str, timeout: Duration) -> Result<()> {
    let client = reqwest::Client::new();
    let deadline = Instant::now() + timeout;
    loop {
        if Instant::now() > deadline {
            break;
        }
        if let Ok(resp) = client.get(format!("{}/health", base_url)).send().await {
            if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                return Ok(());
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    anyhow::bail!("server did not become ready on {} within {:?}", base_url, timeout)
}

/// Token for `user_id` signed the way the identity provider signs them
pub fn token_for(user_id: Uuid) -> String {
    let claims = Claims::new(user_id, Some(format!("{}@example.com", user_id.simple())), Some(AUDIENCE.to_string()), 1);
    issue_token(JWT_SECRET, &claims).expect("failed to issue test token")
}

fn connection_refused() -> StoreError {
    StoreError::Sqlx(sqlx::Error::Io(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "connection refused by 10.0.0.5:5432",
    )))
}

/// Store whose every call fails, for exercising the 500 paths
pub struct BrokenStore;

#[async_trait]
impl FactStore for BrokenStore {
    async fn list_recent(&self, _user_id: Uuid) -> Result<Vec<Fact>, StoreError> {
        Err(connection_refused())
    }

    async fn insert(&self, _user_id: Uuid, _fact_text: &FactText) -> Result<Fact, StoreError> {
        Err(connection_refused())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(connection_refused())
    }
}
