use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::{any, get},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::auth::{build_verifier, TokenVerifier};
use crate::config::{AppConfig, SecurityConfig, StoreBackend};
use crate::database::{DatabaseManager, FactStore, MemoryFactStore, PgFactStore};
use crate::handlers;

/// Collaborators shared by every request. Requests never mutate it.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<dyn TokenVerifier>,
    pub store: Arc<dyn FactStore>,
}

impl AppState {
    pub fn new(verifier: Arc<dyn TokenVerifier>, store: Arc<dyn FactStore>) -> Self {
        Self { verifier, store }
    }

    /// Wire the verifier and store selected by configuration
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let verifier = build_verifier(&config.security)
            .map_err(|e| anyhow::anyhow!("Failed to initialize token verifier: {}", e.reason()))?;
        info!("Token verification mode: {:?}", config.security.auth_mode);

        let store: Arc<dyn FactStore> = match config.database.backend {
            StoreBackend::Postgres => {
                let manager = DatabaseManager::connect(&config.database).await?;
                manager.ensure_schema().await?;
                Arc::new(PgFactStore::new(manager.pool().clone(), config.api.facts_page_size))
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory fact store; facts are lost on restart");
                Arc::new(MemoryFactStore::new(config.api.facts_page_size))
            }
        };

        Ok(Self::new(verifier, store))
    }
}

pub fn router(state: AppState, config: &AppConfig) -> Router {
    let mut app = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Facts API; handlers check the method themselves so 405 wins over 401
        .route("/api/getFacts", any(handlers::facts::list_facts))
        .route("/api/saveFact", any(handlers::facts::save_fact))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    if config.security.enable_cors {
        app = app.layer(cors_layer(&config.security));
    }
    if config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }

    app.with_state(state)
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Facts API",
        "version": version,
        "endpoints": {
            "health": "GET /health (public)",
            "list": "GET /api/getFacts (bearer token)",
            "save": "POST /api/saveFact (bearer token)",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}
