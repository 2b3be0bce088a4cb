use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::{AuthMode, SecurityConfig};

pub mod jwt;
pub mod remote;

pub use jwt::{issue_token, Claims, JwtVerifier, TokenError};
pub use remote::RemoteVerifier;

/// Identity resolved from a verified bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Identity provider subject id; owns every fact written under it
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// The single failure kind a verifier reports. The reason is for server logs only.
#[derive(Debug, Error)]
#[error("authentication failed: {reason}")]
pub struct AuthError {
    reason: String,
}

impl AuthError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Resolves a bearer token to the user it was issued for.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<UserIdentity, AuthError>;
}

/// Build the verifier selected by `AUTH_MODE`
pub fn build_verifier(security: &SecurityConfig) -> Result<Arc<dyn TokenVerifier>, AuthError> {
    match security.auth_mode {
        AuthMode::Jwt => {
            let verifier = JwtVerifier::new(&security.jwt_secret, security.jwt_audience.as_deref())?;
            Ok(Arc::new(verifier))
        }
        AuthMode::Remote => {
            let url = security
                .provider_url
                .as_deref()
                .ok_or_else(|| AuthError::new("AUTH_PROVIDER_URL not configured"))?;
            let verifier = RemoteVerifier::new(
                url,
                security.provider_api_key.clone(),
                Duration::from_secs(security.provider_timeout_secs),
            )?;
            Ok(Arc::new(verifier))
        }
    }
}
