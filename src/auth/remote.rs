use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;
use uuid::Uuid;

use super::{AuthError, TokenVerifier, UserIdentity};

/// User record returned by the provider's `GET /auth/v1/user` endpoint
#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

/// Session introspection against the identity provider
pub struct RemoteVerifier {
    client: reqwest::Client,
    user_url: Url,
    api_key: Option<String>,
}

impl RemoteVerifier {
    pub fn new(provider_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self, AuthError> {
        let mut base = Url::parse(provider_url)
            .map_err(|e| AuthError::new(format!("Invalid identity provider URL: {}", e)))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let user_url = base
            .join("auth/v1/user")
            .map_err(|e| AuthError::new(format!("Invalid identity provider URL: {}", e)))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::new(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, user_url, api_key })
    }

    pub fn user_url(&self) -> &Url {
        &self.user_url
    }
}

#[async_trait]
impl TokenVerifier for RemoteVerifier {
    async fn verify(&self, token: &str) -> Result<UserIdentity, AuthError> {
        let mut request = self.client.get(self.user_url.clone()).bearer_auth(token);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AuthError::new(format!("Identity provider unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::new(format!("Identity provider rejected token with {}", status)));
        }

        let user: ProviderUser = response
            .json()
            .await
            .map_err(|e| AuthError::new(format!("Unexpected identity provider response: {}", e)))?;

        tracing::debug!("Identity provider resolved user {}", user.id);

        Ok(UserIdentity {
            id: user.id,
            email: user.email,
            role: user.role,
        })
    }
}
