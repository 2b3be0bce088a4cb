use async_trait::async_trait;
use reqwest::Response;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use super::ClientError;
use crate::database::{Fact, FactText};

/// The two facts endpoints, as seen from a client holding a bearer token
#[async_trait]
pub trait FactsApi: Send + Sync {
    async fn list_facts(&self, access_token: &str) -> Result<Vec<Fact>, ClientError>;
    async fn save_fact(&self, access_token: &str, fact_text: &FactText) -> Result<Fact, ClientError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct FactsClient {
    http: reqwest::Client,
    base_url: Url,
}

impl FactsClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        Ok(Self { http, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))
    }

    /// Turn a non-2xx response into `ClientError::Status`, keeping the server's message
    async fn check(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
        };
        Err(ClientError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl FactsApi for FactsClient {
    async fn list_facts(&self, access_token: &str) -> Result<Vec<Fact>, ClientError> {
        let response = self
            .http
            .get(self.endpoint("/api/getFacts")?)
            .bearer_auth(access_token)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn save_fact(&self, access_token: &str, fact_text: &FactText) -> Result<Fact, ClientError> {
        let response = self
            .http
            .post(self.endpoint("/api/saveFact")?)
            .bearer_auth(access_token)
            .json(&json!({ "factText": fact_text.as_str() }))
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }
}
