use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;
use url::Url;

pub const DEFAULT_PROMPT: &str = "Provide an interesting fact about the Earth.";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Request(String),

    #[error("generation timed out")]
    Timeout,

    #[error("generation backend returned {0}")]
    Status(u16),

    #[error("generation backend returned no text")]
    Empty,
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GenerationError::Timeout
        } else {
            GenerationError::Request(err.to_string())
        }
    }
}

/// Opaque prompt → text capability
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Posts `{"prompt", "response_type": "text"}` to an HTTP endpoint
pub struct HttpTextGenerator {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpTextGenerator {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, GenerationError> {
        let endpoint = Url::parse(endpoint).map_err(|e| GenerationError::Request(e.to_string()))?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, endpoint })
    }
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&json!({ "prompt": prompt, "response_type": "text" }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        extract_text(&body).ok_or(GenerationError::Empty)
    }
}

/// Accept a bare text body, a JSON string, or `{"text": ...}`
fn extract_text(body: &str) -> Option<String> {
    let text = match serde_json::from_str::<Value>(body) {
        Ok(Value::String(s)) => s,
        Ok(Value::Object(map)) => map.get("text")?.as_str()?.to_string(),
        _ => body.to_string(),
    };

    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
