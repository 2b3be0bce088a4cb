use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

/// A persisted fact. Rows are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Fact {
    pub id: i32,
    pub fact_text: String,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("factText is required")]
pub struct EmptyFactText;

/// Fact text that has passed the non-blank check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactText(String);

impl FactText {
    pub fn new(text: impl Into<String>) -> Result<Self, EmptyFactText> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(EmptyFactText);
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
