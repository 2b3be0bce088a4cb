use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, Method},
    Json,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::{Fact, FactText};
use crate::error::ApiError;
use crate::middleware::{authenticate, ApiResponse, ApiResult};

const FACT_TEXT_REQUIRED: &str = "factText is required";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveFactRequest {
    #[serde(default)]
    pub fact_text: Option<String>,
}

/// POST /api/saveFact - append a fact owned by the caller
///
/// Input: `{"factText": "string"}`. Output (201): the stored fact.
/// Errors: 400 `{"error":"factText is required"}`, 401, 405 with
/// `Allow: POST`, 500 `{"error":"Error saving fact"}`.
///
/// The body is captured as a `Result` so that method and token checks run
/// before body validation.
pub async fn save_fact(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    payload: Result<Json<SaveFactRequest>, JsonRejection>,
) -> ApiResult<Fact> {
    super::require_method(&method, Method::POST)?;

    let user = authenticate(state.verifier.as_ref(), &headers).await?;

    let fact_text = match payload {
        Ok(Json(SaveFactRequest { fact_text: Some(text) })) => FactText::new(text).ok(),
        Ok(_) => None,
        Err(rejection) => {
            tracing::warn!("Rejected saveFact body: {}", rejection);
            None
        }
    }
    .ok_or_else(|| ApiError::bad_request(FACT_TEXT_REQUIRED))?;

    let fact = state.store.insert(user.id, &fact_text).await.map_err(|e| {
        tracing::error!("Error saving fact for user {}: {}", user.id, e);
        ApiError::internal_server_error("Error saving fact")
    })?;

    tracing::info!("Saved fact {} for user {}", fact.id, user.id);
    Ok(ApiResponse::created(fact))
}
