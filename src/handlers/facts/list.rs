use axum::{
    extract::State,
    http::{HeaderMap, Method},
};

use crate::app::AppState;
use crate::database::Fact;
use crate::error::ApiError;
use crate::middleware::{authenticate, ApiResponse, ApiResult};

/// GET /api/getFacts - the caller's most recent facts
///
/// Output (200): JSON array of at most ten facts, newest first:
/// ```json
/// [{ "id": 3, "factText": "...", "createdAt": "2025-01-01T00:00:00Z", "userId": "<uuid>" }]
/// ```
/// Errors: 401 `{"error":"Authentication failed"}`, 405 with `Allow: GET`,
/// 500 `{"error":"Error fetching facts"}`.
pub async fn list_facts(State(state): State<AppState>, method: Method, headers: HeaderMap) -> ApiResult<Vec<Fact>> {
    super::require_method(&method, Method::GET)?;

    let user = authenticate(state.verifier.as_ref(), &headers).await?;

    let facts = state.store.list_recent(user.id).await.map_err(|e| {
        tracing::error!("Error fetching facts for user {}: {}", user.id, e);
        ApiError::internal_server_error("Error fetching facts")
    })?;

    Ok(ApiResponse::success(facts))
}
