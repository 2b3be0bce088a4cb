use axum::http::{header, HeaderMap};

use crate::auth::{AuthError, TokenVerifier, UserIdentity};
use crate::error::ApiError;

/// Public message for every authentication failure
pub const AUTHENTICATION_FAILED: &str = "Authentication failed";

/// Verify the request's bearer token and return the caller's identity.
///
/// Missing headers, malformed headers and rejected tokens all collapse into
/// the same 401; the specific reason only goes to the log.
pub async fn authenticate(verifier: &dyn TokenVerifier, headers: &HeaderMap) -> Result<UserIdentity, ApiError> {
    let result = match extract_bearer_token(headers) {
        Ok(token) => verifier.verify(token).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(user) => {
            tracing::debug!("Authenticated user {}", user.id);
            Ok(user)
        }
        Err(e) => {
            tracing::warn!("Authentication failed: {}", e.reason());
            Err(ApiError::unauthorized(AUTHENTICATION_FAILED))
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AuthError::new("Missing Authorization header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::new("Invalid Authorization header format"))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        Some(_) => Err(AuthError::new("Empty bearer token")),
        None => Err(AuthError::new("Authorization header must use Bearer token format")),
    }
}
