use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuthError, TokenVerifier, UserIdentity};

/// Claims carried by identity provider access tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, email: Option<String>, audience: Option<String>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id.to_string(),
            aud: audience,
            email,
            role: Some("authenticated".to_string()),
            exp,
            iat: now.timestamp(),
        }
    }

    pub fn into_identity(self) -> Result<UserIdentity, AuthError> {
        let id = Uuid::parse_str(&self.sub)
            .map_err(|_| AuthError::new(format!("subject '{}' is not a UUID", self.sub)))?;

        Ok(UserIdentity {
            id,
            email: self.email,
            role: self.role,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,
}

/// Sign a developer token the same way the identity provider would
pub fn issue_token(secret: &str, claims: &Claims) -> Result<String, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::new(Algorithm::HS256);

    encode(&header, claims, &encoding_key).map_err(|e| TokenError::TokenGeneration(e.to_string()))
}

/// Local HS256 verification against the identity provider's signing secret
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str, audience: Option<&str>) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::new("JWT secret not configured"));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Ok(Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }
}

#[async_trait]
impl TokenVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<UserIdentity, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthError::new(format!("Invalid JWT token: {}", e)))?;

        token_data.claims.into_identity()
    }
}

/// Read claims without checking the signature. Clients use this to learn who
/// they are signed in as; servers must go through [`JwtVerifier`].
pub fn peek_claims(token: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_aud = false;

    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| AuthError::new(format!("Unreadable token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    fn token_for(user_id: Uuid, audience: Option<&str>, expiry_hours: u64) -> String {
        let claims = Claims::new(user_id, Some("a@example.com".into()), audience.map(String::from), expiry_hours);
        issue_token(SECRET, &claims).unwrap()
    }

    #[tokio::test]
    async fn accepts_token_signed_with_shared_secret() {
        let user_id = Uuid::new_v4();
        let verifier = JwtVerifier::new(SECRET, Some("authenticated")).unwrap();

        let identity = verifier.verify(&token_for(user_id, Some("authenticated"), 1)).await.unwrap();
        assert_eq!(identity.id, user_id);
        assert_eq!(identity.email.as_deref(), Some("a@example.com"));
    }

    #[tokio::test]
    async fn rejects_token_signed_with_other_secret() {
        let claims = Claims::new(Uuid::new_v4(), None, None, 1);
        let token = issue_token("some-other-secret", &claims).unwrap();
        let verifier = JwtVerifier::new(SECRET, None).unwrap();

        assert!(verifier.verify(&token).await.is_err());
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let mut claims = Claims::new(Uuid::new_v4(), None, None, 1);
        claims.exp = Utc::now().timestamp() - 3600;
        let token = issue_token(SECRET, &claims).unwrap();
        let verifier = JwtVerifier::new(SECRET, None).unwrap();

        assert!(verifier.verify(&token).await.is_err());
    }

    #[tokio::test]
    async fn rejects_audience_mismatch() {
        let verifier = JwtVerifier::new(SECRET, Some("authenticated")).unwrap();
        let token = token_for(Uuid::new_v4(), Some("anon"), 1);

        assert!(verifier.verify(&token).await.is_err());
    }

    #[tokio::test]
    async fn rejects_non_uuid_subject() {
        let mut claims = Claims::new(Uuid::new_v4(), None, None, 1);
        claims.sub = "not-a-uuid".to_string();
        let token = issue_token(SECRET, &claims).unwrap();
        let verifier = JwtVerifier::new(SECRET, None).unwrap();

        let err = verifier.verify(&token).await.unwrap_err();
        assert!(err.reason().contains("not a UUID"));
    }

    #[tokio::test]
    async fn rejects_garbage() {
        let verifier = JwtVerifier::new(SECRET, None).unwrap();
        assert!(verifier.verify("not.a.jwt").await.is_err());
    }

    #[test]
    fn refuses_to_issue_without_secret() {
        let claims = Claims::new(Uuid::new_v4(), None, None, 1);
        assert!(matches!(issue_token("", &claims), Err(TokenError::InvalidSecret)));
    }

    #[test]
    fn peek_reads_claims_without_the_secret() {
        let user_id = Uuid::new_v4();
        let claims = peek_claims(&token_for(user_id, Some("authenticated"), 1)).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
    }
}
