use async_trait::async_trait;
use tokio::sync::watch;

use super::ClientError;
use crate::auth::jwt::peek_claims;
use crate::auth::UserIdentity;

/// A signed-in session: the bearer token plus who it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub user: UserIdentity,
}

/// Client view of the identity provider. Changes are published on a watch
/// channel; `None` means signed out.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn subscribe(&self) -> watch::Receiver<Option<Session>>;

    fn current_session(&self) -> Option<Session> {
        self.subscribe().borrow().clone()
    }

    async fn sign_in(&self, access_token: &str) -> Result<Session, ClientError>;

    async fn sign_out(&self) -> Result<(), ClientError>;
}

/// Identity provider backed by an access token the user already holds,
/// e.g. one issued with `facts auth token`.
pub struct LocalIdentityProvider {
    sender: watch::Sender<Option<Session>>,
}

impl LocalIdentityProvider {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }
}

impl Default for LocalIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sender.subscribe()
    }

    async fn sign_in(&self, access_token: &str) -> Result<Session, ClientError> {
        let claims = peek_claims(access_token).map_err(|e| ClientError::Identity(e.reason().to_string()))?;
        let user = claims
            .into_identity()
            .map_err(|e| ClientError::Identity(e.reason().to_string()))?;

        let session = Session {
            access_token: access_token.to_string(),
            user,
        };
        self.sender.send_replace(Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), ClientError> {
        self.sender.send_replace(None);
        Ok(())
    }
}
