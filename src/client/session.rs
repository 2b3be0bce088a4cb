use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

use super::{ClientError, FactsApi, GenerationError, IdentityProvider, Session, TextGenerator};
use crate::auth::UserIdentity;
use crate::database::{Fact, FactText};

/// Snapshot of what the client currently shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<UserIdentity>,
    pub facts: Vec<Fact>,
    /// Text waiting to be saved, typed or generated
    pub draft: String,
    pub generating: bool,
}

#[derive(Default)]
struct Inner {
    view: SessionState,
    /// Bumped on every identity change; work started under an older epoch
    /// must not write into the view.
    epoch: u64,
}

/// Owns the client session: reacts to identity changes, attaches the bearer
/// token to data calls, and keeps the local fact list in step with the server.
pub struct SessionController {
    identity: Arc<dyn IdentityProvider>,
    api: Arc<dyn FactsApi>,
    generator: Option<Arc<dyn TextGenerator>>,
    inner: Arc<RwLock<Inner>>,
    inflight: Mutex<Option<JoinHandle<()>>>,
}

impl SessionController {
    pub fn new(identity: Arc<dyn IdentityProvider>, api: Arc<dyn FactsApi>) -> Self {
        Self {
            identity,
            api,
            generator: None,
            inner: Arc::new(RwLock::new(Inner::default())),
            inflight: Mutex::new(None),
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub async fn state(&self) -> SessionState {
        self.inner.read().await.view.clone()
    }

    /// Follow the identity provider until it goes away. Each notification is
    /// handled by [`Self::on_identity_change`].
    pub fn listen(self: &Arc<Self>) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        let mut changes = self.identity.subscribe();

        tokio::spawn(async move {
            let initial = changes.borrow_and_update().clone();
            controller.on_identity_change(initial).await;

            while changes.changed().await.is_ok() {
                let session = changes.borrow_and_update().clone();
                controller.on_identity_change(session).await;
            }
            tracing::debug!("Identity provider closed; session listener stopped");
        })
    }

    pub async fn sign_in(&self, access_token: &str) -> Result<UserIdentity, ClientError> {
        let session = self.identity.sign_in(access_token).await?;
        let user = session.user.clone();
        self.on_identity_change(Some(session)).await;
        Ok(user)
    }

    pub async fn sign_out(&self) -> Result<(), ClientError> {
        self.identity.sign_out().await?;
        self.on_identity_change(None).await;
        Ok(())
    }

    /// Apply an identity notification.
    ///
    /// A new user (absent → present, or a different user) cancels any
    /// in-flight fetch and starts exactly one new one. The same user with a
    /// refreshed token changes nothing. Signing out clears the view.
    pub async fn on_identity_change(&self, session: Option<Session>) {
        let mut inflight = self.inflight.lock().await;
        let mut inner = self.inner.write().await;

        let same_user = match (&inner.view.user, &session) {
            (Some(current), Some(next)) => current.id == next.user.id,
            (None, None) => true,
            _ => false,
        };
        if same_user {
            return;
        }

        inner.epoch += 1;
        if let Some(previous) = inflight.take() {
            previous.abort();
        }

        match session {
            Some(session) => {
                tracing::info!("Signed in as {}", session.user.id);
                inner.view = SessionState {
                    user: Some(session.user.clone()),
                    ..SessionState::default()
                };
                *inflight = Some(self.spawn_fetch(session, inner.epoch));
            }
            None => {
                tracing::info!("Signed out");
                inner.view = SessionState::default();
            }
        }
    }

    fn spawn_fetch(&self, session: Session, epoch: u64) -> JoinHandle<()> {
        let api = Arc::clone(&self.api);
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            match api.list_facts(&session.access_token).await {
                Ok(facts) => {
                    let mut inner = inner.write().await;
                    if inner.epoch == epoch {
                        inner.view.facts = facts;
                    } else {
                        tracing::debug!("Discarding facts fetched for a previous session");
                    }
                }
                Err(e) => tracing::error!("Error fetching facts: {}", e),
            }
        })
    }

    /// Wait for the current background fetch, if any, to finish
    pub async fn settled(&self) {
        let handle = self.inflight.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    tracing::error!("Fact fetch task failed: {}", e);
                }
            }
        }
    }

    /// Fetch the list now. Without a session nothing is sent.
    pub async fn refresh_facts(&self) -> Result<Vec<Fact>, ClientError> {
        let session = self.identity.current_session().ok_or(ClientError::NotSignedIn)?;
        let epoch = self.inner.read().await.epoch;

        let facts = self.api.list_facts(&session.access_token).await.map_err(|e| {
            tracing::error!("Error fetching facts: {}", e);
            e
        })?;

        let mut inner = self.inner.write().await;
        if inner.epoch == epoch {
            inner.view.facts = facts.clone();
        }
        Ok(facts)
    }

    /// Save `text` and append the stored fact to the local list
    pub async fn save_fact(&self, text: &str) -> Result<Fact, ClientError> {
        let session = self.identity.current_session().ok_or(ClientError::NotSignedIn)?;
        let fact_text = FactText::new(text).map_err(|_| ClientError::EmptyFact)?;
        let epoch = self.inner.read().await.epoch;

        let fact = self.api.save_fact(&session.access_token, &fact_text).await.map_err(|e| {
            tracing::error!("Error saving fact: {}", e);
            e
        })?;

        // A list fetch still in flight would replace the view with a snapshot
        // that may predate this insert, so let it land first.
        self.settled().await;

        let mut inner = self.inner.write().await;
        if inner.epoch == epoch {
            if !inner.view.facts.iter().any(|f| f.id == fact.id) {
                inner.view.facts.push(fact.clone());
            }
            inner.view.draft.clear();
        }
        Ok(fact)
    }

    pub async fn set_draft(&self, text: impl Into<String>) {
        self.inner.write().await.view.draft = text.into();
    }

    pub async fn save_draft(&self) -> Result<Fact, ClientError> {
        let draft = self.inner.read().await.view.draft.clone();
        self.save_fact(&draft).await
    }

    /// Ask the generator for a fact and make it the draft. The draft is left
    /// untouched when generation fails.
    ///
    /// Generation runs on its own task, so `generating` is cleared even when
    /// the caller stops waiting.
    pub async fn generate_draft(&self, prompt: &str) -> Result<String, ClientError> {
        let generator = Arc::clone(self.generator.as_ref().ok_or(ClientError::NoGenerator)?);
        let inner = Arc::clone(&self.inner);
        let prompt = prompt.to_string();

        self.inner.write().await.view.generating = true;
        let task = tokio::spawn(async move {
            let result = generator.generate(&prompt).await;

            let mut inner = inner.write().await;
            inner.view.generating = false;
            if let Ok(text) = &result {
                inner.view.draft = text.clone();
            }
            result
        });

        match task.await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => {
                tracing::error!("Error generating fact: {}", e);
                Err(e.into())
            }
            Err(e) => {
                tracing::error!("Generation task failed: {}", e);
                Err(GenerationError::Request(e.to_string()).into())
            }
        }
    }
}
