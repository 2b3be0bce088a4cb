//! Client side of the facts service: identity, HTTP calls, text generation,
//! and the session controller that ties them together.

use thiserror::Error;

pub mod api;
pub mod generator;
pub mod identity;
pub mod session;

pub use api::{FactsApi, FactsClient};
pub use generator::{GenerationError, HttpTextGenerator, TextGenerator, DEFAULT_PROMPT};
pub use identity::{IdentityProvider, LocalIdentityProvider, Session};
pub use session::{SessionController, SessionState};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not signed in")]
    NotSignedIn,

    #[error("invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("sign-in failed: {0}")]
    Identity(String),

    #[error("fact text is empty")]
    EmptyFact,

    #[error("no text generator configured")]
    NoGenerator,

    #[error(transparent)]
    Generation(#[from] GenerationError),
}
