pub mod auth;
pub mod response;

pub use auth::{authenticate, extract_bearer_token, AUTHENTICATION_FAILED};
pub use response::{ApiResponse, ApiResult};
