// handlers/facts/mod.rs - Facts endpoints
//
// GET  /api/getFacts  → list.rs
// POST /api/saveFact  → save.rs

use axum::http::Method;

use crate::error::ApiError;

pub mod list;
pub mod save;

pub use list::list_facts;
pub use save::save_fact;

/// Reject any verb other than `allowed`; the 405 advertises it in `Allow`
pub(crate) fn require_method(method: &Method, allowed: Method) -> Result<(), ApiError> {
    if *method == allowed {
        Ok(())
    } else {
        tracing::debug!("Rejected {} where only {} is allowed", method, allowed);
        Err(ApiError::method_not_allowed(method.clone(), allowed))
    }
}
