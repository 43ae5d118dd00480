//! Request payloads accepted by the session routes and the `join` event.

use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;

pub mod session;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid username: {0}")]
    InvalidUsername(TypeConstraintError),
}
