//! Error conversion glue between layers.
//!
//! The domain layer must not depend on service or form error types, so the
//! conversions into [`ServiceError`] live here.

use crate::domain::types::TypeConstraintError;
use crate::forms::FormError;
use crate::services::ServiceError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(val.to_string())
    }
}

impl From<FormError> for ServiceError {
    fn from(val: FormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}
