//! Error type shared by every repository implementation.

use diesel::r2d2::{Error as R2D2Error, PoolError};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use crate::domain::types::TypeConstraintError;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found")]
    NotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<DieselError> for RepositoryError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => RepositoryError::NotFound,

            DieselError::DatabaseError(kind, info) => {
                let message = info.message().to_string();
                let constraint = match kind {
                    DatabaseErrorKind::UniqueViolation => "Unique",
                    DatabaseErrorKind::ForeignKeyViolation => "Foreign key",
                    DatabaseErrorKind::NotNullViolation => "Not null",
                    DatabaseErrorKind::CheckViolation => "Check",
                    _ => return RepositoryError::DatabaseError(message),
                };
                RepositoryError::ConstraintViolation(format!(
                    "{constraint} constraint violation: {message}"
                ))
            }

            DieselError::SerializationError(e) => {
                RepositoryError::ValidationError(format!("Serialization error: {e}"))
            }

            DieselError::DeserializationError(e) => {
                RepositoryError::ValidationError(format!("Deserialization error: {e}"))
            }

            DieselError::RollbackTransaction
            | DieselError::AlreadyInTransaction
            | DieselError::NotInTransaction
            | DieselError::BrokenTransactionManager => {
                RepositoryError::DatabaseError(format!("Transaction error: {err}"))
            }

            _ => RepositoryError::Unexpected(format!("Unexpected diesel error: {err}")),
        }
    }
}

impl From<R2D2Error> for RepositoryError {
    fn from(err: R2D2Error) -> Self {
        RepositoryError::ConnectionError(format!("Connection error: {err}"))
    }
}

impl From<PoolError> for RepositoryError {
    fn from(err: PoolError) -> Self {
        RepositoryError::ConnectionError(format!("Connection error: {err}"))
    }
}

impl From<TypeConstraintError> for RepositoryError {
    fn from(err: TypeConstraintError) -> Self {
        RepositoryError::ValidationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_directly() {
        assert!(matches!(
            RepositoryError::from(DieselError::NotFound),
            RepositoryError::NotFound
        ));
    }

    #[test]
    fn constraint_errors_become_validation_errors() {
        let err = RepositoryError::from(TypeConstraintError::InvalidUuid);
        assert_eq!(err.to_string(), "Validation error: invalid uuid value");
    }
}
