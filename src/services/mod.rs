//! Business workflows shared by the HTTP routes and the socket lobby.

use thiserror::Error;

use crate::repository::errors::RepositoryError;

pub mod leaderboard;
pub mod players;
pub mod session;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Form(String),

    #[error("invalid value: {0}")]
    TypeConstraint(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
