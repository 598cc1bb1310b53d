use thiserror::Error;

use crate::repository::errors::RepositoryError;

pub mod persist;
pub mod pricing;
pub mod refresh;
pub mod sweeper;

/// Result type returned by the service layer.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced to route handlers.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A requested record or spot price does not exist.
    #[error("not found")]
    NotFound,
    /// A repository failure other than a missing record.
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ServiceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => ServiceError::NotFound,
            other => ServiceError::Repository(other),
        }
    }
}
