use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use crate::domain::UnknownVariant;

/// Result alias used by every repository method.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Failures surfaced by the persistence layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The addressed row does not exist.
    #[error("record not found")]
    NotFound,
    /// A conditional write lost against the current state of the row.
    #[error("conflict: {0}")]
    Conflict(String),
    /// A domain rule checked inside the transaction was violated.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    /// A stored value could not be mapped back onto the domain.
    #[error("invalid stored data: {0}")]
    InvalidData(#[from] UnknownVariant),
    #[error("database error: {0}")]
    Database(DieselError),
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
}

impl From<DieselError> for RepositoryError {
    fn from(value: DieselError) -> Self {
        match value {
            DieselError::NotFound => RepositoryError::NotFound,
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                RepositoryError::Conflict(info.message().to_string())
            }
            DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, info) => {
                RepositoryError::ConstraintViolation(info.message().to_string())
            }
            other => RepositoryError::Database(other),
        }
    }
}
