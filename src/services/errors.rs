use thiserror::Error;

use crate::domain::validation::ValidationReport;

/// Generic error type used by service layer functions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// Requested resource was not found.
    #[error("not found")]
    NotFound,
    /// The operation conflicts with existing records.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Submitted values violate field rules.
    #[error("{0}")]
    Validation(ValidationReport),
    /// A submitted form could not be parsed.
    #[error("{0}")]
    Form(String),
    /// A value failed a domain type constraint.
    #[error("invalid value: {0}")]
    TypeConstraint(String),
    /// An unexpected internal error occurred.
    #[error("internal error")]
    Internal,
}

/// Convenient alias for results returned from service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;
