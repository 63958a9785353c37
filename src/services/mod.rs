//! Business operations of the settings console.
//!
//! Services are generic over the repository traits so that routes stay thin
//! wrappers and unit tests can run against the in-memory repository.

use crate::domain::validation::{ValidationReport, ViolationKind};
use crate::repository::RepositoryError;

pub mod categories;
pub mod errors;
pub mod import_export;
pub mod service_types;
pub mod statuses;

pub use errors::{ServiceError, ServiceResult};

/// Logs a repository failure and maps it onto a [`ServiceError`].
///
/// Constraint violations surface as `Conflict`, missing rows as `NotFound`.
pub(crate) fn repository_failure(action: &str, err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::NotFound => ServiceError::NotFound,
        RepositoryError::ConstraintViolation(message) => {
            log::warn!("Failed to {action}: {message}");
            ServiceError::Conflict(message)
        }
        other => {
            log::error!("Failed to {action}: {other}");
            ServiceError::Internal
        }
    }
}

pub(crate) fn violation(
    field: &str,
    kind: ViolationKind,
    message: impl Into<String>,
) -> ServiceError {
    ServiceError::Validation(ValidationReport::single(field, kind, message))
}
