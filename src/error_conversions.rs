//! Error conversion glue between the form and service layers.
//!
//! Forms and domain types must not depend on service error types, so the
//! conversions live here and are only compiled with the `server` feature.

use crate::domain::types::TypeConstraintError;
use crate::domain::validation::ValidationReport;
use crate::forms::FormError;
use crate::forms::import_export::UploadParseError;
use crate::services::ServiceError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(val.to_string())
    }
}

impl From<ValidationReport> for ServiceError {
    fn from(val: ValidationReport) -> Self {
        ServiceError::Validation(val)
    }
}

impl From<FormError> for ServiceError {
    fn from(val: FormError) -> Self {
        match val {
            FormError::Validation(report) => ServiceError::Validation(report),
            FormError::TypeConstraint(message) => ServiceError::Form(message),
        }
    }
}

impl From<UploadParseError> for ServiceError {
    fn from(val: UploadParseError) -> Self {
        ServiceError::Form(val.to_string())
    }
}
