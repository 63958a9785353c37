//! Field-level validation results returned to callers instead of silently
//! blocking a save.

use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::domain::types::TypeConstraintError;

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A required value is missing or blank.
    Required,
    /// A value is present but malformed or out of range.
    Invalid,
    /// A value that must be unique is already taken.
    Duplicate,
    /// A value that falls back to another record could not be resolved.
    Unresolved,
    /// The operation would break an invariant of the reserved status.
    Reserved,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub kind: ViolationKind,
    pub message: String,
}

impl Display for FieldViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Collection of violations for one submitted form.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct ValidationReport {
    violations: Vec<FieldViolation>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report with a single violation.
    pub fn single(
        field: impl Into<String>,
        kind: ViolationKind,
        message: impl Into<String>,
    ) -> Self {
        let mut report = Self::new();
        report.push(field, kind, message);
        report
    }

    pub fn push(
        &mut self,
        field: impl Into<String>,
        kind: ViolationKind,
        message: impl Into<String>,
    ) {
        self.violations.push(FieldViolation {
            field: field.into(),
            kind,
            message: message.into(),
        });
    }

    /// Records a constructor failure against `field`.
    pub fn push_constraint(&mut self, field: impl Into<String>, error: &TypeConstraintError) {
        let kind = match error {
            TypeConstraintError::EmptyString(_) => ViolationKind::Required,
            _ => ViolationKind::Invalid,
        };
        self.push(field, kind, error.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    pub fn has(&self, field: &str, kind: ViolationKind) -> bool {
        self.violations
            .iter()
            .any(|v| v.field == field && v.kind == kind)
    }

    /// `Ok(())` when nothing was recorded, otherwise the report itself.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.violations.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("; "))
    }
}
