//! HTML form structs and their conversion into typed payloads.

use serde::Deserialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::filter::EnabledFilter;
use crate::domain::pricing::Pricing;
use crate::domain::types::{CategoryId, PriceAmount, StatusId, TypeConstraintError};
use crate::domain::validation::{ValidationReport, ViolationKind};

pub mod categories;
pub mod import_export;
pub mod service_types;
pub mod statuses;

/// Error returned when a submitted form cannot be turned into a payload.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("{0}")]
    Validation(ValidationReport),
    #[error("form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationReport> for FormError {
    fn from(value: ValidationReport) -> Self {
        Self::Validation(value)
    }
}

impl From<TypeConstraintError> for FormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl From<ValidationErrors> for FormError {
    fn from(value: ValidationErrors) -> Self {
        let mut report = ValidationReport::new();
        push_validation_errors(&mut report, &value);
        Self::Validation(report)
    }
}

/// Copies `validator` failures into `report`, one violation per field in
/// field name order.
pub(crate) fn push_validation_errors(report: &mut ValidationReport, errors: &ValidationErrors) {
    let mut fields: Vec<(String, String, ViolationKind)> = Vec::new();
    for (field, field_errors) in errors.field_errors() {
        let field = field.to_string();
        let Some(error) = field_errors.first() else {
            continue;
        };
        let kind = match &*error.code {
            "length" | "required" => ViolationKind::Required,
            _ => ViolationKind::Invalid,
        };
        let message = error
            .message
            .as_ref()
            .map(|message| message.to_string())
            .unwrap_or_else(|| format!("{field} is invalid"));
        fields.push((field, message, kind));
    }
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    for (field, message, kind) in fields {
        report.push(field, kind, message);
    }
}

/// Unwraps a constructor result, recording the failure against `field`
/// unless the field already has a violation.
pub(crate) fn checked<T>(
    report: &mut ValidationReport,
    field: &str,
    result: Result<T, TypeConstraintError>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            if !report.violations().iter().any(|v| v.field == field) {
                report.push_constraint(field, &e);
            }
            None
        }
    }
}

/// Query string of the settings list pages.
#[derive(Debug, Default, Deserialize)]
pub struct ListFilterQuery {
    pub q: Option<String>,
    pub enabled: Option<String>,
    pub category_id: Option<String>,
    pub status_id: Option<String>,
}

impl ListFilterQuery {
    pub fn enabled_filter(&self) -> EnabledFilter {
        self.enabled
            .as_deref()
            .and_then(|value| EnabledFilter::try_from(value).ok())
            .unwrap_or_default()
    }

    /// Positive id from a select box; blank or malformed means "any".
    fn parse_id(value: Option<&str>) -> Option<i32> {
        value
            .and_then(|value| value.trim().parse::<i32>().ok())
            .filter(|id| *id > 0)
    }

    pub fn category_id(&self) -> Option<CategoryId> {
        Self::parse_id(self.category_id.as_deref()).and_then(|id| CategoryId::new(id).ok())
    }

    pub fn status_id(&self) -> Option<StatusId> {
        Self::parse_id(self.status_id.as_deref()).and_then(|id| StatusId::new(id).ok())
    }
}

/// Trims a text input, mapping blank to `None`.
pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Parses an optional dollar amount. Blank is `None`; anything unparsable
/// is recorded as an `Invalid` violation on `field`.
pub(crate) fn parse_amount(
    report: &mut ValidationReport,
    field: &str,
    value: &str,
) -> Option<f64> {
    let value = non_blank(value)?;
    match value.replace([',', '$'], "").parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount >= 0.0 => match PriceAmount::new(amount) {
            Ok(amount) => Some(amount.get()),
            Err(e) => {
                report.push_constraint(field, &e);
                None
            }
        },
        _ => {
            report.push(
                field,
                ViolationKind::Invalid,
                format!("{field} must be a non-negative amount"),
            );
            None
        }
    }
}

/// Builds the pricing of a category or service type from its form fields.
pub(crate) fn parse_pricing(
    report: &mut ValidationReport,
    kind: &str,
    amount: &str,
    min: &str,
    max: &str,
) -> Pricing {
    let amount = parse_amount(report, "price_amount", amount);
    let min = parse_amount(report, "price_min", min);
    let max = parse_amount(report, "price_max", max);

    if matches!((min, max), (Some(min), Some(max)) if min > max) {
        report.push(
            "price_max",
            ViolationKind::Invalid,
            "price_max must not be lower than price_min",
        );
    }

    match Pricing::from_parts(kind, amount, min, max) {
        Ok(pricing) => pricing,
        Err(e) => {
            report.push_constraint("pricing_kind", &e);
            Pricing::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_amount_is_none() {
        let mut report = ValidationReport::new();
        assert_eq!(parse_amount(&mut report, "price_amount", "  "), None);
        assert!(report.is_empty());
    }

    #[test]
    fn amount_accepts_currency_formatting() {
        let mut report = ValidationReport::new();
        assert_eq!(
            parse_amount(&mut report, "price_amount", "$1,234.50"),
            Some(1234.5)
        );
        assert_eq!(parse_amount(&mut report, "price_amount", "0"), Some(0.0));
        assert!(report.is_empty());
    }

    #[test]
    fn negative_or_garbage_amount_is_invalid() {
        let mut report = ValidationReport::new();
        assert_eq!(parse_amount(&mut report, "price_min", "-5"), None);
        assert_eq!(parse_amount(&mut report, "price_max", "abc"), None);
        assert!(report.has("price_min", ViolationKind::Invalid));
        assert!(report.has("price_max", ViolationKind::Invalid));
    }

    #[test]
    fn pricing_from_form_fields() {
        let mut report = ValidationReport::new();
        let pricing = parse_pricing(&mut report, "range", "", "50", "");
        assert_eq!(
            pricing,
            Pricing::Range {
                min: Some(PriceAmount::new(50.0).unwrap()),
                max: None,
            }
        );

        let unknown = parse_pricing(&mut report, "hourly", "", "", "");
        assert_eq!(unknown, Pricing::None);
        assert!(report.has("pricing_kind", ViolationKind::Invalid));
    }

    #[test]
    fn amount_above_the_cap_is_invalid_on_its_field() {
        let mut report = ValidationReport::new();
        assert_eq!(parse_amount(&mut report, "price_amount", "1e20"), None);
        assert!(report.has("price_amount", ViolationKind::Invalid));

        let mut report = ValidationReport::new();
        assert_eq!(
            parse_amount(&mut report, "price_amount", "$1,000,000,000,000"),
            Some(1e12)
        );
        assert!(report.is_empty());
    }

    #[test]
    fn inverted_range_is_invalid() {
        let mut report = ValidationReport::new();
        parse_pricing(&mut report, "range", "", "300", "50");
        assert!(report.has("price_max", ViolationKind::Invalid));

        let mut report = ValidationReport::new();
        parse_pricing(&mut report, "range", "", "50", "50");
        assert!(report.is_empty());
    }

    #[test]
    fn list_filter_ignores_blank_selects() {
        let query = ListFilterQuery {
            q: Some("prog".into()),
            enabled: Some("enabled".into()),
            category_id: Some("".into()),
            status_id: Some("3".into()),
        };
        assert_eq!(query.enabled_filter(), EnabledFilter::Enabled);
        assert_eq!(query.category_id(), None);
        assert_eq!(query.status_id().map(StatusId::get), Some(3));
    }
}
