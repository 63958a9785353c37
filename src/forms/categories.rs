use chrono::{NaiveDateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::domain::assignee::Assignee;
use crate::domain::category::NewCategory;
use crate::domain::pricing::Pricing;
use crate::domain::types::{CategoryName, Description};
use crate::domain::validation::ValidationReport;
use crate::forms::{FormError, checked, non_blank, parse_pricing, push_validation_errors};

/// Add and update form of a category.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CategoryForm {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[serde(default)]
    pub assigned_to: String,
    #[serde(default)]
    pub assigned_to_type: String,
    #[serde(default)]
    pub pricing_kind: String,
    #[serde(default)]
    pub price_amount: String,
    #[serde(default)]
    pub price_min: String,
    #[serde(default)]
    pub price_max: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryFormPayload {
    pub name: CategoryName,
    pub description: Description,
    pub assignee: Option<Assignee>,
    pub pricing: Pricing,
}

impl CategoryFormPayload {
    /// Builds the record to store. `created_at` is `None` for a new category.
    pub fn into_new_category(
        self,
        enabled: bool,
        created_at: Option<NaiveDateTime>,
    ) -> NewCategory {
        let now = Utc::now().naive_utc();
        NewCategory {
            name: self.name,
            description: self.description,
            enabled,
            assignee: self.assignee,
            pricing: self.pricing,
            created_at: created_at.unwrap_or(now),
            updated_at: now,
        }
    }
}

impl TryFrom<CategoryForm> for CategoryFormPayload {
    type Error = FormError;

    fn try_from(value: CategoryForm) -> Result<Self, Self::Error> {
        let mut report = ValidationReport::new();
        if let Err(errors) = value.validate() {
            push_validation_errors(&mut report, &errors);
        }

        let name = checked(&mut report, "name", CategoryName::new(value.name));
        let description = checked(
            &mut report,
            "description",
            Description::new(value.description),
        );
        let assignee = checked(
            &mut report,
            "assigned_to",
            Assignee::from_parts(
                non_blank(&value.assigned_to),
                non_blank(&value.assigned_to_type),
            ),
        )
        .flatten();
        let pricing = parse_pricing(
            &mut report,
            &value.pricing_kind,
            &value.price_amount,
            &value.price_min,
            &value.price_max,
        );

        match (name, description) {
            (Some(name), Some(description)) if report.is_empty() => Ok(Self {
                name,
                description,
                assignee,
                pricing,
            }),
            _ => Err(FormError::Validation(report)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{AssigneeKind, PriceAmount};
    use crate::domain::validation::ViolationKind;

    fn form(name: &str, description: &str) -> CategoryForm {
        CategoryForm {
            name: name.into(),
            description: description.into(),
            ..CategoryForm::default()
        }
    }

    #[test]
    fn valid_form_produces_payload() {
        let mut form = form("  Maintenance ", "Repairs");
        form.assigned_to = "Building Engineering".into();
        form.assigned_to_type = "team".into();
        form.pricing_kind = "fixed".into();
        form.price_amount = "150".into();

        let payload = CategoryFormPayload::try_from(form).unwrap();
        assert_eq!(payload.name.as_str(), "Maintenance");
        assert_eq!(payload.assignee.unwrap().kind, AssigneeKind::Team);
        assert_eq!(
            payload.pricing,
            Pricing::Fixed {
                amount: Some(PriceAmount::new(150.0).unwrap())
            }
        );
    }

    #[test]
    fn blank_fields_are_reported_once_each() {
        let err = CategoryFormPayload::try_from(form("", "   ")).unwrap_err();
        let FormError::Validation(report) = err else {
            panic!("expected validation error");
        };
        assert!(report.has("name", ViolationKind::Required));
        assert!(report.has("description", ViolationKind::Required));
        assert_eq!(report.violations().len(), 2);
    }

    #[test]
    fn blank_assignee_is_none() {
        let payload = CategoryFormPayload::try_from(form("Cleaning", "Janitorial")).unwrap();
        assert!(payload.assignee.is_none());
        assert_eq!(payload.pricing, Pricing::None);
    }
}
