use serde::Deserialize;
use validator::Validate;

use crate::domain::types::{Description, StatusColor, StatusName};
use crate::domain::validation::ValidationReport;
use crate::forms::{FormError, checked, non_blank, push_validation_errors};

/// Add and update form of a status.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct StatusForm {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[serde(default)]
    pub color: String,
}

/// Parsed status form. `color` is `None` when nothing was picked; whether
/// that is acceptable depends on the name.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusFormPayload {
    pub name: StatusName,
    pub description: Description,
    pub color: Option<StatusColor>,
}

impl TryFrom<StatusForm> for StatusFormPayload {
    type Error = FormError;

    fn try_from(value: StatusForm) -> Result<Self, Self::Error> {
        let mut report = ValidationReport::new();
        if let Err(errors) = value.validate() {
            push_validation_errors(&mut report, &errors);
        }

        let name = checked(&mut report, "name", StatusName::new(value.name));
        let description = checked(
            &mut report,
            "description",
            Description::new(value.description),
        );
        let color = non_blank(&value.color)
            .and_then(|color| checked(&mut report, "color", StatusColor::try_from(color)));

        match (name, description) {
            (Some(name), Some(description)) if report.is_empty() => Ok(Self {
                name,
                description,
                color,
            }),
            _ => Err(FormError::Validation(report)),
        }
    }
}
