use serde::Serialize;

use crate::domain::category::Category;
use crate::domain::derivation::UNSET_DISPLAY;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryDto {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub assigned_to: Option<String>,
    pub assigned_to_type: Option<String>,
    /// Assignee as shown in the list, `-` when unset.
    pub assignee_display: String,
    pub pricing_kind: &'static str,
    pub price_amount: Option<f64>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub price_display: String,
    /// Number of service types in the category.
    pub service_types: usize,
}

impl CategoryDto {
    pub fn new(category: Category, service_types: usize) -> Self {
        let (assigned_to, assigned_to_type) = match &category.assignee {
            Some(assignee) => (
                Some(assignee.name.as_str().to_string()),
                Some(assignee.kind.as_str().to_string()),
            ),
            None => (None, None),
        };
        Self {
            id: category.id.get(),
            name: category.name.into_inner(),
            description: category.description.into_inner(),
            enabled: category.enabled,
            assignee_display: assigned_to
                .clone()
                .unwrap_or_else(|| UNSET_DISPLAY.to_string()),
            assigned_to,
            assigned_to_type,
            pricing_kind: category.pricing.kind(),
            price_amount: category.pricing.amount(),
            price_min: category.pricing.min(),
            price_max: category.pricing.max(),
            price_display: category
                .pricing
                .display()
                .unwrap_or_else(|| UNSET_DISPLAY.to_string()),
            service_types,
        }
    }
}

impl From<Category> for CategoryDto {
    fn from(value: Category) -> Self {
        Self::new(value, 0)
    }
}

/// Option of the category select box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryOptionDto {
    pub id: i32,
    pub name: String,
    pub enabled: bool,
}

impl From<&Category> for CategoryOptionDto {
    fn from(value: &Category) -> Self {
        Self {
            id: value.id.get(),
            name: value.name.as_str().to_string(),
            enabled: value.enabled,
        }
    }
}
