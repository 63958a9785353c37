use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::assignee::Assignee;
use crate::domain::category::{Category as DomainCategory, NewCategory as DomainNewCategory};
use crate::domain::pricing::Pricing;
use crate::domain::types::{CategoryName, Description, TypeConstraintError};

/// Diesel model representing the `categories` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::categories)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub assigned_to: Option<String>,
    pub assigned_to_type: Option<String>,
    pub pricing_kind: String,
    pub price_amount: Option<f64>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable/patchable form of [`Category`].
///
/// Updates replace the whole record, so cleared optional values are written
/// as `NULL`.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::categories)]
#[diesel(treat_none_as_null = true)]
pub struct NewCategory {
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub assigned_to: Option<String>,
    pub assigned_to_type: Option<String>,
    pub pricing_kind: String,
    pub price_amount: Option<f64>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Category> for DomainCategory {
    type Error = TypeConstraintError;

    fn try_from(category: Category) -> Result<Self, Self::Error> {
        Ok(Self {
            id: category.id.try_into()?,
            name: CategoryName::new(category.name)?,
            description: Description::new(category.description)?,
            enabled: category.enabled,
            assignee: Assignee::from_parts(category.assigned_to, category.assigned_to_type)?,
            pricing: Pricing::from_parts(
                &category.pricing_kind,
                category.price_amount,
                category.price_min,
                category.price_max,
            )?,
            created_at: category.created_at,
            updated_at: category.updated_at,
        })
    }
}

impl From<DomainNewCategory> for NewCategory {
    fn from(category: DomainNewCategory) -> Self {
        let (assigned_to, assigned_to_type) = match category.assignee {
            Some(assignee) => (
                Some(assignee.name.into_inner()),
                Some(assignee.kind.as_str().to_string()),
            ),
            None => (None, None),
        };
        Self {
            name: category.name.into_inner(),
            description: category.description.into_inner(),
            enabled: category.enabled,
            assigned_to,
            assigned_to_type,
            pricing_kind: category.pricing.kind().to_string(),
            price_amount: category.pricing.amount(),
            price_min: category.pricing.min(),
            price_max: category.pricing.max(),
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}
