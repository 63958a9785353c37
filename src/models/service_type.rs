use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::assignee::Assignee;
use crate::domain::pricing::Pricing;
use crate::domain::service_type::{
    NewServiceType as DomainNewServiceType, ServiceType as DomainServiceType,
};
use crate::domain::types::{
    ApprovalKind, CategoryName, Description, RequestTypeName, StatusId, TypeConstraintError,
};

/// Diesel model representing the `service_types` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::service_types)]
pub struct ServiceType {
    pub id: i32,
    pub request_type: String,
    pub description: String,
    pub category_id: i32,
    pub enabled: bool,
    pub approval: String,
    pub assigned_to: Option<String>,
    pub assigned_to_type: Option<String>,
    pub pricing_kind: String,
    pub price_amount: Option<f64>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable/patchable form of [`ServiceType`].
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::service_types)]
#[diesel(treat_none_as_null = true)]
pub struct NewServiceType {
    pub request_type: String,
    pub description: String,
    pub category_id: i32,
    pub enabled: bool,
    pub approval: String,
    pub assigned_to: Option<String>,
    pub assigned_to_type: Option<String>,
    pub pricing_kind: String,
    pub price_amount: Option<f64>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Row of the `service_type_statuses` membership table.
#[derive(Debug, Clone, Copy, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::schema::service_type_statuses)]
pub struct ServiceTypeStatus {
    pub service_type_id: i32,
    pub status_id: i32,
}

impl ServiceType {
    /// Combines the row with its category name and attached statuses.
    pub fn into_domain(
        self,
        category_name: String,
        status_ids: &[i32],
    ) -> Result<DomainServiceType, TypeConstraintError> {
        let mut statuses = status_ids
            .iter()
            .map(|id| StatusId::new(*id))
            .collect::<Result<Vec<_>, _>>()?;
        statuses.sort();
        Ok(DomainServiceType {
            id: self.id.try_into()?,
            request_type: RequestTypeName::new(self.request_type)?,
            description: Description::new(self.description)?,
            category_id: self.category_id.try_into()?,
            category: CategoryName::new(category_name)?,
            enabled: self.enabled,
            approval: ApprovalKind::try_from(self.approval)?,
            assignee: Assignee::from_parts(self.assigned_to, self.assigned_to_type)?,
            pricing: Pricing::from_parts(
                &self.pricing_kind,
                self.price_amount,
                self.price_min,
                self.price_max,
            )?,
            statuses,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl From<DomainNewServiceType> for NewServiceType {
    fn from(service_type: DomainNewServiceType) -> Self {
        let (assigned_to, assigned_to_type) = match service_type.assignee {
            Some(assignee) => (
                Some(assignee.name.into_inner()),
                Some(assignee.kind.as_str().to_string()),
            ),
            None => (None, None),
        };
        Self {
            request_type: service_type.request_type.into_inner(),
            description: service_type.description.into_inner(),
            category_id: service_type.category_id.get(),
            enabled: service_type.enabled,
            approval: service_type.approval.as_str().to_string(),
            assigned_to,
            assigned_to_type,
            pricing_kind: service_type.pricing.kind().to_string(),
            price_amount: service_type.pricing.amount(),
            price_min: service_type.pricing.min(),
            price_max: service_type.pricing.max(),
            created_at: service_type.created_at,
            updated_at: service_type.updated_at,
        }
    }
}
