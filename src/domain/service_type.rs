use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::assignee::Assignee;
use crate::domain::pricing::Pricing;
use crate::domain::types::{
    ApprovalKind, CategoryId, CategoryName, Description, RequestTypeName, ServiceTypeId, StatusId,
};

/// A specific kind of request inside a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceType {
    pub id: ServiceTypeId,
    pub request_type: RequestTypeName,
    pub description: Description,
    pub category_id: CategoryId,
    /// Name of the referenced category, resolved on read.
    pub category: CategoryName,
    pub enabled: bool,
    pub approval: ApprovalKind,
    /// Own assignee; `None` inherits from the category.
    pub assignee: Option<Assignee>,
    /// Own pricing; [`Pricing::None`] inherits from the category.
    pub pricing: Pricing,
    /// Explicitly attached statuses in id order. The reserved status is an
    /// implicit member and never appears here.
    pub statuses: Vec<StatusId>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl ServiceType {
    /// Whether the status is attached, treating `reserved` as always attached.
    pub fn has_status(&self, status_id: StatusId, reserved: Option<StatusId>) -> bool {
        reserved == Some(status_id) || self.statuses.contains(&status_id)
    }
}

/// Data required to insert or fully replace a [`ServiceType`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewServiceType {
    pub request_type: RequestTypeName,
    pub description: Description,
    pub category_id: CategoryId,
    pub enabled: bool,
    pub approval: ApprovalKind,
    pub assignee: Option<Assignee>,
    pub pricing: Pricing,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
