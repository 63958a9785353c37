use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::assignee::Assignee;
use crate::domain::pricing::Pricing;
use crate::domain::types::{CategoryId, CategoryName, Description};

/// Top-level grouping of service types.
///
/// `assignee` and `pricing` act as defaults for every service type in the
/// category that does not set its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: CategoryName,
    pub description: Description,
    pub enabled: bool,
    pub assignee: Option<Assignee>,
    pub pricing: Pricing,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Data required to insert or fully replace a [`Category`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewCategory {
    pub name: CategoryName,
    pub description: Description,
    pub enabled: bool,
    pub assignee: Option<Assignee>,
    pub pricing: Pricing,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
