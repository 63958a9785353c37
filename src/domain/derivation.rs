//! Effective assignee and price of a service type.
//!
//! A service type may leave its assignee or pricing unset, in which case the
//! value of its category applies. These functions are the single place where
//! that fallback is resolved; list views, exports and save validation all go
//! through them.

use serde::Serialize;

use crate::domain::assignee::Assignee;
use crate::domain::category::Category;
use crate::domain::pricing::Pricing;
use crate::domain::service_type::ServiceType;

/// Display value for an unresolved assignee or price.
pub const UNSET_DISPLAY: &str = "-";

/// Where an effective value came from.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    ServiceType,
    Category,
}

/// A value resolved through the service type → category fallback.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Resolved<T> {
    pub value: T,
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    pub fn is_inherited(&self) -> bool {
        self.source == ValueSource::Category
    }
}

pub fn resolve_assignee(
    own: Option<&Assignee>,
    category: Option<&Category>,
) -> Option<Resolved<Assignee>> {
    if let Some(assignee) = own {
        return Some(Resolved {
            value: assignee.clone(),
            source: ValueSource::ServiceType,
        });
    }
    category
        .and_then(|category| category.assignee.as_ref())
        .map(|assignee| Resolved {
            value: assignee.clone(),
            source: ValueSource::Category,
        })
}

pub fn resolve_price(own: &Pricing, category: Option<&Category>) -> Option<Resolved<String>> {
    if let Some(price) = own.display() {
        return Some(Resolved {
            value: price,
            source: ValueSource::ServiceType,
        });
    }
    category
        .and_then(|category| category.pricing.display())
        .map(|price| Resolved {
            value: price,
            source: ValueSource::Category,
        })
}

pub fn effective_assignee(
    service_type: &ServiceType,
    category: Option<&Category>,
) -> Option<Resolved<Assignee>> {
    resolve_assignee(service_type.assignee.as_ref(), category)
}

pub fn effective_price(
    service_type: &ServiceType,
    category: Option<&Category>,
) -> Option<Resolved<String>> {
    resolve_price(&service_type.pricing, category)
}

/// Effective price as shown in list views, `-` when nothing applies.
pub fn effective_price_display(service_type: &ServiceType, category: Option<&Category>) -> String {
    effective_price(service_type, category)
        .map(|resolved| resolved.value)
        .unwrap_or_else(|| UNSET_DISPLAY.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{
        ApprovalKind, AssigneeKind, AssigneeName, CategoryId, CategoryName, Description,
        PriceAmount, RequestTypeName, ServiceTypeId,
    };
    use chrono::DateTime;

    fn category(assignee: Option<Assignee>, pricing: Pricing) -> Category {
        let now = DateTime::from_timestamp(0, 0).unwrap().naive_utc();
        Category {
            id: CategoryId::new(1).unwrap(),
            name: CategoryName::new("Security").unwrap(),
            description: Description::new("Security services").unwrap(),
            enabled: true,
            assignee,
            pricing,
            created_at: now,
            updated_at: now,
        }
    }

    fn service_type(assignee: Option<Assignee>, pricing: Pricing) -> ServiceType {
        let now = DateTime::from_timestamp(0, 0).unwrap().naive_utc();
        ServiceType {
            id: ServiceTypeId::new(1).unwrap(),
            request_type: RequestTypeName::new("Key Card Request").unwrap(),
            description: Description::new("Replacement key card").unwrap(),
            category_id: CategoryId::new(1).unwrap(),
            category: CategoryName::new("Security").unwrap(),
            enabled: true,
            approval: ApprovalKind::None,
            assignee,
            pricing,
            statuses: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    fn team(name: &str) -> Assignee {
        Assignee::new(AssigneeName::new(name).unwrap(), AssigneeKind::Team)
    }

    fn fixed(amount: f64) -> Pricing {
        Pricing::Fixed {
            amount: Some(PriceAmount::new(amount).unwrap()),
        }
    }

    #[test]
    fn price_is_inherited_from_category() {
        let category = category(None, fixed(150.0));
        let service_type = service_type(None, Pricing::None);

        let resolved = effective_price(&service_type, Some(&category)).unwrap();
        assert_eq!(resolved.value, "$150.00");
        assert!(resolved.is_inherited());
    }

    #[test]
    fn own_range_price_never_falls_back() {
        let category = category(None, fixed(150.0));
        let service_type = service_type(
            None,
            Pricing::Range {
                min: Some(PriceAmount::new(50.0).unwrap()),
                max: None,
            },
        );

        let resolved = effective_price(&service_type, Some(&category)).unwrap();
        assert_eq!(resolved.value, "$50.00+");
        assert_eq!(resolved.source, ValueSource::ServiceType);
    }

    #[test]
    fn empty_own_fixed_price_falls_back() {
        let category = category(None, fixed(20.0));
        let service_type = service_type(None, Pricing::Fixed { amount: None });

        assert_eq!(
            effective_price_display(&service_type, Some(&category)),
            "$20.00"
        );
    }

    #[test]
    fn price_without_any_source_is_sentinel() {
        let service_type = service_type(None, Pricing::None);
        assert_eq!(
            effective_price_display(&service_type, Some(&category(None, Pricing::None))),
            UNSET_DISPLAY
        );
        assert_eq!(effective_price_display(&service_type, None), UNSET_DISPLAY);
    }

    #[test]
    fn assignee_is_inherited_from_category() {
        let category = category(Some(team("Security Team")), Pricing::None);
        let service_type = service_type(None, Pricing::None);

        let resolved = effective_assignee(&service_type, Some(&category)).unwrap();
        assert_eq!(resolved.value.name.as_str(), "Security Team");
        assert_eq!(resolved.value.kind, AssigneeKind::Team);
        assert!(resolved.is_inherited());
    }

    #[test]
    fn own_assignee_wins() {
        let category = category(Some(team("Security Team")), Pricing::None);
        let own = Assignee::new(AssigneeName::new("Jordan Lee").unwrap(), AssigneeKind::User);
        let service_type = service_type(Some(own.clone()), Pricing::None);

        let resolved = effective_assignee(&service_type, Some(&category)).unwrap();
        assert_eq!(resolved.value, own);
        assert_eq!(resolved.source, ValueSource::ServiceType);
    }

    #[test]
    fn no_assignee_anywhere_is_unresolved() {
        let service_type = service_type(None, Pricing::None);
        assert!(effective_assignee(&service_type, Some(&category(None, Pricing::None))).is_none());
        assert!(resolve_assignee(None, None).is_none());
    }
}
