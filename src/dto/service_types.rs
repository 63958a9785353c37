use serde::Serialize;

use crate::domain::category::Category;
use crate::domain::derivation::{
    UNSET_DISPLAY, ValueSource, effective_assignee, effective_price,
};
use crate::domain::notifications::NotificationFlags;
use crate::domain::service_type::ServiceType;
use crate::domain::status::Status;
use crate::domain::types::{ApprovalKind, StatusId};

/// One status as seen from a service type row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMembershipDto {
    pub id: i32,
    pub name: String,
    pub color: &'static str,
    pub attached: bool,
    /// Implicit member that cannot be detached.
    pub reserved: bool,
    /// Present once notifications were configured for the pair.
    pub notify_requestor: Option<bool>,
    pub notify_assignee: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceTypeDto {
    pub id: i32,
    pub request_type: String,
    pub description: String,
    pub category_id: i32,
    pub category: String,
    pub enabled: bool,
    pub approval: &'static str,
    pub approval_label: &'static str,
    pub requires_approval: bool,
    pub assigned_to: Option<String>,
    pub assigned_to_type: Option<String>,
    pub effective_assignee: String,
    pub effective_assignee_type: Option<&'static str>,
    pub assignee_inherited: bool,
    pub pricing_kind: &'static str,
    pub price_amount: Option<f64>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub effective_price: String,
    pub price_inherited: bool,
    /// Every status in display order with its membership.
    pub statuses: Vec<StatusMembershipDto>,
}

impl ServiceTypeDto {
    /// `statuses` is the full status list in display order; `flags` returns
    /// the stored notification flags of a (status, service type) pair.
    pub fn new(
        service_type: ServiceType,
        category: Option<&Category>,
        statuses: &[Status],
        flags: impl Fn(StatusId) -> Option<NotificationFlags>,
    ) -> Self {
        let assignee = effective_assignee(&service_type, category);
        let price = effective_price(&service_type, category);
        let reserved = statuses
            .iter()
            .find(|status| status.is_reserved())
            .map(|status| status.id);

        let memberships = statuses
            .iter()
            .map(|status| {
                let flags = flags(status.id);
                StatusMembershipDto {
                    id: status.id.get(),
                    name: status.name.as_str().to_string(),
                    color: status.color.as_str(),
                    attached: service_type.has_status(status.id, reserved),
                    reserved: status.is_reserved(),
                    notify_requestor: flags.map(|f| f.notify_requestor),
                    notify_assignee: flags.map(|f| f.notify_assignee),
                }
            })
            .collect();

        let (assigned_to, assigned_to_type) = match &service_type.assignee {
            Some(own) => (
                Some(own.name.as_str().to_string()),
                Some(own.kind.as_str().to_string()),
            ),
            None => (None, None),
        };

        Self {
            id: service_type.id.get(),
            request_type: service_type.request_type.into_inner(),
            description: service_type.description.into_inner(),
            category_id: service_type.category_id.get(),
            category: service_type.category.into_inner(),
            enabled: service_type.enabled,
            approval: service_type.approval.as_str(),
            approval_label: service_type.approval.label(),
            requires_approval: service_type.approval.requires_approval(),
            assigned_to,
            assigned_to_type,
            effective_assignee: assignee
                .as_ref()
                .map(|resolved| resolved.value.name.as_str().to_string())
                .unwrap_or_else(|| UNSET_DISPLAY.to_string()),
            effective_assignee_type: assignee
                .as_ref()
                .map(|resolved| resolved.value.kind.as_str()),
            assignee_inherited: assignee.as_ref().is_some_and(|r| r.is_inherited()),
            pricing_kind: service_type.pricing.kind(),
            price_amount: service_type.pricing.amount(),
            price_min: service_type.pricing.min(),
            price_max: service_type.pricing.max(),
            effective_price: price
                .as_ref()
                .map(|resolved| resolved.value.clone())
                .unwrap_or_else(|| UNSET_DISPLAY.to_string()),
            price_inherited: price.as_ref().is_some_and(|r| r.is_inherited()),
            statuses: memberships,
        }
    }
}

/// Approver choice of the service type form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApproverOptionDto {
    pub value: &'static str,
    pub label: &'static str,
}

pub fn approver_options() -> Vec<ApproverOptionDto> {
    ApprovalKind::APPROVERS
        .iter()
        .map(|kind| ApproverOptionDto {
            value: kind.as_str(),
            label: kind.label(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveAssigneeDto {
    pub name: String,
    pub kind: &'static str,
    pub source: ValueSource,
}

/// JSON body of the effective value lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveValuesDto {
    pub service_type_id: i32,
    pub request_type: String,
    pub category: String,
    pub assignee: Option<EffectiveAssigneeDto>,
    pub price: String,
    pub price_source: Option<ValueSource>,
}

impl EffectiveValuesDto {
    pub fn new(service_type: &ServiceType, category: Option<&Category>) -> Self {
        let assignee = effective_assignee(service_type, category).map(|resolved| {
            EffectiveAssigneeDto {
                name: resolved.value.name.as_str().to_string(),
                kind: resolved.value.kind.as_str(),
                source: resolved.source,
            }
        });
        let price = effective_price(service_type, category);
        Self {
            service_type_id: service_type.id.get(),
            request_type: service_type.request_type.as_str().to_string(),
            category: service_type.category.as_str().to_string(),
            assignee,
            price_source: price.as_ref().map(|resolved| resolved.source),
            price: price
                .map(|resolved| resolved.value)
                .unwrap_or_else(|| UNSET_DISPLAY.to_string()),
        }
    }
}
