use chrono::{NaiveDateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::domain::assignee::Assignee;
use crate::domain::notifications::NotificationAudience;
use crate::domain::pricing::Pricing;
use crate::domain::service_type::NewServiceType;
use crate::domain::types::{ApprovalKind, CategoryId, Description, RequestTypeName};
use crate::domain::validation::{ValidationReport, ViolationKind};
use crate::forms::{FormError, checked, non_blank, parse_pricing, push_validation_errors};

/// Add and update form of a service type.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ServiceTypeForm {
    #[validate(length(min = 1, message = "Request type is required"))]
    pub request_type: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[serde(default)]
    pub category_id: String,
    /// Checkbox; present when approval is switched on.
    #[serde(default)]
    pub needs_approval: Option<String>,
    #[serde(default)]
    pub approver: String,
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
pub struct ServiceTypeFormPayload {
    pub request_type: RequestTypeName,
    pub description: Description,
    pub category_id: CategoryId,
    pub approval: ApprovalKind,
    pub assignee: Option<Assignee>,
    pub pricing: Pricing,
}

impl ServiceTypeFormPayload {
    /// Builds the record to store. `created_at` is `None` for a new service
    /// type.
    pub fn into_new_service_type(
        self,
        enabled: bool,
        created_at: Option<NaiveDateTime>,
    ) -> NewServiceType {
        let now = Utc::now().naive_utc();
        NewServiceType {
            request_type: self.request_type,
            description: self.description,
            category_id: self.category_id,
            enabled,
            approval: self.approval,
            assignee: self.assignee,
            pricing: self.pricing,
            created_at: created_at.unwrap_or(now),
            updated_at: now,
        }
    }
}

/// Maps the approval switch and approver select onto an [`ApprovalKind`].
///
/// Switched off means no approval whatever approver is selected.
fn parse_approval(
    report: &mut ValidationReport,
    needs_approval: bool,
    approver: &str,
) -> ApprovalKind {
    if !needs_approval {
        return ApprovalKind::None;
    }
    match non_blank(approver).map(ApprovalKind::try_from) {
        Some(Ok(kind)) if kind.requires_approval() => kind,
        Some(Err(e)) => {
            report.push_constraint("approver", &e);
            ApprovalKind::None
        }
        _ => {
            report.push(
                "approver",
                ViolationKind::Required,
                "Choose who approves requests",
            );
            ApprovalKind::None
        }
    }
}

fn parse_category_id(report: &mut ValidationReport, value: &str) -> Option<CategoryId> {
    let Some(value) = non_blank(value) else {
        report.push("category_id", ViolationKind::Required, "Category is required");
        return None;
    };
    match value.parse::<i32>() {
        Ok(id) => checked(report, "category_id", CategoryId::new(id)),
        Err(_) => {
            report.push("category_id", ViolationKind::Invalid, "Unknown category");
            None
        }
    }
}

impl TryFrom<ServiceTypeForm> for ServiceTypeFormPayload {
    type Error = FormError;

    fn try_from(value: ServiceTypeForm) -> Result<Self, Self::Error> {
        let mut report = ValidationReport::new();
        if let Err(errors) = value.validate() {
            push_validation_errors(&mut report, &errors);
        }

        let request_type = checked(
            &mut report,
            "request_type",
            RequestTypeName::new(value.request_type),
        );
        let description = checked(
            &mut report,
            "description",
            Description::new(value.description),
        );
        let category_id = parse_category_id(&mut report, &value.category_id);
        let approval = parse_approval(
            &mut report,
            value.needs_approval.is_some(),
            &value.approver,
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

        match (request_type, description, category_id) {
            (Some(request_type), Some(description), Some(category_id)) if report.is_empty() => {
                Ok(Self {
                    request_type,
                    description,
                    category_id,
                    approval,
                    assignee,
                    pricing,
                })
            }
            _ => Err(FormError::Validation(report)),
        }
    }
}

/// Flips one notification flag of a (status, service type) pair.
#[derive(Debug, Deserialize)]
pub struct NotificationFlagForm {
    pub audience: String,
}

impl TryFrom<NotificationFlagForm> for NotificationAudience {
    type Error = FormError;

    fn try_from(value: NotificationFlagForm) -> Result<Self, Self::Error> {
        Ok(NotificationAudience::try_from(value.audience.as_str())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ServiceTypeForm {
        ServiceTypeForm {
            request_type: "Key Card Request".into(),
            description: "Replacement key card".into(),
            category_id: "1".into(),
            ..ServiceTypeForm::default()
        }
    }

    fn report(err: FormError) -> ValidationReport {
        match err {
            FormError::Validation(report) => report,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn approval_switched_off_ignores_approver() {
        let mut form = form();
        form.approver = "team".into();
        let payload = ServiceTypeFormPayload::try_from(form).unwrap();
        assert_eq!(payload.approval, ApprovalKind::None);
    }

    #[test]
    fn approval_switched_on_uses_approver() {
        let mut form = form();
        form.needs_approval = Some("on".into());
        form.approver = "specific-member".into();
        let payload = ServiceTypeFormPayload::try_from(form).unwrap();
        assert_eq!(payload.approval, ApprovalKind::SpecificMember);
        assert_eq!(payload.approval.label(), "Specific Member Approval");
    }

    #[test]
    fn approval_switched_on_without_approver_is_required() {
        let mut form = form();
        form.needs_approval = Some("on".into());
        let err = ServiceTypeFormPayload::try_from(form).unwrap_err();
        assert!(report(err).has("approver", ViolationKind::Required));
    }

    #[test]
    fn missing_category_is_required() {
        let mut form = form();
        form.category_id = " ".into();
        let err = ServiceTypeFormPayload::try_from(form).unwrap_err();
        assert!(report(err).has("category_id", ViolationKind::Required));
    }

    #[test]
    fn audience_form_parses() {
        let audience = NotificationAudience::try_from(NotificationFlagForm {
            audience: "assignee".into(),
        })
        .unwrap();
        assert_eq!(audience, NotificationAudience::Assignee);
        assert!(
            NotificationAudience::try_from(NotificationFlagForm {
                audience: "everyone".into()
            })
            .is_err()
        );
    }
}
