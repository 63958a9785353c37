use std::collections::HashMap;

use serde::Serialize;

use crate::domain::category::Category;
use crate::domain::derivation::resolve_assignee;
use crate::domain::notifications::{NotificationAudience, NotificationFlags, StatusNotification};
use crate::domain::service_type::ServiceType;
use crate::domain::status::{RESERVED_STATUS_NAME, Status};
use crate::domain::types::{CategoryId, ServiceTypeId, StatusId};
use crate::domain::validation::{ValidationReport, ViolationKind};
use crate::dto::categories::CategoryOptionDto;
use crate::dto::service_types::{EffectiveValuesDto, ServiceTypeDto};
use crate::dto::statuses::StatusDto;
use crate::forms::service_types::ServiceTypeFormPayload;
use crate::repository::{
    CategoryListQuery, CategoryReader, ServiceTypeListQuery, ServiceTypeReader, ServiceTypeWriter,
    StatusListQuery, StatusReader, StatusWriter,
};

use super::{ServiceError, ServiceResult, repository_failure, violation};

/// Everything the service type page renders.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceTypesPage {
    pub service_types: Vec<ServiceTypeDto>,
    pub categories: Vec<CategoryOptionDto>,
    pub statuses: Vec<StatusDto>,
}

fn categories_by_id<R>(repo: &R) -> ServiceResult<HashMap<CategoryId, Category>>
where
    R: CategoryReader,
{
    Ok(repo
        .list_categories(CategoryListQuery::default())
        .map_err(|e| repository_failure("list categories", e))?
        .into_iter()
        .map(|category| (category.id, category))
        .collect())
}

pub fn show_service_types<R>(
    query: ServiceTypeListQuery,
    repo: &R,
) -> ServiceResult<ServiceTypesPage>
where
    R: ServiceTypeReader + CategoryReader + StatusReader,
{
    let categories = categories_by_id(repo)?;
    let statuses = repo
        .list_statuses(StatusListQuery::default())
        .map_err(|e| repository_failure("list statuses", e))?;
    let service_types = repo
        .list_service_types(query)
        .map_err(|e| repository_failure("list service types", e))?;

    let mut flags: HashMap<(StatusId, ServiceTypeId), NotificationFlags> = HashMap::new();
    for status in &statuses {
        for notification in repo
            .list_status_notifications(status.id)
            .map_err(|e| repository_failure("list status notifications", e))?
        {
            flags.insert(
                (notification.status_id, notification.service_type_id),
                notification.flags,
            );
        }
    }

    let service_types = service_types
        .into_iter()
        .map(|service_type| {
            let id = service_type.id;
            let category = categories.get(&service_type.category_id);
            ServiceTypeDto::new(service_type, category, &statuses, |status_id| {
                flags.get(&(status_id, id)).copied()
            })
        })
        .collect();

    let mut category_options: Vec<CategoryOptionDto> =
        categories.values().map(CategoryOptionDto::from).collect();
    category_options.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(ServiceTypesPage {
        service_types,
        categories: category_options,
        statuses: statuses.into_iter().map(StatusDto::from).collect(),
    })
}

/// Checks the rules that need other records: the category must exist and
/// the assignee must resolve through it.
fn validate_references<R>(payload: &ServiceTypeFormPayload, repo: &R) -> ServiceResult<()>
where
    R: CategoryReader,
{
    let category = repo
        .get_category_by_id(payload.category_id)
        .map_err(|e| repository_failure("get category", e))?;

    let mut report = ValidationReport::new();
    match &category {
        None => report.push("category_id", ViolationKind::Invalid, "Unknown category"),
        Some(category) => {
            if resolve_assignee(payload.assignee.as_ref(), Some(category)).is_none() {
                report.push(
                    "assigned_to",
                    ViolationKind::Unresolved,
                    format!(
                        "Choose an assignee; category \"{}\" has no default",
                        category.name
                    ),
                );
            }
        }
    }

    report.into_result().map_err(ServiceError::Validation)
}

fn load_service_type<R>(id: ServiceTypeId, repo: &R) -> ServiceResult<ServiceType>
where
    R: ServiceTypeReader,
{
    match repo.get_service_type_by_id(id) {
        Ok(Some(service_type)) => Ok(service_type),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => Err(repository_failure("get service type", e)),
    }
}

fn load_status<R>(id: StatusId, repo: &R) -> ServiceResult<Status>
where
    R: StatusReader,
{
    match repo.get_status_by_id(id) {
        Ok(Some(status)) => Ok(status),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => Err(repository_failure("get status", e)),
    }
}

/// Creates a service type. It starts attached to the reserved status only.
pub fn add_service_type<R>(payload: ServiceTypeFormPayload, repo: &R) -> ServiceResult<ServiceType>
where
    R: CategoryReader + ServiceTypeWriter,
{
    validate_references(&payload, repo)?;

    let service_type = payload.into_new_service_type(true, None);
    let created = repo
        .create_service_type(&service_type, &[])
        .map_err(|e| repository_failure("create service type", e))?;

    log::info!(
        "Created service type {} ({}) in category {}",
        created.id,
        created.request_type,
        created.category
    );
    Ok(created)
}

pub fn update_service_type<R>(
    id: ServiceTypeId,
    payload: ServiceTypeFormPayload,
    repo: &R,
) -> ServiceResult<()>
where
    R: CategoryReader + ServiceTypeReader + ServiceTypeWriter,
{
    let existing = load_service_type(id, repo)?;
    validate_references(&payload, repo)?;

    let service_type =
        payload.into_new_service_type(existing.enabled, Some(existing.created_at));
    match repo.update_service_type(id, &service_type) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(_) => {
            log::info!("Updated service type {id}");
            Ok(())
        }
        Err(e) => Err(repository_failure("update service type", e)),
    }
}

/// Deletes a service type together with its memberships and notifications.
pub fn delete_service_type<R>(id: ServiceTypeId, repo: &R) -> ServiceResult<()>
where
    R: ServiceTypeReader + ServiceTypeWriter,
{
    let existing = load_service_type(id, repo)?;
    repo.delete_service_type(id)
        .map_err(|e| repository_failure("delete service type", e))?;
    log::info!("Deleted service type {id} ({})", existing.request_type);
    Ok(())
}

/// Flips the enabled flag and returns the new value.
pub fn toggle_service_type<R>(id: ServiceTypeId, repo: &R) -> ServiceResult<bool>
where
    R: ServiceTypeReader + ServiceTypeWriter,
{
    let existing = load_service_type(id, repo)?;
    let enabled = !existing.enabled;
    repo.set_service_type_enabled(id, enabled)
        .map_err(|e| repository_failure("toggle service type", e))?;
    log::info!("Service type {id} enabled: {enabled}");
    Ok(enabled)
}

/// Attaches or detaches a status and returns whether it is now attached.
///
/// Detaching also drops the notification settings of the pair.
pub fn toggle_status_membership<R>(
    id: ServiceTypeId,
    status_id: StatusId,
    repo: &R,
) -> ServiceResult<bool>
where
    R: ServiceTypeReader + ServiceTypeWriter + StatusReader + StatusWriter,
{
    let service_type = load_service_type(id, repo)?;
    let status = load_status(status_id, repo)?;

    if status.is_reserved() {
        log::warn!("Rejected membership toggle of reserved status for service type {id}");
        return Err(violation(
            "statuses",
            ViolationKind::Reserved,
            format!("\"{RESERVED_STATUS_NAME}\" applies to every service type"),
        ));
    }

    let attached = !service_type.statuses.contains(&status_id);
    repo.set_service_type_status(id, status_id, attached)
        .map_err(|e| repository_failure("toggle status membership", e))?;

    if !attached {
        let remaining: Vec<StatusNotification> = repo
            .list_status_notifications(status_id)
            .map_err(|e| repository_failure("list status notifications", e))?
            .into_iter()
            .filter(|notification| notification.service_type_id != id)
            .collect();
        repo.replace_status_notifications(status_id, &remaining)
            .map_err(|e| repository_failure("replace status notifications", e))?;
    }

    log::info!(
        "Service type {id} {} status {}",
        if attached { "attached to" } else { "detached from" },
        status.name
    );
    Ok(attached)
}

/// Flips one notification flag of a (service type, status) pair and returns
/// the stored flags. The first toggle starts from both audiences enabled.
pub fn toggle_notification<R>(
    id: ServiceTypeId,
    status_id: StatusId,
    audience: NotificationAudience,
    repo: &R,
) -> ServiceResult<NotificationFlags>
where
    R: ServiceTypeReader + StatusReader + StatusWriter,
{
    let service_type = load_service_type(id, repo)?;
    let status = load_status(status_id, repo)?;

    let reserved = status.is_reserved().then_some(status.id);
    if !service_type.has_status(status_id, reserved) {
        return Err(violation(
            "statuses",
            ViolationKind::Invalid,
            format!(
                "\"{}\" is not attached to \"{}\"",
                status.name, service_type.request_type
            ),
        ));
    }

    let mut flags = repo
        .get_status_notification(status_id, id)
        .map_err(|e| repository_failure("get status notification", e))?
        .map(|notification| notification.flags)
        .unwrap_or_default();
    flags.toggle(audience);

    repo.upsert_status_notification(&StatusNotification {
        status_id,
        service_type_id: id,
        flags,
    })
    .map_err(|e| repository_failure("save status notification", e))?;

    log::info!(
        "Service type {id} status {status_id} notify {}: {}",
        audience.as_str(),
        flags.get(audience)
    );
    Ok(flags)
}

/// Effective assignee and price of one service type.
pub fn effective_values<R>(id: ServiceTypeId, repo: &R) -> ServiceResult<EffectiveValuesDto>
where
    R: ServiceTypeReader + CategoryReader,
{
    let service_type = load_service_type(id, repo)?;
    let category = repo
        .get_category_by_id(service_type.category_id)
        .map_err(|e| repository_failure("get category", e))?;
    Ok(EffectiveValuesDto::new(&service_type, category.as_ref()))
}
