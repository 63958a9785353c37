use chrono::Utc;

use crate::domain::notifications::{NotificationSelection, StatusNotification};
use crate::domain::status::{NewStatus, RESERVED_STATUS_NAME, Status, is_reserved_name, preset_color};
use crate::domain::types::{CategoryId, OrderCount, ServiceTypeId, StatusId, StatusName};
use crate::domain::validation::ViolationKind;
use crate::dto::statuses::{
    NotificationCategoryDto, NotificationRequestTypeDto, NotificationTreeDto, StatusDto,
};
use crate::forms::statuses::StatusFormPayload;
use crate::repository::{
    CategoryListQuery, CategoryReader, ServiceTypeListQuery, ServiceTypeReader, StatusListQuery,
    StatusReader, StatusWriter,
};

use super::{ServiceError, ServiceResult, repository_failure, violation};

/// Re-creates the reserved status when the store lacks it and re-enables it
/// when something disabled it.
pub fn ensure_reserved_status<R>(repo: &R) -> ServiceResult<Status>
where
    R: StatusReader + StatusWriter,
{
    let name = StatusName::new(RESERVED_STATUS_NAME)?;
    match repo.get_status_by_name(&name) {
        Ok(Some(status)) if status.enabled => Ok(status),
        Ok(Some(mut status)) => {
            log::warn!("Reserved status {} was disabled; enabling it", status.id);
            repo.set_status_enabled(status.id, true)
                .map_err(|e| repository_failure("enable reserved status", e))?;
            status.enabled = true;
            Ok(status)
        }
        Ok(None) => {
            log::warn!("Reserved status missing; recreating it");
            let status = NewStatus::reserved(Utc::now().naive_utc())?;
            repo.create_status(&status)
                .map_err(|e| repository_failure("create reserved status", e))
        }
        Err(e) => Err(repository_failure("get reserved status", e)),
    }
}

pub fn show_statuses<R>(query: StatusListQuery, repo: &R) -> ServiceResult<Vec<StatusDto>>
where
    R: StatusReader + StatusWriter,
{
    ensure_reserved_status(repo)?;

    let statuses = repo
        .list_statuses(query)
        .map_err(|e| repository_failure("list statuses", e))?;

    statuses
        .into_iter()
        .map(|status| {
            let notifications = repo
                .list_status_notifications(status.id)
                .map_err(|e| repository_failure("list status notifications", e))?
                .len();
            Ok(StatusDto::new(status, notifications))
        })
        .collect()
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

fn ensure_unique_name<R>(name: &StatusName, id: Option<StatusId>, repo: &R) -> ServiceResult<()>
where
    R: StatusReader,
{
    match repo.get_status_by_name(name) {
        Ok(Some(existing)) if Some(existing.id) != id => Err(violation(
            "name",
            ViolationKind::Duplicate,
            format!("A status named \"{name}\" already exists"),
        )),
        Ok(_) => Ok(()),
        Err(e) => Err(repository_failure("look up status", e)),
    }
}

fn reserved_violation(action: &str) -> ServiceError {
    log::warn!("Rejected attempt to {action} the reserved status");
    violation(
        "name",
        ViolationKind::Reserved,
        format!("The \"{RESERVED_STATUS_NAME}\" status cannot be {action}d"),
    )
}

pub fn add_status<R>(payload: StatusFormPayload, repo: &R) -> ServiceResult<Status>
where
    R: StatusReader + StatusWriter,
{
    ensure_reserved_status(repo)?;
    ensure_unique_name(&payload.name, None, repo)?;

    let color = match (preset_color(payload.name.as_str()), payload.color) {
        (Some(color), _) | (None, Some(color)) => color,
        (None, None) => {
            return Err(violation(
                "color",
                ViolationKind::Required,
                "Pick a color for the status",
            ));
        }
    };

    let now = Utc::now().naive_utc();
    let status = NewStatus {
        name: payload.name,
        description: payload.description,
        enabled: true,
        color,
        order_count: OrderCount::default(),
        created_at: now,
        updated_at: now,
    }
    .normalized();

    let created = repo
        .create_status(&status)
        .map_err(|e| repository_failure("create status", e))?;
    log::info!("Created status {} ({})", created.id, created.name);
    Ok(created)
}

pub fn update_status<R>(id: StatusId, payload: StatusFormPayload, repo: &R) -> ServiceResult<()>
where
    R: StatusReader + StatusWriter,
{
    let existing = load_status(id, repo)?;

    if existing.is_reserved() && !is_reserved_name(payload.name.as_str()) {
        return Err(reserved_violation("rename"));
    }
    ensure_unique_name(&payload.name, Some(id), repo)?;

    let color = preset_color(payload.name.as_str())
        .or(payload.color)
        .unwrap_or(existing.color);

    let status = NewStatus {
        name: payload.name,
        description: payload.description,
        enabled: existing.enabled,
        color,
        order_count: existing.order_count,
        created_at: existing.created_at,
        updated_at: Utc::now().naive_utc(),
    }
    .normalized();

    match repo.update_status(id, &status) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(_) => {
            log::info!("Updated status {id}");
            Ok(())
        }
        Err(e) => Err(repository_failure("update status", e)),
    }
}

pub fn delete_status<R>(id: StatusId, repo: &R) -> ServiceResult<()>
where
    R: StatusReader + StatusWriter,
{
    let existing = load_status(id, repo)?;
    if existing.is_reserved() {
        return Err(reserved_violation("delete"));
    }

    repo.delete_status(id)
        .map_err(|e| repository_failure("delete status", e))?;
    log::info!("Deleted status {id} ({})", existing.name);
    Ok(())
}

/// Flips the enabled flag and returns the new value.
pub fn toggle_status<R>(id: StatusId, repo: &R) -> ServiceResult<bool>
where
    R: StatusReader + StatusWriter,
{
    let existing = load_status(id, repo)?;
    if existing.is_reserved() {
        return Err(reserved_violation("disable"));
    }

    let enabled = !existing.enabled;
    repo.set_status_enabled(id, enabled)
        .map_err(|e| repository_failure("toggle status", e))?;
    log::info!("Status {id} enabled: {enabled}");
    Ok(enabled)
}

fn load_selection<R>(status_id: StatusId, repo: &R) -> ServiceResult<NotificationSelection>
where
    R: StatusReader,
{
    let notifications = repo
        .list_status_notifications(status_id)
        .map_err(|e| repository_failure("list status notifications", e))?;
    Ok(NotificationSelection::from_notifications(
        status_id,
        notifications,
    ))
}

fn save_selection<R>(
    status_id: StatusId,
    selection: NotificationSelection,
    repo: &R,
) -> ServiceResult<()>
where
    R: StatusWriter,
{
    let notifications: Vec<StatusNotification> = selection.into_notifications(status_id);
    repo.replace_status_notifications(status_id, &notifications)
        .map_err(|e| repository_failure("save status notifications", e))?;
    Ok(())
}

/// Service types attached to the status, which are the request types its
/// notification tree offers.
fn attached_service_types<R>(
    status: &Status,
    repo: &R,
) -> ServiceResult<Vec<crate::domain::service_type::ServiceType>>
where
    R: ServiceTypeReader,
{
    repo.list_service_types(ServiceTypeListQuery::default().status(status.id))
        .map_err(|e| repository_failure("list service types", e))
}

/// Category → request type tree of the status notification settings.
pub fn show_notification_tree<R>(status_id: StatusId, repo: &R) -> ServiceResult<NotificationTreeDto>
where
    R: StatusReader + ServiceTypeReader + CategoryReader,
{
    let status = load_status(status_id, repo)?;
    let service_types = attached_service_types(&status, repo)?;
    let selection = load_selection(status_id, repo)?;
    let categories = repo
        .list_categories(CategoryListQuery::default())
        .map_err(|e| repository_failure("list categories", e))?;

    let nodes = categories
        .into_iter()
        .filter_map(|category| {
            let members: Vec<_> = service_types
                .iter()
                .filter(|service_type| service_type.category_id == category.id)
                .collect();
            if members.is_empty() {
                return None;
            }
            let ids: Vec<ServiceTypeId> = members.iter().map(|service_type| service_type.id).collect();
            Some(NotificationCategoryDto {
                id: category.id.get(),
                name: category.name.into_inner(),
                state: selection.category_state(&ids),
                request_types: members
                    .into_iter()
                    .map(|service_type| {
                        let flags = selection.flags(service_type.id);
                        NotificationRequestTypeDto {
                            id: service_type.id.get(),
                            request_type: service_type.request_type.as_str().to_string(),
                            selected: flags.is_some(),
                            notify_requestor: flags.is_some_and(|f| f.notify_requestor),
                            notify_assignee: flags.is_some_and(|f| f.notify_assignee),
                        }
                    })
                    .collect(),
            })
        })
        .collect();

    let notifications = selection.len();
    Ok(NotificationTreeDto {
        status: StatusDto::new(status, notifications),
        categories: nodes,
    })
}

/// Clicking a category checkbox in the notification tree.
pub fn toggle_notification_category<R>(
    status_id: StatusId,
    category_id: CategoryId,
    repo: &R,
) -> ServiceResult<()>
where
    R: StatusReader + StatusWriter + ServiceTypeReader + CategoryReader,
{
    let status = load_status(status_id, repo)?;
    match repo.get_category_by_id(category_id) {
        Ok(Some(_)) => {}
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => return Err(repository_failure("get category", e)),
    }

    let members: Vec<ServiceTypeId> = attached_service_types(&status, repo)?
        .into_iter()
        .filter(|service_type| service_type.category_id == category_id)
        .map(|service_type| service_type.id)
        .collect();

    let mut selection = load_selection(status_id, repo)?;
    selection.toggle_category(&members);
    save_selection(status_id, selection, repo)?;
    log::info!("Toggled notifications of category {category_id} for status {status_id}");
    Ok(())
}

/// Clicking a request type checkbox in the notification tree.
pub fn toggle_notification_request_type<R>(
    status_id: StatusId,
    service_type_id: ServiceTypeId,
    repo: &R,
) -> ServiceResult<()>
where
    R: StatusReader + StatusWriter + ServiceTypeReader,
{
    let status = load_status(status_id, repo)?;
    let attached = attached_service_types(&status, repo)?
        .iter()
        .any(|service_type| service_type.id == service_type_id);
    if !attached {
        return Err(violation(
            "request_type",
            ViolationKind::Invalid,
            format!("Request type is not attached to \"{}\"", status.name),
        ));
    }

    let mut selection = load_selection(status_id, repo)?;
    selection.toggle_request_type(service_type_id);
    save_selection(status_id, selection, repo)?;
    log::info!("Toggled notifications of service type {service_type_id} for status {status_id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::assignee::Assignee;
    use crate::domain::category::{Category, NewCategory};
    use crate::domain::filter::EnabledFilter;
    use crate::domain::notifications::{NotificationAudience, SelectionState};
    use crate::domain::pricing::Pricing;
    use crate::domain::service_type::NewServiceType;
    use crate::domain::types::{
        ApprovalKind, AssigneeKind, AssigneeName, CategoryName, Description, RequestTypeName,
        StatusColor,
    };
    use crate::repository::test::TestRepository;
    use crate::repository::{CategoryWriter, ServiceTypeWriter};
    use crate::services::service_types::toggle_notification;

    fn payload(name: &str, color: Option<StatusColor>) -> StatusFormPayload {
        StatusFormPayload {
            name: StatusName::new(name).unwrap(),
            description: Description::new(format!("{name} description")).unwrap(),
            color,
        }
    }

    fn reserved_id(repo: &TestRepository) -> StatusId {
        ensure_reserved_status(repo).unwrap().id
    }

    fn assert_reserved(err: ServiceError) {
        let ServiceError::Validation(report) = err else {
            panic!("expected validation error");
        };
        assert!(report.has("name", ViolationKind::Reserved));
    }

    fn category(repo: &TestRepository, name: &str) -> Category {
        let now = Utc::now().naive_utc();
        repo.create_category(&NewCategory {
            name: CategoryName::new(name).unwrap(),
            description: Description::new("desc").unwrap(),
            enabled: true,
            assignee: Some(Assignee::new(
                AssigneeName::new("Facilities").unwrap(),
                AssigneeKind::Team,
            )),
            pricing: Pricing::None,
            created_at: now,
            updated_at: now,
        })
        .unwrap()
    }

    fn service_type(
        repo: &TestRepository,
        category: &Category,
        name: &str,
        statuses: &[StatusId],
    ) -> ServiceTypeId {
        let now = Utc::now().naive_utc();
        repo.create_service_type(
            &NewServiceType {
                request_type: RequestTypeName::new(name).unwrap(),
                description: Description::new("desc").unwrap(),
                category_id: category.id,
                enabled: true,
                approval: ApprovalKind::None,
                assignee: None,
                pricing: Pricing::None,
                created_at: now,
                updated_at: now,
            },
            statuses,
        )
        .unwrap()
        .id
    }

    #[test]
    fn reserved_status_is_recreated_on_load() {
        let repo = TestRepository::new();
        let listed = show_statuses(StatusListQuery::default(), &repo).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, RESERVED_STATUS_NAME);
        assert!(listed[0].enabled);
        assert!(listed[0].reserved);
        assert_eq!(listed[0].color, "blue");
    }

    #[test]
    fn reserved_status_is_listed_first() {
        let repo = TestRepository::new();
        add_status(payload("Completed", None), &repo).unwrap();
        repo.delete_status(reserved_id(&repo)).unwrap();

        let listed = show_statuses(StatusListQuery::default(), &repo).unwrap();
        assert_eq!(listed[0].name, RESERVED_STATUS_NAME);
        assert_eq!(listed[1].name, "Completed");
    }

    #[test]
    fn reserved_status_cannot_be_deleted_disabled_or_renamed() {
        let repo = TestRepository::with_presets();
        let id = reserved_id(&repo);

        assert_reserved(delete_status(id, &repo).unwrap_err());
        assert_reserved(toggle_status(id, &repo).unwrap_err());
        assert_reserved(update_status(id, payload("Fresh", None), &repo).unwrap_err());

        let stored = repo.get_status_by_id(id).unwrap().unwrap();
        assert_eq!(stored.name.as_str(), RESERVED_STATUS_NAME);
        assert!(stored.enabled);
    }

    #[test]
    fn reserved_description_can_change() {
        let repo = TestRepository::with_presets();
        let id = reserved_id(&repo);
        update_status(id, payload(RESERVED_STATUS_NAME, Some(StatusColor::Pink)), &repo).unwrap();

        let stored = repo.get_status_by_id(id).unwrap().unwrap();
        assert_eq!(stored.description.as_str(), "New description");
        assert_eq!(stored.color, StatusColor::Blue);
    }

    #[test]
    fn preset_color_overrides_submitted_color() {
        let repo = TestRepository::new();
        let created = add_status(payload("Denied", Some(StatusColor::Green)), &repo).unwrap();
        assert_eq!(created.color, StatusColor::Red);
    }

    #[test]
    fn custom_status_requires_color() {
        let repo = TestRepository::new();
        let err = add_status(payload("Waiting on Parts", None), &repo).unwrap_err();
        let ServiceError::Validation(report) = err else {
            panic!("expected validation error");
        };
        assert!(report.has("color", ViolationKind::Required));

        let created =
            add_status(payload("Waiting on Parts", Some(StatusColor::Teal)), &repo).unwrap();
        assert_eq!(created.color, StatusColor::Teal);
    }

    #[test]
    fn duplicate_status_name_is_reported() {
        let repo = TestRepository::with_presets();
        let err = add_status(payload("Completed", None), &repo).unwrap_err();
        let ServiceError::Validation(report) = err else {
            panic!("expected validation error");
        };
        assert!(report.has("name", ViolationKind::Duplicate));
    }

    #[test]
    fn ids_are_not_reused_after_deleting_the_highest() {
        let repo = TestRepository::with_presets();
        let last = add_status(payload("Waiting on Parts", Some(StatusColor::Teal)), &repo).unwrap();
        delete_status(last.id, &repo).unwrap();

        let next = add_status(payload("On Hold", Some(StatusColor::Indigo)), &repo).unwrap();
        assert_eq!(next.id.get(), last.id.get() + 1);
    }

    #[test]
    fn toggles_custom_status_and_filters() {
        let repo = TestRepository::with_presets();
        let in_progress = repo
            .get_status_by_name(&StatusName::new("In Progress").unwrap())
            .unwrap()
            .unwrap();
        assert!(!toggle_status(in_progress.id, &repo).unwrap());

        let query = StatusListQuery::default()
            .search(Some("prog"))
            .enabled(EnabledFilter::Enabled);
        assert!(show_statuses(query, &repo).unwrap().is_empty());

        let query = StatusListQuery::default()
            .search(Some("prog"))
            .enabled(EnabledFilter::Disabled);
        assert_eq!(show_statuses(query, &repo).unwrap().len(), 1);
    }

    #[test]
    fn category_toggle_selects_attached_request_types() {
        let repo = TestRepository::with_presets();
        let new_id = reserved_id(&repo);
        let security = category(&repo, "Security");
        let key_card = service_type(&repo, &security, "Key Card Request", &[]);
        let escort = service_type(&repo, &security, "Escort", &[]);

        toggle_notification_request_type(new_id, key_card, &repo).unwrap();
        let tree = show_notification_tree(new_id, &repo).unwrap();
        assert_eq!(tree.categories[0].state, SelectionState::Indeterminate);

        toggle_notification_category(new_id, security.id, &repo).unwrap();
        let tree = show_notification_tree(new_id, &repo).unwrap();
        assert_eq!(tree.categories[0].state, SelectionState::Checked);
        assert!(tree.categories[0].request_types.iter().all(|rt| rt.selected
            && rt.notify_requestor
            && rt.notify_assignee));
        assert_eq!(tree.status.notifications, 2);

        toggle_notification_category(new_id, security.id, &repo).unwrap();
        let tree = show_notification_tree(new_id, &repo).unwrap();
        assert_eq!(tree.categories[0].state, SelectionState::Unchecked);
        assert!(repo.get_status_notification(new_id, escort).unwrap().is_none());
    }

    #[test]
    fn tree_only_offers_attached_request_types() {
        let repo = TestRepository::with_presets();
        let completed = repo
            .get_status_by_name(&StatusName::new("Completed").unwrap())
            .unwrap()
            .unwrap()
            .id;
        let security = category(&repo, "Security");
        let cleaning = category(&repo, "Cleaning");
        let key_card = service_type(&repo, &security, "Key Card Request", &[completed]);
        let deep_clean = service_type(&repo, &cleaning, "Deep Clean", &[]);

        let tree = show_notification_tree(completed, &repo).unwrap();
        assert_eq!(tree.categories.len(), 1);
        assert_eq!(tree.categories[0].request_types[0].id, key_card.get());

        assert!(toggle_notification_request_type(completed, deep_clean, &repo).is_err());

        let flags =
            toggle_notification(key_card, completed, NotificationAudience::Assignee, &repo)
                .unwrap();
        assert!(!flags.notify_assignee);
        let tree = show_notification_tree(completed, &repo).unwrap();
        let leaf = &tree.categories[0].request_types[0];
        assert!(leaf.selected && leaf.notify_requestor && !leaf.notify_assignee);
    }
}
