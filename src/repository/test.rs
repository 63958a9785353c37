use std::cell::RefCell;
use std::collections::BTreeMap;

use chrono::Utc;

use crate::domain::category::{Category, NewCategory};
use crate::domain::notifications::{NotificationFlags, StatusNotification};
use crate::domain::service_type::{NewServiceType, ServiceType};
use crate::domain::status::{
    NewStatus, PRESET_STATUSES, Status, StatusImport, StatusImportCounts, is_reserved_name,
    sort_for_display,
};
use crate::domain::types::{
    CategoryId, CategoryName, Description, OrderCount, ServiceTypeId, StatusId, StatusName,
};
use crate::repository::{
    CategoryListQuery, CategoryReader, CategoryWriter, RepositoryError, RepositoryResult,
    ServiceTypeListQuery, ServiceTypeReader, ServiceTypeWriter, StatusListQuery, StatusReader,
    StatusWriter,
};

#[derive(Clone, Default)]
struct State {
    categories: BTreeMap<CategoryId, Category>,
    service_types: BTreeMap<ServiceTypeId, ServiceType>,
    statuses: BTreeMap<StatusId, Status>,
    notifications: BTreeMap<(StatusId, ServiceTypeId), NotificationFlags>,
    last_category_id: i32,
    last_service_type_id: i32,
    last_status_id: i32,
}

impl State {
    fn reserved_status_id(&self) -> Option<StatusId> {
        self.statuses
            .values()
            .find(|status| status.is_reserved())
            .map(|status| status.id)
    }

    /// Service type with its category name refreshed, like the SQL join.
    fn resolved_service_type(&self, service_type: &ServiceType) -> ServiceType {
        let mut service_type = service_type.clone();
        if let Some(category) = self.categories.get(&service_type.category_id) {
            service_type.category = category.name.clone();
        }
        service_type
    }
}

/// In-memory repository used for unit tests.
///
/// Ids are handed out from monotonic counters so deleted ids are never
/// reused, matching `AUTOINCREMENT` in the SQLite schema.
#[derive(Default)]
pub struct TestRepository {
    state: RefCell<State>,
}

impl TestRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository seeded with the built-in statuses.
    pub fn with_presets() -> Self {
        let repo = Self::new();
        let now = Utc::now().naive_utc();
        for (name, color, description) in PRESET_STATUSES {
            let status = NewStatus {
                name: StatusName::new(name).unwrap(),
                description: Description::new(description).unwrap(),
                enabled: true,
                color,
                order_count: OrderCount::default(),
                created_at: now,
                updated_at: now,
            };
            repo.create_status(&status).unwrap();
        }
        repo
    }

    pub fn notification_count(&self) -> usize {
        self.state.borrow().notifications.len()
    }
}

fn next_id(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

impl CategoryReader for TestRepository {
    fn list_categories(&self, query: CategoryListQuery) -> RepositoryResult<Vec<Category>> {
        let state = self.state.borrow();
        let mut items: Vec<Category> = state
            .categories
            .values()
            .filter(|category| query.matches(category))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>> {
        Ok(self.state.borrow().categories.get(&id).cloned())
    }

    fn get_category_by_name(&self, name: &CategoryName) -> RepositoryResult<Option<Category>> {
        Ok(self
            .state
            .borrow()
            .categories
            .values()
            .find(|category| category.name == *name)
            .cloned())
    }

    fn count_category_service_types(&self, id: CategoryId) -> RepositoryResult<usize> {
        Ok(self
            .state
            .borrow()
            .service_types
            .values()
            .filter(|service_type| service_type.category_id == id)
            .count())
    }
}

impl CategoryWriter for TestRepository {
    fn create_category(&self, category: &NewCategory) -> RepositoryResult<Category> {
        let mut state = self.state.borrow_mut();
        if state.categories.values().any(|c| c.name == category.name) {
            return Err(RepositoryError::ConstraintViolation(
                "UNIQUE constraint failed: categories.name".into(),
            ));
        }
        let id = CategoryId::new(next_id(&mut state.last_category_id))?;
        let created = Category {
            id,
            name: category.name.clone(),
            description: category.description.clone(),
            enabled: category.enabled,
            assignee: category.assignee.clone(),
            pricing: category.pricing,
            created_at: category.created_at,
            updated_at: category.updated_at,
        };
        state.categories.insert(id, created.clone());
        Ok(created)
    }

    fn update_category(&self, id: CategoryId, category: &NewCategory) -> RepositoryResult<usize> {
        let mut state = self.state.borrow_mut();
        if state
            .categories
            .values()
            .any(|c| c.id != id && c.name == category.name)
        {
            return Err(RepositoryError::ConstraintViolation(
                "UNIQUE constraint failed: categories.name".into(),
            ));
        }
        let Some(existing) = state.categories.get_mut(&id) else {
            return Ok(0);
        };
        existing.name = category.name.clone();
        existing.description = category.description.clone();
        existing.enabled = category.enabled;
        existing.assignee = category.assignee.clone();
        existing.pricing = category.pricing;
        existing.created_at = category.created_at;
        existing.updated_at = category.updated_at;
        Ok(1)
    }

    fn set_category_enabled(&self, id: CategoryId, enabled: bool) -> RepositoryResult<usize> {
        let mut state = self.state.borrow_mut();
        Ok(match state.categories.get_mut(&id) {
            Some(category) => {
                category.enabled = enabled;
                1
            }
            None => 0,
        })
    }

    fn delete_category(&self, id: CategoryId) -> RepositoryResult<usize> {
        let mut state = self.state.borrow_mut();
        if state
            .service_types
            .values()
            .any(|service_type| service_type.category_id == id)
        {
            return Err(RepositoryError::ConstraintViolation(
                "FOREIGN KEY constraint failed".into(),
            ));
        }
        Ok(usize::from(state.categories.remove(&id).is_some()))
    }
}

impl ServiceTypeReader for TestRepository {
    fn list_service_types(
        &self,
        query: ServiceTypeListQuery,
    ) -> RepositoryResult<Vec<ServiceType>> {
        let state = self.state.borrow();
        let reserved = state.reserved_status_id();
        let mut items: Vec<ServiceType> = state
            .service_types
            .values()
            .map(|service_type| state.resolved_service_type(service_type))
            .filter(|service_type| query.matches(service_type, reserved))
            .collect();
        items.sort_by(|a, b| {
            (a.category.as_str(), a.request_type.as_str())
                .cmp(&(b.category.as_str(), b.request_type.as_str()))
        });
        Ok(items)
    }

    fn get_service_type_by_id(&self, id: ServiceTypeId) -> RepositoryResult<Option<ServiceType>> {
        let state = self.state.borrow();
        Ok(state
            .service_types
            .get(&id)
            .map(|service_type| state.resolved_service_type(service_type)))
    }
}

impl ServiceTypeWriter for TestRepository {
    fn create_service_type(
        &self,
        service_type: &NewServiceType,
        statuses: &[StatusId],
    ) -> RepositoryResult<ServiceType> {
        let mut state = self.state.borrow_mut();
        let Some(category) = state.categories.get(&service_type.category_id) else {
            return Err(RepositoryError::ConstraintViolation(
                "FOREIGN KEY constraint failed".into(),
            ));
        };
        let category = category.name.clone();
        if statuses.iter().any(|id| !state.statuses.contains_key(id)) {
            return Err(RepositoryError::ConstraintViolation(
                "FOREIGN KEY constraint failed".into(),
            ));
        }

        let mut statuses = statuses.to_vec();
        statuses.sort();
        statuses.dedup();

        let id = ServiceTypeId::new(next_id(&mut state.last_service_type_id))?;
        let created = ServiceType {
            id,
            request_type: service_type.request_type.clone(),
            description: service_type.description.clone(),
            category_id: service_type.category_id,
            category,
            enabled: service_type.enabled,
            approval: service_type.approval,
            assignee: service_type.assignee.clone(),
            pricing: service_type.pricing,
            statuses,
            created_at: service_type.created_at,
            updated_at: service_type.updated_at,
        };
        state.service_types.insert(id, created.clone());
        Ok(created)
    }

    fn update_service_type(
        &self,
        id: ServiceTypeId,
        service_type: &NewServiceType,
    ) -> RepositoryResult<usize> {
        let mut state = self.state.borrow_mut();
        if !state.categories.contains_key(&service_type.category_id) {
            return Err(RepositoryError::ConstraintViolation(
                "FOREIGN KEY constraint failed".into(),
            ));
        }
        let Some(existing) = state.service_types.get_mut(&id) else {
            return Ok(0);
        };
        existing.request_type = service_type.request_type.clone();
        existing.description = service_type.description.clone();
        existing.category_id = service_type.category_id;
        existing.enabled = service_type.enabled;
        existing.approval = service_type.approval;
        existing.assignee = service_type.assignee.clone();
        existing.pricing = service_type.pricing;
        existing.created_at = service_type.created_at;
        existing.updated_at = service_type.updated_at;
        Ok(1)
    }

    fn set_service_type_enabled(
        &self,
        id: ServiceTypeId,
        enabled: bool,
    ) -> RepositoryResult<usize> {
        let mut state = self.state.borrow_mut();
        Ok(match state.service_types.get_mut(&id) {
            Some(service_type) => {
                service_type.enabled = enabled;
                1
            }
            None => 0,
        })
    }

    fn delete_service_type(&self, id: ServiceTypeId) -> RepositoryResult<usize> {
        let mut state = self.state.borrow_mut();
        state
            .notifications
            .retain(|(_, service_type_id), _| *service_type_id != id);
        Ok(usize::from(state.service_types.remove(&id).is_some()))
    }

    fn set_service_type_status(
        &self,
        id: ServiceTypeId,
        status_id: StatusId,
        attached: bool,
    ) -> RepositoryResult<usize> {
        let mut state = self.state.borrow_mut();
        if attached && !state.statuses.contains_key(&status_id) {
            return Err(RepositoryError::ConstraintViolation(
                "FOREIGN KEY constraint failed".into(),
            ));
        }
        let Some(service_type) = state.service_types.get_mut(&id) else {
            return Ok(0);
        };
        let present = service_type.statuses.contains(&status_id);
        match (attached, present) {
            (true, false) => {
                service_type.statuses.push(status_id);
                service_type.statuses.sort();
                Ok(1)
            }
            (false, true) => {
                service_type.statuses.retain(|s| *s != status_id);
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

impl StatusReader for TestRepository {
    fn list_statuses(&self, query: StatusListQuery) -> RepositoryResult<Vec<Status>> {
        let mut items: Vec<Status> = self
            .state
            .borrow()
            .statuses
            .values()
            .filter(|status| query.matches(status))
            .cloned()
            .collect();
        sort_for_display(&mut items);
        Ok(items)
    }

    fn get_status_by_id(&self, id: StatusId) -> RepositoryResult<Option<Status>> {
        Ok(self.state.borrow().statuses.get(&id).cloned())
    }

    fn get_status_by_name(&self, name: &StatusName) -> RepositoryResult<Option<Status>> {
        Ok(self
            .state
            .borrow()
            .statuses
            .values()
            .find(|status| status.name == *name)
            .cloned())
    }

    fn list_status_notifications(
        &self,
        status_id: StatusId,
    ) -> RepositoryResult<Vec<StatusNotification>> {
        Ok(self
            .state
            .borrow()
            .notifications
            .iter()
            .filter(|((status, _), _)| *status == status_id)
            .map(|((status_id, service_type_id), flags)| StatusNotification {
                status_id: *status_id,
                service_type_id: *service_type_id,
                flags: *flags,
            })
            .collect())
    }

    fn get_status_notification(
        &self,
        status_id: StatusId,
        service_type_id: ServiceTypeId,
    ) -> RepositoryResult<Option<StatusNotification>> {
        Ok(self
            .state
            .borrow()
            .notifications
            .get(&(status_id, service_type_id))
            .map(|flags| StatusNotification {
                status_id,
                service_type_id,
                flags: *flags,
            }))
    }
}

impl StatusWriter for TestRepository {
    fn create_status(&self, status: &NewStatus) -> RepositoryResult<Status> {
        let mut state = self.state.borrow_mut();
        if state.statuses.values().any(|s| s.name == status.name) {
            return Err(RepositoryError::ConstraintViolation(
                "UNIQUE constraint failed: statuses.name".into(),
            ));
        }
        let id = StatusId::new(next_id(&mut state.last_status_id))?;
        let created = Status {
            id,
            name: status.name.clone(),
            description: status.description.clone(),
            enabled: status.enabled,
            color: status.color,
            order_count: status.order_count,
            created_at: status.created_at,
            updated_at: status.updated_at,
        };
        state.statuses.insert(id, created.clone());
        Ok(created)
    }

    fn update_status(&self, id: StatusId, status: &NewStatus) -> RepositoryResult<usize> {
        let mut state = self.state.borrow_mut();
        if state
            .statuses
            .values()
            .any(|s| s.id != id && s.name == status.name)
        {
            return Err(RepositoryError::ConstraintViolation(
                "UNIQUE constraint failed: statuses.name".into(),
            ));
        }
        let Some(existing) = state.statuses.get_mut(&id) else {
            return Ok(0);
        };
        existing.name = status.name.clone();
        existing.description = status.description.clone();
        existing.enabled = status.enabled;
        existing.color = status.color;
        existing.order_count = status.order_count;
        existing.created_at = status.created_at;
        existing.updated_at = status.updated_at;
        Ok(1)
    }

    fn set_status_enabled(&self, id: StatusId, enabled: bool) -> RepositoryResult<usize> {
        let mut state = self.state.borrow_mut();
        Ok(match state.statuses.get_mut(&id) {
            Some(status) => {
                status.enabled = enabled;
                1
            }
            None => 0,
        })
    }

    fn delete_status(&self, id: StatusId) -> RepositoryResult<usize> {
        let mut state = self.state.borrow_mut();
        for service_type in state.service_types.values_mut() {
            service_type.statuses.retain(|status_id| *status_id != id);
        }
        state.notifications.retain(|(status_id, _), _| *status_id != id);
        Ok(usize::from(state.statuses.remove(&id).is_some()))
    }

    fn replace_status_notifications(
        &self,
        status_id: StatusId,
        notifications: &[StatusNotification],
    ) -> RepositoryResult<usize> {
        let mut state = self.state.borrow_mut();
        state.notifications.retain(|(id, _), _| *id != status_id);
        let mut inserted = 0;
        for notification in notifications
            .iter()
            .filter(|notification| notification.status_id == status_id)
        {
            state.notifications.insert(
                (notification.status_id, notification.service_type_id),
                notification.flags,
            );
            inserted += 1;
        }
        Ok(inserted)
    }

    fn upsert_status_notification(
        &self,
        notification: &StatusNotification,
    ) -> RepositoryResult<usize> {
        self.state.borrow_mut().notifications.insert(
            (notification.status_id, notification.service_type_id),
            notification.flags,
        );
        Ok(1)
    }

    fn import_statuses(&self, imports: &[StatusImport]) -> RepositoryResult<StatusImportCounts> {
        // Changes are staged on a copy and only committed when every import applies.
        let mut staged = self.state.borrow().clone();
        let mut counts = StatusImportCounts::default();

        for import in imports {
            let status = &import.status;
            let existing = staged
                .statuses
                .values()
                .find(|s| s.name == status.name)
                .map(|s| s.id);

            let status_id = match existing.and_then(|id| staged.statuses.get_mut(&id)) {
                Some(stored) => {
                    stored.description = status.description.clone();
                    stored.enabled = status.enabled;
                    stored.color = status.color;
                    stored.order_count = status.order_count;
                    stored.updated_at = status.updated_at;
                    counts.updated += 1;
                    stored.id
                }
                None => {
                    let id = StatusId::new(next_id(&mut staged.last_status_id))?;
                    staged.statuses.insert(
                        id,
                        Status {
                            id,
                            name: status.name.clone(),
                            description: status.description.clone(),
                            enabled: status.enabled,
                            color: status.color,
                            order_count: status.order_count,
                            created_at: status.created_at,
                            updated_at: status.updated_at,
                        },
                    );
                    counts.created += 1;
                    id
                }
            };

            let reserved = is_reserved_name(status.name.as_str());
            for (service_type_id, flags) in &import.notifications {
                let Some(service_type) = staged.service_types.get_mut(service_type_id) else {
                    return Err(RepositoryError::ConstraintViolation(
                        "FOREIGN KEY constraint failed".into(),
                    ));
                };
                if !reserved && !service_type.statuses.contains(&status_id) {
                    service_type.statuses.push(status_id);
                    service_type.statuses.sort();
                }
                staged
                    .notifications
                    .insert((status_id, *service_type_id), *flags);
            }
        }

        *self.state.borrow_mut() = staged;
        Ok(counts)
    }
}
