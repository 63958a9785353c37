use crate::db::{DbConnection, DbPool};
use crate::domain::category::{Category, NewCategory};
use crate::domain::filter::{EnabledFilter, Searchable, TextQuery};
use crate::domain::notifications::StatusNotification;
use crate::domain::service_type::{NewServiceType, ServiceType};
use crate::domain::status::{NewStatus, Status, StatusImport, StatusImportCounts};
use crate::domain::types::{CategoryId, CategoryName, ServiceTypeId, StatusId, StatusName};

pub mod category;
pub mod errors;
pub mod service_type;
pub mod status;
#[cfg(test)]
pub mod test;

pub use errors::{RepositoryError, RepositoryResult};

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between handlers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Query parameters for listing statuses.
#[derive(Debug, Clone, Default)]
pub struct StatusListQuery {
    /// Matched against name and description.
    pub search: TextQuery,
    pub enabled: EnabledFilter,
}

impl StatusListQuery {
    pub fn search(mut self, search: Option<&str>) -> Self {
        self.search = TextQuery::new(search);
        self
    }
    pub fn enabled(mut self, enabled: EnabledFilter) -> Self {
        self.enabled = enabled;
        self
    }
    pub fn matches(&self, status: &Status) -> bool {
        status.matches(&self.search, self.enabled)
    }
}

/// Query parameters for listing categories.
#[derive(Debug, Clone, Default)]
pub struct CategoryListQuery {
    /// Matched against name, description and assignee.
    pub search: TextQuery,
    pub enabled: EnabledFilter,
}

impl CategoryListQuery {
    pub fn search(mut self, search: Option<&str>) -> Self {
        self.search = TextQuery::new(search);
        self
    }
    pub fn enabled(mut self, enabled: EnabledFilter) -> Self {
        self.enabled = enabled;
        self
    }
    pub fn matches(&self, category: &Category) -> bool {
        category.matches(&self.search, self.enabled)
    }
}

/// Query parameters for listing service types.
#[derive(Debug, Clone, Default)]
pub struct ServiceTypeListQuery {
    /// Matched against request type, description and category name.
    pub search: TextQuery,
    pub enabled: EnabledFilter,
    pub category_id: Option<CategoryId>,
    /// Restrict to service types the status is attached to.
    pub status_id: Option<StatusId>,
}

impl ServiceTypeListQuery {
    pub fn search(mut self, search: Option<&str>) -> Self {
        self.search = TextQuery::new(search);
        self
    }
    pub fn enabled(mut self, enabled: EnabledFilter) -> Self {
        self.enabled = enabled;
        self
    }
    pub fn category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }
    pub fn status(mut self, status_id: StatusId) -> Self {
        self.status_id = Some(status_id);
        self
    }

    /// `reserved` is the id of the status implicitly attached to every
    /// service type.
    pub fn matches(&self, service_type: &ServiceType, reserved: Option<StatusId>) -> bool {
        service_type.matches(&self.search, self.enabled)
            && self
                .category_id
                .is_none_or(|category_id| service_type.category_id == category_id)
            && self
                .status_id
                .is_none_or(|status_id| service_type.has_status(status_id, reserved))
    }
}

/// Read-only operations for category entities.
pub trait CategoryReader {
    /// List categories ordered by name.
    fn list_categories(&self, query: CategoryListQuery) -> RepositoryResult<Vec<Category>>;
    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>>;
    fn get_category_by_name(&self, name: &CategoryName) -> RepositoryResult<Option<Category>>;
    /// Number of service types referencing the category.
    fn count_category_service_types(&self, id: CategoryId) -> RepositoryResult<usize>;
}

/// Write operations for category entities.
pub trait CategoryWriter {
    /// Persist a new category and return it with its assigned id.
    fn create_category(&self, category: &NewCategory) -> RepositoryResult<Category>;
    /// Replace every field of an existing category.
    fn update_category(&self, id: CategoryId, category: &NewCategory) -> RepositoryResult<usize>;
    fn set_category_enabled(&self, id: CategoryId, enabled: bool) -> RepositoryResult<usize>;
    fn delete_category(&self, id: CategoryId) -> RepositoryResult<usize>;
}

/// Read-only operations for service type entities.
pub trait ServiceTypeReader {
    /// List service types ordered by category name, then request type.
    fn list_service_types(&self, query: ServiceTypeListQuery)
    -> RepositoryResult<Vec<ServiceType>>;
    fn get_service_type_by_id(&self, id: ServiceTypeId) -> RepositoryResult<Option<ServiceType>>;
}

/// Write operations for service type entities and their status membership.
pub trait ServiceTypeWriter {
    /// Persist a new service type attached to `statuses`.
    fn create_service_type(
        &self,
        service_type: &NewServiceType,
        statuses: &[StatusId],
    ) -> RepositoryResult<ServiceType>;
    /// Replace every field of an existing service type; membership is kept.
    fn update_service_type(
        &self,
        id: ServiceTypeId,
        service_type: &NewServiceType,
    ) -> RepositoryResult<usize>;
    fn set_service_type_enabled(&self, id: ServiceTypeId, enabled: bool)
    -> RepositoryResult<usize>;
    /// Delete a service type together with its memberships and notifications.
    fn delete_service_type(&self, id: ServiceTypeId) -> RepositoryResult<usize>;
    /// Attach or detach a status.
    fn set_service_type_status(
        &self,
        id: ServiceTypeId,
        status_id: StatusId,
        attached: bool,
    ) -> RepositoryResult<usize>;
}

/// Read-only operations for status entities and notification settings.
pub trait StatusReader {
    /// List statuses in display order (reserved status first).
    fn list_statuses(&self, query: StatusListQuery) -> RepositoryResult<Vec<Status>>;
    fn get_status_by_id(&self, id: StatusId) -> RepositoryResult<Option<Status>>;
    fn get_status_by_name(&self, name: &StatusName) -> RepositoryResult<Option<Status>>;
    fn list_status_notifications(
        &self,
        status_id: StatusId,
    ) -> RepositoryResult<Vec<StatusNotification>>;
    fn get_status_notification(
        &self,
        status_id: StatusId,
        service_type_id: ServiceTypeId,
    ) -> RepositoryResult<Option<StatusNotification>>;
}

/// Write operations for status entities and notification settings.
pub trait StatusWriter {
    /// Persist a new status and return it with its assigned id.
    fn create_status(&self, status: &NewStatus) -> RepositoryResult<Status>;
    /// Replace every field of an existing status.
    fn update_status(&self, id: StatusId, status: &NewStatus) -> RepositoryResult<usize>;
    fn set_status_enabled(&self, id: StatusId, enabled: bool) -> RepositoryResult<usize>;
    fn delete_status(&self, id: StatusId) -> RepositoryResult<usize>;
    /// Replace all notification rows of a status.
    fn replace_status_notifications(
        &self,
        status_id: StatusId,
        notifications: &[StatusNotification],
    ) -> RepositoryResult<usize>;
    /// Insert or overwrite one notification row.
    fn upsert_status_notification(
        &self,
        notification: &StatusNotification,
    ) -> RepositoryResult<usize>;
    /// Apply an imported status collection atomically. Statuses are matched
    /// by name and keep their `created_at` when updated.
    fn import_statuses(&self, imports: &[StatusImport]) -> RepositoryResult<StatusImportCounts>;
}
