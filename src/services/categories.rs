use std::collections::HashMap;

use crate::domain::category::Category;
use crate::domain::types::CategoryId;
use crate::domain::validation::ViolationKind;
use crate::dto::categories::CategoryDto;
use crate::forms::categories::CategoryFormPayload;
use crate::repository::{
    CategoryListQuery, CategoryReader, CategoryWriter, ServiceTypeListQuery, ServiceTypeReader,
};

use super::{ServiceError, ServiceResult, repository_failure, violation};

pub fn show_categories<R>(query: CategoryListQuery, repo: &R) -> ServiceResult<Vec<CategoryDto>>
where
    R: CategoryReader + ServiceTypeReader,
{
    let categories = repo
        .list_categories(query)
        .map_err(|e| repository_failure("list categories", e))?;

    let mut usage: HashMap<CategoryId, usize> = HashMap::new();
    for service_type in repo
        .list_service_types(ServiceTypeListQuery::default())
        .map_err(|e| repository_failure("list service types", e))?
    {
        *usage.entry(service_type.category_id).or_default() += 1;
    }

    Ok(categories
        .into_iter()
        .map(|category| {
            let count = usage.get(&category.id).copied().unwrap_or_default();
            CategoryDto::new(category, count)
        })
        .collect())
}

fn ensure_unique_name<R>(
    payload: &CategoryFormPayload,
    id: Option<CategoryId>,
    repo: &R,
) -> ServiceResult<()>
where
    R: CategoryReader,
{
    match repo.get_category_by_name(&payload.name) {
        Ok(Some(existing)) if Some(existing.id) != id => Err(violation(
            "name",
            ViolationKind::Duplicate,
            format!("A category named \"{}\" already exists", payload.name),
        )),
        Ok(_) => Ok(()),
        Err(e) => Err(repository_failure("look up category", e)),
    }
}

fn load_category<R>(id: CategoryId, repo: &R) -> ServiceResult<Category>
where
    R: CategoryReader,
{
    match repo.get_category_by_id(id) {
        Ok(Some(category)) => Ok(category),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => Err(repository_failure("get category", e)),
    }
}

pub fn add_category<R>(payload: CategoryFormPayload, repo: &R) -> ServiceResult<Category>
where
    R: CategoryReader + CategoryWriter,
{
    ensure_unique_name(&payload, None, repo)?;

    let category = payload.into_new_category(true, None);
    let created = repo
        .create_category(&category)
        .map_err(|e| repository_failure("create category", e))?;

    log::info!("Created category {} ({})", created.id, created.name);
    Ok(created)
}

pub fn update_category<R>(
    id: CategoryId,
    payload: CategoryFormPayload,
    repo: &R,
) -> ServiceResult<()>
where
    R: CategoryReader + CategoryWriter,
{
    let existing = load_category(id, repo)?;
    ensure_unique_name(&payload, Some(id), repo)?;

    let category = payload.into_new_category(existing.enabled, Some(existing.created_at));
    match repo.update_category(id, &category) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(_) => {
            log::info!("Updated category {id}");
            Ok(())
        }
        Err(e) => Err(repository_failure("update category", e)),
    }
}

/// Deletes a category that no service type references.
pub fn delete_category<R>(id: CategoryId, repo: &R) -> ServiceResult<()>
where
    R: CategoryReader + CategoryWriter,
{
    let category = load_category(id, repo)?;

    let references = repo
        .count_category_service_types(id)
        .map_err(|e| repository_failure("count service types", e))?;
    if references > 0 {
        return Err(ServiceError::Conflict(format!(
            "Category \"{}\" is used by {references} service type(s)",
            category.name
        )));
    }

    repo.delete_category(id)
        .map_err(|e| repository_failure("delete category", e))?;
    log::info!("Deleted category {id} ({})", category.name);
    Ok(())
}

/// Flips the enabled flag and returns the new value.
pub fn toggle_category<R>(id: CategoryId, repo: &R) -> ServiceResult<bool>
where
    R: CategoryReader + CategoryWriter,
{
    let category = load_category(id, repo)?;
    let enabled = !category.enabled;

    repo.set_category_enabled(id, enabled)
        .map_err(|e| repository_failure("toggle category", e))?;
    log::info!("Category {id} enabled: {enabled}");
    Ok(enabled)
}
