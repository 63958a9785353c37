use std::collections::HashMap;

use diesel::prelude::*;

use crate::domain::service_type::{NewServiceType, ServiceType};
use crate::domain::status::RESERVED_STATUS_NAME;
use crate::domain::types::{ServiceTypeId, StatusId};
use crate::models::service_type::{
    NewServiceType as DbNewServiceType, ServiceType as DbServiceType, ServiceTypeStatus,
};
use crate::repository::{
    DieselRepository, RepositoryError, RepositoryResult, ServiceTypeListQuery, ServiceTypeReader,
    ServiceTypeWriter,
};

fn load_memberships(
    conn: &mut SqliteConnection,
    ids: &[i32],
) -> QueryResult<HashMap<i32, Vec<i32>>> {
    use crate::schema::service_type_statuses;

    let rows = service_type_statuses::table
        .filter(service_type_statuses::service_type_id.eq_any(ids))
        .select(ServiceTypeStatus::as_select())
        .load(conn)?;

    let mut memberships: HashMap<i32, Vec<i32>> = HashMap::new();
    for row in rows {
        memberships
            .entry(row.service_type_id)
            .or_default()
            .push(row.status_id);
    }
    Ok(memberships)
}

fn reserved_status_id(conn: &mut SqliteConnection) -> RepositoryResult<Option<StatusId>> {
    use crate::schema::statuses;

    let id = statuses::table
        .filter(statuses::name.eq(RESERVED_STATUS_NAME))
        .select(statuses::id)
        .first::<i32>(conn)
        .optional()?;

    Ok(id.map(StatusId::new).transpose()?)
}

fn load_service_type(
    conn: &mut SqliteConnection,
    id: i32,
) -> RepositoryResult<Option<ServiceType>> {
    use crate::schema::{categories, service_types};

    let row = service_types::table
        .inner_join(categories::table)
        .filter(service_types::id.eq(id))
        .select((DbServiceType::as_select(), categories::name))
        .first::<(DbServiceType, String)>(conn)
        .optional()?;

    let Some((service_type, category_name)) = row else {
        return Ok(None);
    };

    let memberships = load_memberships(conn, &[id])?;
    let statuses = memberships.get(&id).map(Vec::as_slice).unwrap_or_default();
    Ok(Some(service_type.into_domain(category_name, statuses)?))
}

impl ServiceTypeReader for DieselRepository {
    fn list_service_types(
        &self,
        query: ServiceTypeListQuery,
    ) -> RepositoryResult<Vec<ServiceType>> {
        use crate::schema::{categories, service_types};

        let mut conn = self.conn()?;

        let mut items = service_types::table
            .inner_join(categories::table)
            .select((DbServiceType::as_select(), categories::name))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(category_id) = query.category_id {
            items = items.filter(service_types::category_id.eq(category_id.get()));
        }

        let rows = items
            .order((categories::name.asc(), service_types::request_type.asc()))
            .load::<(DbServiceType, String)>(&mut conn)?;

        let ids: Vec<i32> = rows.iter().map(|(row, _)| row.id).collect();
        let memberships = load_memberships(&mut conn, &ids)?;
        let reserved = reserved_status_id(&mut conn)?;

        let items = rows
            .into_iter()
            .map(|(row, category_name)| {
                let statuses = memberships
                    .get(&row.id)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                row.into_domain(category_name, statuses)
            })
            .collect::<Result<Vec<ServiceType>, _>>()?;

        Ok(items
            .into_iter()
            .filter(|service_type| query.matches(service_type, reserved))
            .collect())
    }

    fn get_service_type_by_id(&self, id: ServiceTypeId) -> RepositoryResult<Option<ServiceType>> {
        let mut conn = self.conn()?;
        load_service_type(&mut conn, id.get())
    }
}

impl ServiceTypeWriter for DieselRepository {
    fn create_service_type(
        &self,
        service_type: &NewServiceType,
        statuses: &[StatusId],
    ) -> RepositoryResult<ServiceType> {
        use crate::schema::{service_type_statuses, service_types};

        let mut conn = self.conn()?;
        let db_service_type: DbNewServiceType = service_type.clone().into();

        let id = conn.transaction::<i32, RepositoryError, _>(|conn| {
            let id = diesel::insert_into(service_types::table)
                .values(db_service_type)
                .returning(service_types::id)
                .get_result::<i32>(conn)?;

            let memberships: Vec<ServiceTypeStatus> = statuses
                .iter()
                .map(|status_id| ServiceTypeStatus {
                    service_type_id: id,
                    status_id: status_id.get(),
                })
                .collect();
            if !memberships.is_empty() {
                diesel::insert_into(service_type_statuses::table)
                    .values(&memberships)
                    .execute(conn)?;
            }
            Ok(id)
        })?;

        load_service_type(&mut conn, id)?.ok_or(RepositoryError::NotFound)
    }

    fn update_service_type(
        &self,
        id: ServiceTypeId,
        service_type: &NewServiceType,
    ) -> RepositoryResult<usize> {
        use crate::schema::service_types;

        let mut conn = self.conn()?;
        let db_service_type: DbNewServiceType = service_type.clone().into();

        let affected =
            diesel::update(service_types::table.filter(service_types::id.eq(id.get())))
                .set(&db_service_type)
                .execute(&mut conn)?;

        Ok(affected)
    }

    fn set_service_type_enabled(
        &self,
        id: ServiceTypeId,
        enabled: bool,
    ) -> RepositoryResult<usize> {
        use crate::schema::service_types;

        let mut conn = self.conn()?;

        let affected =
            diesel::update(service_types::table.filter(service_types::id.eq(id.get())))
                .set((
                    service_types::enabled.eq(enabled),
                    service_types::updated_at.eq(diesel::dsl::now),
                ))
                .execute(&mut conn)?;

        Ok(affected)
    }

    fn delete_service_type(&self, id: ServiceTypeId) -> RepositoryResult<usize> {
        use crate::schema::{service_type_statuses, service_types, status_notifications};

        let mut conn = self.conn()?;

        let affected = conn.transaction::<usize, RepositoryError, _>(|conn| {
            diesel::delete(
                service_type_statuses::table
                    .filter(service_type_statuses::service_type_id.eq(id.get())),
            )
            .execute(conn)?;
            diesel::delete(
                status_notifications::table
                    .filter(status_notifications::service_type_id.eq(id.get())),
            )
            .execute(conn)?;
            let affected =
                diesel::delete(service_types::table.filter(service_types::id.eq(id.get())))
                    .execute(conn)?;
            Ok(affected)
        })?;

        Ok(affected)
    }

    fn set_service_type_status(
        &self,
        id: ServiceTypeId,
        status_id: StatusId,
        attached: bool,
    ) -> RepositoryResult<usize> {
        use crate::schema::service_type_statuses;

        let mut conn = self.conn()?;

        let affected = if attached {
            diesel::insert_or_ignore_into(service_type_statuses::table)
                .values(ServiceTypeStatus {
                    service_type_id: id.get(),
                    status_id: status_id.get(),
                })
                .execute(&mut conn)?
        } else {
            diesel::delete(
                service_type_statuses::table
                    .filter(service_type_statuses::service_type_id.eq(id.get()))
                    .filter(service_type_statuses::status_id.eq(status_id.get())),
            )
            .execute(&mut conn)?
        };

        Ok(affected)
    }
}
