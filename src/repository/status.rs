use diesel::prelude::*;

use crate::domain::notifications::StatusNotification;
use crate::domain::status::{
    NewStatus, Status, StatusImport, StatusImportCounts, is_reserved_name, sort_for_display,
};
use crate::domain::types::{ServiceTypeId, StatusId, StatusName};
use crate::models::service_type::ServiceTypeStatus;
use crate::models::status::{
    NewStatus as DbNewStatus, Status as DbStatus, StatusNotification as DbStatusNotification,
};
use crate::repository::{
    DieselRepository, RepositoryError, RepositoryResult, StatusListQuery, StatusReader,
    StatusWriter,
};

impl StatusReader for DieselRepository {
    fn list_statuses(&self, query: StatusListQuery) -> RepositoryResult<Vec<Status>> {
        use crate::schema::statuses;

        let mut conn = self.conn()?;

        let mut items = statuses::table
            .order(statuses::id.asc())
            .load::<DbStatus>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Status>, _>>()?;

        items.retain(|status| query.matches(status));
        sort_for_display(&mut items);
        Ok(items)
    }

    fn get_status_by_id(&self, id: StatusId) -> RepositoryResult<Option<Status>> {
        use crate::schema::statuses;

        let mut conn = self.conn()?;

        let status = statuses::table
            .filter(statuses::id.eq(id.get()))
            .first::<DbStatus>(&mut conn)
            .optional()?;

        let status = status.map(TryInto::try_into).transpose()?;
        Ok(status)
    }

    fn get_status_by_name(&self, name: &StatusName) -> RepositoryResult<Option<Status>> {
        use crate::schema::statuses;

        let mut conn = self.conn()?;

        let status = statuses::table
            .filter(statuses::name.eq(name.as_str()))
            .first::<DbStatus>(&mut conn)
            .optional()?;

        let status = status.map(TryInto::try_into).transpose()?;
        Ok(status)
    }

    fn list_status_notifications(
        &self,
        status_id: StatusId,
    ) -> RepositoryResult<Vec<StatusNotification>> {
        use crate::schema::status_notifications;

        let mut conn = self.conn()?;

        let items = status_notifications::table
            .filter(status_notifications::status_id.eq(status_id.get()))
            .order(status_notifications::service_type_id.asc())
            .select(DbStatusNotification::as_select())
            .load(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<StatusNotification>, _>>()?;

        Ok(items)
    }

    fn get_status_notification(
        &self,
        status_id: StatusId,
        service_type_id: ServiceTypeId,
    ) -> RepositoryResult<Option<StatusNotification>> {
        use crate::schema::status_notifications;

        let mut conn = self.conn()?;

        let row = status_notifications::table
            .filter(status_notifications::status_id.eq(status_id.get()))
            .filter(status_notifications::service_type_id.eq(service_type_id.get()))
            .select(DbStatusNotification::as_select())
            .first(&mut conn)
            .optional()?;

        let notification = row.map(TryInto::try_into).transpose()?;
        Ok(notification)
    }
}

impl StatusWriter for DieselRepository {
    fn create_status(&self, status: &NewStatus) -> RepositoryResult<Status> {
        use crate::schema::statuses;

        let mut conn = self.conn()?;
        let db_status = DbNewStatus::from(status);

        let created = diesel::insert_into(statuses::table)
            .values(&db_status)
            .returning(DbStatus::as_returning())
            .get_result(&mut conn)?;

        let created: Status = created.try_into()?;
        Ok(created)
    }

    fn update_status(&self, id: StatusId, status: &NewStatus) -> RepositoryResult<usize> {
        use crate::schema::statuses;

        let mut conn = self.conn()?;
        let db_status = DbNewStatus::from(status);

        let affected = diesel::update(statuses::table.filter(statuses::id.eq(id.get())))
            .set(&db_status)
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn set_status_enabled(&self, id: StatusId, enabled: bool) -> RepositoryResult<usize> {
        use crate::schema::statuses;

        let mut conn = self.conn()?;

        let affected = diesel::update(statuses::table.filter(statuses::id.eq(id.get())))
            .set((
                statuses::enabled.eq(enabled),
                statuses::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn delete_status(&self, id: StatusId) -> RepositoryResult<usize> {
        use crate::schema::{service_type_statuses, status_notifications, statuses};

        let mut conn = self.conn()?;

        let affected = conn.transaction::<usize, RepositoryError, _>(|conn| {
            diesel::delete(
                service_type_statuses::table.filter(service_type_statuses::status_id.eq(id.get())),
            )
            .execute(conn)?;
            diesel::delete(
                status_notifications::table.filter(status_notifications::status_id.eq(id.get())),
            )
            .execute(conn)?;
            let affected = diesel::delete(statuses::table.filter(statuses::id.eq(id.get())))
                .execute(conn)?;
            Ok(affected)
        })?;

        Ok(affected)
    }

    fn replace_status_notifications(
        &self,
        status_id: StatusId,
        notifications: &[StatusNotification],
    ) -> RepositoryResult<usize> {
        use crate::schema::status_notifications;

        let mut conn = self.conn()?;
        let rows: Vec<DbStatusNotification> = notifications
            .iter()
            .filter(|notification| notification.status_id == status_id)
            .map(DbStatusNotification::from)
            .collect();

        let inserted = conn.transaction::<usize, RepositoryError, _>(|conn| {
            diesel::delete(
                status_notifications::table
                    .filter(status_notifications::status_id.eq(status_id.get())),
            )
            .execute(conn)?;
            if rows.is_empty() {
                return Ok(0);
            }
            let inserted = diesel::insert_into(status_notifications::table)
                .values(&rows)
                .execute(conn)?;
            Ok(inserted)
        })?;

        Ok(inserted)
    }

    fn upsert_status_notification(
        &self,
        notification: &StatusNotification,
    ) -> RepositoryResult<usize> {
        use crate::schema::status_notifications;

        let mut conn = self.conn()?;
        let row = DbStatusNotification::from(notification);

        let affected = diesel::replace_into(status_notifications::table)
            .values(&row)
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn import_statuses(&self, imports: &[StatusImport]) -> RepositoryResult<StatusImportCounts> {
        use crate::schema::{service_type_statuses, status_notifications, statuses};

        let mut conn = self.conn()?;

        let counts = conn.transaction::<StatusImportCounts, RepositoryError, _>(|conn| {
            let mut counts = StatusImportCounts::default();

            for import in imports {
                let mut row = DbNewStatus::from(&import.status);
                let existing = statuses::table
                    .filter(statuses::name.eq(row.name))
                    .select((statuses::id, statuses::created_at))
                    .first::<(i32, chrono::NaiveDateTime)>(conn)
                    .optional()?;

                let status_id = match existing {
                    Some((id, created_at)) => {
                        row.created_at = created_at;
                        diesel::update(statuses::table.filter(statuses::id.eq(id)))
                            .set(&row)
                            .execute(conn)?;
                        counts.updated += 1;
                        id
                    }
                    None => {
                        let id = diesel::insert_into(statuses::table)
                            .values(&row)
                            .returning(statuses::id)
                            .get_result::<i32>(conn)?;
                        counts.created += 1;
                        id
                    }
                };

                let reserved = is_reserved_name(import.status.name.as_str());
                for (service_type_id, flags) in &import.notifications {
                    if !reserved {
                        diesel::insert_or_ignore_into(service_type_statuses::table)
                            .values(ServiceTypeStatus {
                                service_type_id: service_type_id.get(),
                                status_id,
                            })
                            .execute(conn)?;
                    }
                    diesel::replace_into(status_notifications::table)
                        .values(DbStatusNotification {
                            status_id,
                            service_type_id: service_type_id.get(),
                            notify_requestor: flags.notify_requestor,
                            notify_assignee: flags.notify_assignee,
                        })
                        .execute(conn)?;
                }
            }

            Ok(counts)
        })?;

        Ok(counts)
    }
}
