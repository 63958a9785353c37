use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::notifications::{NotificationFlags, StatusNotification as DomainNotification};
use crate::domain::status::{NewStatus as DomainNewStatus, Status as DomainStatus};
use crate::domain::types::{
    Description, OrderCount, StatusColor, StatusName, TypeConstraintError,
};

/// Diesel model representing the `statuses` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::statuses)]
pub struct Status {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub color: String,
    pub order_count: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable/patchable form of [`Status`].
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::statuses)]
pub struct NewStatus<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub enabled: bool,
    pub color: &'a str,
    pub order_count: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Row of the `status_notifications` table.
#[derive(Debug, Clone, Copy, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::schema::status_notifications)]
pub struct StatusNotification {
    pub status_id: i32,
    pub service_type_id: i32,
    pub notify_requestor: bool,
    pub notify_assignee: bool,
}

impl TryFrom<Status> for DomainStatus {
    type Error = TypeConstraintError;

    fn try_from(status: Status) -> Result<Self, Self::Error> {
        Ok(Self {
            id: status.id.try_into()?,
            name: StatusName::new(status.name)?,
            description: Description::new(status.description)?,
            enabled: status.enabled,
            color: StatusColor::try_from(status.color)?,
            order_count: OrderCount::new(status.order_count)?,
            created_at: status.created_at,
            updated_at: status.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewStatus> for NewStatus<'a> {
    fn from(status: &'a DomainNewStatus) -> Self {
        Self {
            name: status.name.as_str(),
            description: status.description.as_str(),
            enabled: status.enabled,
            color: status.color.as_str(),
            order_count: status.order_count.get(),
            created_at: status.created_at,
            updated_at: status.updated_at,
        }
    }
}

impl TryFrom<StatusNotification> for DomainNotification {
    type Error = TypeConstraintError;

    fn try_from(row: StatusNotification) -> Result<Self, Self::Error> {
        Ok(Self {
            status_id: row.status_id.try_into()?,
            service_type_id: row.service_type_id.try_into()?,
            flags: NotificationFlags {
                notify_requestor: row.notify_requestor,
                notify_assignee: row.notify_assignee,
            },
        })
    }
}

impl From<&DomainNotification> for StatusNotification {
    fn from(notification: &DomainNotification) -> Self {
        Self {
            status_id: notification.status_id.get(),
            service_type_id: notification.service_type_id.get(),
            notify_requestor: notification.flags.notify_requestor,
            notify_assignee: notification.flags.notify_assignee,
        }
    }
}
