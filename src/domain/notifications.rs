//! Per-status notification settings and the category → request-type
//! selection tree used to edit them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::types::{ServiceTypeId, StatusId, TypeConstraintError};

/// Who gets notified when a request enters a status.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NotificationAudience {
    Requestor,
    Assignee,
}

impl NotificationAudience {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requestor => "requestor",
            Self::Assignee => "assignee",
        }
    }
}

impl TryFrom<&str> for NotificationAudience {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "requestor" => Ok(Self::Requestor),
            "assignee" => Ok(Self::Assignee),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "notification audience: {other}"
            ))),
        }
    }
}

/// Notification switches for one (status, request type) pair.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationFlags {
    pub notify_requestor: bool,
    pub notify_assignee: bool,
}

impl Default for NotificationFlags {
    /// Newly selected request types notify both audiences.
    fn default() -> Self {
        Self {
            notify_requestor: true,
            notify_assignee: true,
        }
    }
}

impl NotificationFlags {
    pub fn get(&self, audience: NotificationAudience) -> bool {
        match audience {
            NotificationAudience::Requestor => self.notify_requestor,
            NotificationAudience::Assignee => self.notify_assignee,
        }
    }

    pub fn toggle(&mut self, audience: NotificationAudience) {
        match audience {
            NotificationAudience::Requestor => self.notify_requestor = !self.notify_requestor,
            NotificationAudience::Assignee => self.notify_assignee = !self.notify_assignee,
        }
    }
}

/// Stored notification row.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusNotification {
    pub status_id: StatusId,
    pub service_type_id: ServiceTypeId,
    pub flags: NotificationFlags,
}

/// Tri-state of a category checkbox in the selection tree.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SelectionState {
    Unchecked,
    Indeterminate,
    Checked,
}

/// Request types selected for a status, with their notification flags.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NotificationSelection {
    entries: BTreeMap<ServiceTypeId, NotificationFlags>,
}

impl NotificationSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_notifications(
        status_id: StatusId,
        notifications: impl IntoIterator<Item = StatusNotification>,
    ) -> Self {
        Self {
            entries: notifications
                .into_iter()
                .filter(|n| n.status_id == status_id)
                .map(|n| (n.service_type_id, n.flags))
                .collect(),
        }
    }

    pub fn is_selected(&self, service_type_id: ServiceTypeId) -> bool {
        self.entries.contains_key(&service_type_id)
    }

    pub fn flags(&self, service_type_id: ServiceTypeId) -> Option<NotificationFlags> {
        self.entries.get(&service_type_id).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Selects an unselected request type with default flags, or deselects it.
    pub fn toggle_request_type(&mut self, service_type_id: ServiceTypeId) {
        if self.entries.remove(&service_type_id).is_none() {
            self.entries
                .insert(service_type_id, NotificationFlags::default());
        }
    }

    /// Checkbox state of a category given the request types it contains.
    pub fn category_state(&self, members: &[ServiceTypeId]) -> SelectionState {
        let selected = members.iter().filter(|id| self.is_selected(**id)).count();
        if selected == 0 {
            SelectionState::Unchecked
        } else if selected == members.len() {
            SelectionState::Checked
        } else {
            SelectionState::Indeterminate
        }
    }

    /// Clicking a category checkbox: a fully selected category is cleared,
    /// otherwise every member becomes selected. Already selected members keep
    /// their flags.
    pub fn toggle_category(&mut self, members: &[ServiceTypeId]) {
        match self.category_state(members) {
            SelectionState::Checked => {
                for id in members {
                    self.entries.remove(id);
                }
            }
            SelectionState::Unchecked | SelectionState::Indeterminate => {
                for id in members {
                    self.entries.entry(*id).or_default();
                }
            }
        }
    }

    pub fn into_notifications(self, status_id: StatusId) -> Vec<StatusNotification> {
        self.entries
            .into_iter()
            .map(|(service_type_id, flags)| StatusNotification {
                status_id,
                service_type_id,
                flags,
            })
            .collect()
    }
}
