use serde::Serialize;

use crate::domain::notifications::SelectionState;
use crate::domain::status::Status;
use crate::domain::types::StatusColor;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusDto {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub color: &'static str,
    pub order_count: i32,
    /// The `New` status; cannot be renamed, disabled or deleted.
    pub reserved: bool,
    /// Built-in status whose color cannot be changed.
    pub preset: bool,
    /// Request types with notification settings for this status.
    pub notifications: usize,
}

impl StatusDto {
    pub fn new(status: Status, notifications: usize) -> Self {
        Self {
            id: status.id.get(),
            reserved: status.is_reserved(),
            preset: status.is_preset(),
            name: status.name.into_inner(),
            description: status.description.into_inner(),
            enabled: status.enabled,
            color: status.color.as_str(),
            order_count: status.order_count.get(),
            notifications,
        }
    }
}

impl From<Status> for StatusDto {
    fn from(value: Status) -> Self {
        Self::new(value, 0)
    }
}

/// Palette entry for the color picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorOptionDto {
    pub value: &'static str,
}

pub fn color_options() -> Vec<ColorOptionDto> {
    StatusColor::PALETTE
        .iter()
        .map(|color| ColorOptionDto {
            value: color.as_str(),
        })
        .collect()
}

/// Leaf of the notification tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationRequestTypeDto {
    pub id: i32,
    pub request_type: String,
    pub selected: bool,
    pub notify_requestor: bool,
    pub notify_assignee: bool,
}

/// Category node of the notification tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationCategoryDto {
    pub id: i32,
    pub name: String,
    pub state: SelectionState,
    pub request_types: Vec<NotificationRequestTypeDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationTreeDto {
    pub status: StatusDto,
    pub categories: Vec<NotificationCategoryDto>,
}
