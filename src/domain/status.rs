use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::notifications::NotificationFlags;
use crate::domain::types::{
    Description, OrderCount, ServiceTypeId, StatusColor, StatusId, StatusName,
    TypeConstraintError,
};

/// Name of the status every request starts in. It always exists, is always
/// enabled and is implicitly attached to every service type.
pub const RESERVED_STATUS_NAME: &str = "New";

/// Built-in statuses whose color is fixed, in display order.
pub const PRESET_STATUSES: [(&str, StatusColor, &str); 7] = [
    (
        RESERVED_STATUS_NAME,
        StatusColor::Blue,
        "Request has been submitted and awaits triage",
    ),
    (
        "In Progress",
        StatusColor::Yellow,
        "Work on the request has started",
    ),
    (
        "Completed",
        StatusColor::Green,
        "Request has been fulfilled",
    ),
    ("Denied", StatusColor::Red, "Request was rejected"),
    (
        "Cancelled",
        StatusColor::Gray,
        "Request was withdrawn before completion",
    ),
    (
        "Assigned to Building",
        StatusColor::Purple,
        "Request was handed over to building staff",
    ),
    (
        "Failed",
        StatusColor::Orange,
        "Request could not be fulfilled",
    ),
];

pub fn is_reserved_name(name: &str) -> bool {
    name == RESERVED_STATUS_NAME
}

/// Fixed color of a preset status, `None` for custom statuses.
pub fn preset_color(name: &str) -> Option<StatusColor> {
    PRESET_STATUSES
        .iter()
        .find(|(preset, _, _)| *preset == name)
        .map(|(_, color, _)| *color)
}

/// Named workflow state attachable to service types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Status {
    pub id: StatusId,
    pub name: StatusName,
    pub description: Description,
    pub enabled: bool,
    pub color: StatusColor,
    pub order_count: OrderCount,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Status {
    pub fn is_reserved(&self) -> bool {
        is_reserved_name(self.name.as_str())
    }

    pub fn is_preset(&self) -> bool {
        preset_color(self.name.as_str()).is_some()
    }
}

/// Data required to insert or fully replace a [`Status`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewStatus {
    pub name: StatusName,
    pub description: Description,
    pub enabled: bool,
    pub color: StatusColor,
    pub order_count: OrderCount,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl NewStatus {
    /// Applies the status invariants: preset names force their color and the
    /// reserved status is always enabled.
    pub fn normalized(mut self) -> Self {
        if let Some(color) = preset_color(self.name.as_str()) {
            self.color = color;
        }
        if is_reserved_name(self.name.as_str()) {
            self.enabled = true;
        }
        self
    }

    /// The reserved status as it is seeded into an empty store.
    pub fn reserved(now: NaiveDateTime) -> Result<Self, TypeConstraintError> {
        let (name, color, description) = PRESET_STATUSES[0];
        Ok(Self {
            name: StatusName::new(name)?,
            description: Description::new(description)?,
            enabled: true,
            color,
            order_count: OrderCount::default(),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Orders statuses for display: the reserved status first, the rest by id.
pub fn sort_for_display(statuses: &mut [Status]) {
    statuses.sort_by_key(|status| (!status.is_reserved(), status.id));
}

/// Serialized form of one status in the exported `serviceRequestStatuses`
/// document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub name: StatusName,
    pub description: Description,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub color: StatusColor,
    #[serde(default)]
    pub order_count: OrderCount,
    /// Notification flags keyed by request-type name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub notifications: BTreeMap<String, NotificationFlags>,
}

fn default_enabled() -> bool {
    true
}

impl StatusSnapshot {
    pub fn into_new_status(self, now: NaiveDateTime) -> NewStatus {
        NewStatus {
            name: self.name,
            description: self.description,
            enabled: self.enabled,
            color: self.color,
            order_count: self.order_count,
            created_at: now,
            updated_at: now,
        }
        .normalized()
    }
}

/// One imported status with its notifications resolved to service types.
///
/// Every listed service type gets its flags upserted and, unless the status
/// is reserved, is attached to the status.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusImport {
    pub status: NewStatus,
    pub notifications: Vec<(ServiceTypeId, NotificationFlags)>,
}

/// Statuses created and updated by one import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusImportCounts {
    pub created: usize,
    pub updated: usize,
}

/// Re-prepends the reserved status when an imported collection lacks it.
pub fn ensure_reserved_snapshot(
    mut snapshots: Vec<StatusSnapshot>,
) -> Result<Vec<StatusSnapshot>, TypeConstraintError> {
    if !snapshots
        .iter()
        .any(|snapshot| is_reserved_name(snapshot.name.as_str()))
    {
        let (name, color, description) = PRESET_STATUSES[0];
        snapshots.insert(
            0,
            StatusSnapshot {
                id: None,
                name: StatusName::new(name)?,
                description: Description::new(description)?,
                enabled: true,
                color,
                order_count: OrderCount::default(),
                notifications: BTreeMap::new(),
            },
        );
    }
    Ok(snapshots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn now() -> NaiveDateTime {
        DateTime::from_timestamp(0, 0).unwrap().naive_utc()
    }

    fn new_status(name: &str, color: StatusColor, enabled: bool) -> NewStatus {
        NewStatus {
            name: StatusName::new(name).unwrap(),
            description: Description::new("desc").unwrap(),
            enabled,
            color,
            order_count: OrderCount::default(),
            created_at: now(),
            updated_at: now(),
        }
    }

    #[test]
    fn preset_names_force_their_color() {
        let status = new_status("Completed", StatusColor::Pink, true).normalized();
        assert_eq!(status.color, StatusColor::Green);

        let custom = new_status("Waiting on Parts", StatusColor::Pink, true).normalized();
        assert_eq!(custom.color, StatusColor::Pink);
    }

    #[test]
    fn reserved_status_is_forced_enabled() {
        let status = new_status(RESERVED_STATUS_NAME, StatusColor::Red, false).normalized();
        assert!(status.enabled);
        assert_eq!(status.color, StatusColor::Blue);
    }

    #[test]
    fn missing_reserved_snapshot_is_prepended() {
        let json = r#"[{"name":"Completed","description":"done","color":"green","orderCount":3}]"#;
        let parsed: Vec<StatusSnapshot> = serde_json::from_str(json).unwrap();
        let ensured = ensure_reserved_snapshot(parsed).unwrap();

        assert_eq!(ensured.len(), 2);
        assert_eq!(ensured[0].name.as_str(), RESERVED_STATUS_NAME);
        assert_eq!(ensured[1].order_count, 3);
        assert!(ensured[1].enabled);
    }

    #[test]
    fn present_reserved_snapshot_is_kept_once() {
        let json = r#"[{"name":"New","description":"start","color":"blue"}]"#;
        let parsed: Vec<StatusSnapshot> = serde_json::from_str(json).unwrap();
        assert_eq!(ensure_reserved_snapshot(parsed).unwrap().len(), 1);
    }

    #[test]
    fn display_order_puts_reserved_first() {
        let mut statuses = vec![
            Status {
                id: StatusId::new(1).unwrap(),
                name: StatusName::new("In Progress").unwrap(),
                description: Description::new("d").unwrap(),
                enabled: true,
                color: StatusColor::Yellow,
                order_count: OrderCount::default(),
                created_at: now(),
                updated_at: now(),
            },
            Status {
                id: StatusId::new(9).unwrap(),
                name: StatusName::new(RESERVED_STATUS_NAME).unwrap(),
                description: Description::new("d").unwrap(),
                enabled: true,
                color: StatusColor::Blue,
                order_count: OrderCount::default(),
                created_at: now(),
                updated_at: now(),
            },
        ];
        sort_for_display(&mut statuses);
        assert!(statuses[0].is_reserved());
        assert_eq!(statuses[1].id, 1);
    }
}
