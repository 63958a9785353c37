//! Free-text and discrete filters shared by the settings list views.

use serde::{Deserialize, Serialize};

use crate::domain::types::TypeConstraintError;

/// Case-insensitive substring query. A blank query matches everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextQuery(Option<String>);

impl TextQuery {
    pub fn new(raw: Option<&str>) -> Self {
        Self(
            raw.map(|q| q.trim().to_lowercase())
                .filter(|q| !q.is_empty()),
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// True when the query is blank or found in at least one of `fields`.
    pub fn matches<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> bool {
        match &self.0 {
            None => true,
            Some(query) => fields
                .into_iter()
                .any(|field| field.to_lowercase().contains(query.as_str())),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EnabledFilter {
    #[default]
    All,
    Enabled,
    Disabled,
}

impl EnabledFilter {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
        }
    }

    pub fn matches(self, enabled: bool) -> bool {
        match self {
            Self::All => true,
            Self::Enabled => enabled,
            Self::Disabled => !enabled,
        }
    }
}

impl TryFrom<&str> for EnabledFilter {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "" | "all" => Ok(Self::All),
            "enabled" => Ok(Self::Enabled),
            "disabled" => Ok(Self::Disabled),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "enabled filter: {other}"
            ))),
        }
    }
}

/// Records that can be narrowed by a [`TextQuery`] and an [`EnabledFilter`].
pub trait Searchable {
    /// Text fields the free-text query is matched against.
    fn search_fields(&self) -> Vec<&str>;

    fn is_enabled(&self) -> bool;

    fn matches(&self, query: &TextQuery, enabled: EnabledFilter) -> bool {
        enabled.matches(self.is_enabled()) && query.matches(self.search_fields())
    }
}

mod searchable_impls {
    use super::Searchable;
    use crate::domain::category::Category;
    use crate::domain::service_type::ServiceType;
    use crate::domain::status::Status;

    impl Searchable for Status {
        fn search_fields(&self) -> Vec<&str> {
            vec![self.name.as_str(), self.description.as_str()]
        }

        fn is_enabled(&self) -> bool {
            self.enabled
        }
    }

    impl Searchable for Category {
        fn search_fields(&self) -> Vec<&str> {
            let mut fields = vec![self.name.as_str(), self.description.as_str()];
            if let Some(assignee) = &self.assignee {
                fields.push(assignee.name.as_str());
            }
            fields
        }

        fn is_enabled(&self) -> bool {
            self.enabled
        }
    }

    impl Searchable for ServiceType {
        fn search_fields(&self) -> Vec<&str> {
            vec![
                self.request_type.as_str(),
                self.description.as_str(),
                self.category.as_str(),
            ]
        }

        fn is_enabled(&self) -> bool {
            self.enabled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::status::Status;
    use crate::domain::types::{Description, OrderCount, StatusColor, StatusId, StatusName};
    use chrono::DateTime;

    fn status(id: i32, name: &str, description: &str, enabled: bool) -> Status {
        let now = DateTime::from_timestamp(0, 0).unwrap().naive_utc();
        Status {
            id: StatusId::new(id).unwrap(),
            name: StatusName::new(name).unwrap(),
            description: Description::new(description).unwrap(),
            enabled,
            color: StatusColor::Gray,
            order_count: OrderCount::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn blank_query_matches_everything() {
        let query = TextQuery::new(Some("   "));
        assert_eq!(query.as_str(), None);
        assert!(query.matches(["anything"]));
    }

    #[test]
    fn query_is_case_insensitive_substring() {
        let query = TextQuery::new(Some("PROG"));
        assert!(query.matches(["In Progress"]));
        assert!(!query.matches(["Completed", "Done"]));
    }

    #[test]
    fn query_and_enabled_filter_intersect() {
        let statuses = vec![
            status(1, "In Progress", "Being worked on", true),
            status(2, "Paused", "Progress halted", false),
            status(3, "Completed", "Done", true),
            status(4, "Review", "Progress check", true),
        ];
        let query = TextQuery::new(Some("prog"));

        let matched: Vec<i32> = statuses
            .iter()
            .filter(|s| s.matches(&query, EnabledFilter::Enabled))
            .map(|s| s.id.get())
            .collect();

        assert_eq!(matched, vec![1, 4]);
    }

    #[test]
    fn parses_enabled_filter() {
        assert_eq!(EnabledFilter::try_from("").unwrap(), EnabledFilter::All);
        assert_eq!(
            EnabledFilter::try_from("disabled").unwrap(),
            EnabledFilter::Disabled
        );
        assert!(EnabledFilter::try_from("maybe").is_err());
        assert!(EnabledFilter::Disabled.matches(false));
    }
}
