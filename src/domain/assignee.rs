use serde::{Deserialize, Serialize};

use crate::domain::types::{AssigneeKind, AssigneeName, TypeConstraintError};

/// A user or team requests are routed to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Assignee {
    pub name: AssigneeName,
    pub kind: AssigneeKind,
}

impl Assignee {
    pub fn new(name: AssigneeName, kind: AssigneeKind) -> Self {
        Self { name, kind }
    }

    /// Builds an optional assignee from nullable storage/form columns.
    ///
    /// A blank name means "no assignee"; a missing kind defaults to `user`.
    pub fn from_parts(
        name: Option<String>,
        kind: Option<String>,
    ) -> Result<Option<Self>, TypeConstraintError> {
        let Some(name) = name.filter(|name| !name.trim().is_empty()) else {
            return Ok(None);
        };
        let kind = match kind.as_deref().map(str::trim) {
            None | Some("") => AssigneeKind::default(),
            Some(kind) => AssigneeKind::try_from(kind)?,
        };
        Ok(Some(Self {
            name: AssigneeName::new(name)?,
            kind,
        }))
    }
}
