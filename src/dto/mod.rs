//! View models handed to templates and JSON responses.

pub mod categories;
pub mod service_types;
pub mod statuses;
