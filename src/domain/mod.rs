//! Domain entities and rules of the settings catalog, independent from
//! persistence and HTTP.

pub mod assignee;
pub mod category;
pub mod derivation;
pub mod filter;
pub mod notifications;
pub mod pricing;
pub mod service_type;
pub mod status;
pub mod types;
pub mod validation;
