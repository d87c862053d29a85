//! API definition data model.
//!
//! The configuration store supplies each published API as a plain structured
//! record: an [`ApiDescriptor`] holding zero or more [`Plan`]s and, when it
//! has none, a single legacy security-mode name. Resolution always reads an
//! immutable snapshot of these records; they carry no behavior beyond
//! validation and selection-rule evaluation.

mod api;
mod plan;

pub use api::ApiDescriptor;
pub use plan::{Plan, SelectionRule};

/// Errors raised while parsing or validating an API definition.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("API id must not be empty")]
    EmptyApiId,

    #[error("plan '{plan}' in API '{api}': security mechanism name must not be empty")]
    EmptyPlanSecurity { api: String, plan: String },

    #[error("duplicate plan id '{plan}' in API '{api}'")]
    DuplicatePlanId { api: String, plan: String },

    #[error("failed to parse API definition: {0}")]
    Parse(#[from] serde_json::Error),
}
