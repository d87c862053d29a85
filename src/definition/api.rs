use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};

use super::{ConfigError, Plan};

/// A published API, as supplied by the configuration store.
///
/// Either `plans` is non-empty and drives handler resolution, or it is empty
/// and the single legacy `security` mode applies. Whenever any plan exists,
/// the legacy field is ignored entirely — plans take priority, this is not a
/// merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiDescriptor {
    /// API id, unique across the gateway.
    pub id: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Security plans, in declaration order. May be empty.
    #[serde(default)]
    pub plans: Vec<Plan>,

    /// Legacy security-mode name, consulted only when `plans` is empty.
    #[serde(default)]
    pub security: Option<String>,
}

impl ApiDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            plans: Vec::new(),
            security: None,
        }
    }

    pub fn with_plans(mut self, plans: Vec<Plan>) -> Self {
        self.plans = plans;
        self
    }

    pub fn with_security(mut self, security: impl Into<String>) -> Self {
        self.security = Some(security.into());
        self
    }

    /// Parse and validate an API definition from a JSON document.
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        let api: Self = serde_json::from_str(document)?;
        api.validate()?;
        Ok(api)
    }

    /// Validate structural invariants: non-empty id, non-empty mechanism name
    /// per plan, plan ids unique within the API.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id.trim().is_empty() {
            return Err(ConfigError::EmptyApiId);
        }

        let mut seen = HashSet::new();
        for plan in &self.plans {
            if plan.security.trim().is_empty() {
                return Err(ConfigError::EmptyPlanSecurity {
                    api: self.id.clone(),
                    plan: plan.id.clone(),
                });
            }
            if !seen.insert(plan.id.as_str()) {
                return Err(ConfigError::DuplicatePlanId {
                    api: self.id.clone(),
                    plan: plan.id.clone(),
                });
            }
        }

        Ok(())
    }
}

impl fmt::Display for ApiDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{} ({})", self.name, self.id)
        }
    }
}
